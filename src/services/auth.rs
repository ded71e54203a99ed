use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::user::{self, UserRole};
use crate::entities::{supplier, user::Entity as User};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(required(message = "Role is required"))]
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(required(message = "Role is required"))]
    pub role: Option<UserRole>,
}

/// User payload returned by register and login. Never carries the hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
}

/// Full profile returned by the user lookup endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub role: UserRole,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            role: model.role,
        }
    }
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            address: model.address,
            role: model.role,
            created_at: model.created_at,
        }
    }
}

pub struct AuthService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl AuthService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a user account, and for suppliers the public profile row that
    /// discovery reads. Both inserts share one transaction.
    #[instrument(skip(self, request), fields(phone = %request.phone))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserSummary, ServiceError> {
        request.validate()?;
        let role = request
            .role
            .ok_or_else(|| ServiceError::ValidationError("Role is required".to_string()))?;

        let existing = User::find()
            .filter(user::Column::Phone.eq(request.phone.clone()))
            .one(self.db_pool.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "User with this phone number already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;

        // thread_rng is not Send, so draw the simulated logistics values
        // before the first await
        let (distance_km, delivery_time_minutes) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(1..=5) as f64,
                rng.gen_range(15..75),
            )
        };

        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let txn = self.db_pool.begin().await?;

        let user_model = user::ActiveModel {
            id: Set(user_id),
            name: Set(request.name.clone()),
            phone: Set(request.phone.clone()),
            address: Set(request.address.clone()),
            password_hash: Set(password_hash),
            role: Set(role),
            created_at: Set(now),
        };
        let inserted = user_model.insert(&txn).await.map_err(|err| {
            // The unique phone index closes the check-then-insert race
            if is_unique_violation(&err) {
                ServiceError::Conflict("User with this phone number already exists".to_string())
            } else {
                ServiceError::DatabaseError(err)
            }
        })?;

        if role == UserRole::Supplier {
            let profile = supplier::ActiveModel {
                id: Set(user_id),
                name: Set(request.name),
                address: Set(request.address),
                phone: Set(request.phone),
                rating: Set(0.0),
                total_reviews: Set(0),
                distance_km: Set(distance_km),
                delivery_time_minutes: Set(delivery_time_minutes),
                created_at: Set(now),
            };
            profile.insert(&txn).await?;
        }

        txn.commit().await?;

        info!(user_id = %user_id, role = role.as_str(), "user registered");
        if let Err(e) = self
            .event_sender
            .send(Event::UserRegistered {
                user_id,
                role: role.as_str().to_string(),
            })
            .await
        {
            error!("Failed to send UserRegistered event: {}", e);
        }

        Ok(inserted.into())
    }

    /// Verifies phone + role + password. All three failures report 401 so the
    /// response does not reveal which part was wrong beyond the password step.
    #[instrument(skip(self, request), fields(phone = %request.phone))]
    pub async fn login(&self, request: LoginRequest) -> Result<UserSummary, ServiceError> {
        request.validate()?;
        let role = request
            .role
            .ok_or_else(|| ServiceError::ValidationError("Role is required".to_string()))?;

        let user = User::find()
            .filter(user::Column::Phone.eq(request.phone.clone()))
            .filter(user::Column::Role.eq(role))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::AuthError("Invalid phone number or role".to_string())
            })?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(ServiceError::AuthError("Invalid password".to_string()));
        }

        info!(user_id = %user.id, "user logged in");
        Ok(user.into())
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<UserProfile, ServiceError> {
        let user = User::find_by_id(user_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    let text = err.to_string().to_ascii_lowercase();
    text.contains("unique") || text.contains("duplicate")
}
