use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{rating, supplier, user};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    #[validate(required(message = "Vendor id is required"))]
    pub vendor_id: Option<Uuid>,

    #[validate(required(message = "Supplier id is required"))]
    pub supplier_id: Option<Uuid>,

    #[validate(required(message = "Order id is required"))]
    pub order_id: Option<Uuid>,

    #[validate(required(message = "Overall rating is required"), range(min = 1, max = 5, message = "Overall rating must be between 1 and 5"))]
    pub overall_rating: Option<i32>,

    /// Sub-scores default to the overall rating when omitted
    pub quality: Option<i32>,
    pub delivery: Option<i32>,
    pub communication: Option<i32>,

    #[serde(default)]
    pub review_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub vendor_name: String,
    pub overall_rating: i32,
    pub quality: i32,
    pub delivery: i32,
    pub communication: i32,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
}

impl From<&rating::Model> for ReviewResponse {
    fn from(model: &rating::Model) -> Self {
        Self {
            vendor_name: model.vendor_name.clone(),
            overall_rating: model.overall_rating,
            quality: model.quality,
            delivery: model.delivery,
            communication: model.communication,
            review_text: model.review_text.clone(),
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub overall_rating: f64,
    pub total_reviews: usize,
    /// Keys "1" through "5", always present
    pub rating_breakdown: BTreeMap<String, usize>,
    pub recent_reviews: Vec<ReviewResponse>,
}

pub struct RatingService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl RatingService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records a review and folds it into the supplier's running average in
    /// one transaction, so the profile can never drift from the reviews.
    #[instrument(skip(self, request))]
    pub async fn submit_rating(&self, request: SubmitRatingRequest) -> Result<(), ServiceError> {
        request.validate()?;
        let vendor_id = request
            .vendor_id
            .ok_or_else(|| ServiceError::ValidationError("Vendor id is required".to_string()))?;
        let supplier_id = request
            .supplier_id
            .ok_or_else(|| ServiceError::ValidationError("Supplier id is required".to_string()))?;
        let order_id = request
            .order_id
            .ok_or_else(|| ServiceError::ValidationError("Order id is required".to_string()))?;
        let overall = request.overall_rating.ok_or_else(|| {
            ServiceError::ValidationError("Overall rating is required".to_string())
        })?;

        let vendor_name = user::Entity::find_by_id(vendor_id)
            .one(self.db_pool.as_ref())
            .await?
            .map(|v| v.name)
            .unwrap_or_else(|| "Anonymous Vendor".to_string());

        let txn = self.db_pool.begin().await?;

        let profile = supplier::Entity::find_by_id(supplier_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))?;

        rating::ActiveModel {
            id: Set(Uuid::new_v4()),
            vendor_id: Set(vendor_id),
            vendor_name: Set(vendor_name),
            supplier_id: Set(supplier_id),
            order_id: Set(order_id),
            overall_rating: Set(overall),
            quality: Set(request.quality.unwrap_or(overall)),
            delivery: Set(request.delivery.unwrap_or(overall)),
            communication: Set(request.communication.unwrap_or(overall)),
            review_text: Set(request.review_text),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let new_average = next_running_average(profile.rating, profile.total_reviews, overall);
        let new_count = profile.total_reviews + 1;
        let mut active: supplier::ActiveModel = profile.into();
        active.rating = Set(new_average);
        active.total_reviews = Set(new_count);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(supplier_id = %supplier_id, rating = overall, average = new_average, "rating submitted");
        if let Err(e) = self
            .event_sender
            .send(Event::RatingSubmitted {
                supplier_id,
                overall_rating: overall,
            })
            .await
        {
            error!("Failed to send RatingSubmitted event: {}", e);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn supplier_summary(&self, supplier_id: Uuid) -> Result<RatingSummary, ServiceError> {
        supplier::Entity::find_by_id(supplier_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))?;

        let reviews = rating::Entity::find()
            .filter(rating::Column::SupplierId.eq(supplier_id))
            .order_by_desc(rating::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(summarize_reviews(&reviews))
    }
}

/// Running average over `count` prior reviews with `new_rating` folded in,
/// rounded to one decimal.
pub fn next_running_average(current: f64, count: i32, new_rating: i32) -> f64 {
    let count = count.max(0) as f64;
    round_to_tenth((current * count + f64::from(new_rating)) / (count + 1.0))
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregates reviews into the public summary shape. The breakdown always
/// carries all five buckets, zeroed when empty.
pub fn summarize_reviews(reviews: &[rating::Model]) -> RatingSummary {
    let mut breakdown: BTreeMap<String, usize> = (1..=5).map(|n| (n.to_string(), 0)).collect();
    for review in reviews {
        if let Some(bucket) = breakdown.get_mut(&review.overall_rating.to_string()) {
            *bucket += 1;
        }
    }

    let overall_rating = if reviews.is_empty() {
        0.0
    } else {
        let sum: i32 = reviews.iter().map(|r| r.overall_rating).sum();
        round_to_tenth(f64::from(sum) / reviews.len() as f64)
    };

    RatingSummary {
        overall_rating,
        total_reviews: reviews.len(),
        rating_breakdown: breakdown,
        recent_reviews: reviews.iter().take(10).map(ReviewResponse::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(overall: i32) -> rating::Model {
        rating::Model {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            vendor_name: "Chaat Corner".to_string(),
            supplier_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            overall_rating: overall,
            quality: overall,
            delivery: overall,
            communication: overall,
            review_text: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn running_average_rounds_to_one_decimal() {
        // Four fives then a one lands on 4.2
        let mut average = 0.0;
        for (count, new_rating) in [(0, 5), (1, 5), (2, 5), (3, 5), (4, 1)] {
            average = next_running_average(average, count, new_rating);
        }
        assert_eq!(average, 4.2);
    }

    #[test]
    fn first_rating_becomes_the_average() {
        assert_eq!(next_running_average(0.0, 0, 4), 4.0);
    }

    #[test]
    fn summary_breakdown_has_all_buckets() {
        let summary = summarize_reviews(&[]);
        assert_eq!(summary.total_reviews, 0);
        assert_eq!(summary.overall_rating, 0.0);
        assert_eq!(summary.rating_breakdown.len(), 5);
        assert_eq!(summary.rating_breakdown["3"], 0);
    }

    #[test]
    fn summary_counts_ratings_per_bucket() {
        let reviews = vec![review(5), review(5), review(5), review(5), review(1)];
        let summary = summarize_reviews(&reviews);
        assert_eq!(summary.total_reviews, 5);
        assert_eq!(summary.overall_rating, 4.2);
        assert_eq!(summary.rating_breakdown["5"], 4);
        assert_eq!(summary.rating_breakdown["1"], 1);
        assert_eq!(summary.recent_reviews.len(), 5);
    }

    #[test]
    fn rating_request_rejects_out_of_range_scores() {
        let request = SubmitRatingRequest {
            vendor_id: Some(Uuid::new_v4()),
            supplier_id: Some(Uuid::new_v4()),
            order_id: Some(Uuid::new_v4()),
            overall_rating: Some(6),
            quality: None,
            delivery: None,
            communication: None,
            review_text: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
