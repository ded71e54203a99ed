use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    auth::AuthService, credit::CreditService, inventory::InventoryService, orders::OrderService,
    ratings::RatingService, suppliers::SupplierService,
};

pub mod auth;
pub mod common;
pub mod credit;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod ratings;
pub mod suppliers;
pub mod users;

pub use crate::AppState;

/// Service container shared across all handlers.
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub suppliers: Arc<SupplierService>,
    pub inventory: Arc<InventoryService>,
    pub orders: Arc<OrderService>,
    pub ratings: Arc<RatingService>,
    pub credit: Arc<CreditService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            auth: Arc::new(AuthService::new(db_pool.clone(), event_sender.clone())),
            suppliers: Arc::new(SupplierService::new(db_pool.clone())),
            inventory: Arc::new(InventoryService::new(db_pool.clone(), event_sender.clone())),
            orders: Arc::new(OrderService::new(db_pool.clone(), event_sender.clone())),
            ratings: Arc::new(RatingService::new(db_pool.clone(), event_sender)),
            credit: Arc::new(CreditService::new(db_pool)),
        }
    }
}
