use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::{OrderLines, OrderStatus};

/// Supplier-side mirror of a vendor order, sharing the vendor copy's id.
/// The supplier works this queue (accept/reject/deliver); every status
/// change is written to both copies in one transaction.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "incoming_orders")]
pub struct Model {
    /// Same id as the vendor-side order row
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub vendor_id: Uuid,
    pub supplier_id: Uuid,

    pub vendor_name: String,
    pub vendor_address: String,
    pub supplier_name: String,
    pub supplier_phone: String,

    #[sea_orm(column_type = "Json")]
    pub items: OrderLines,

    pub total: Decimal,
    pub delivery_fee: Decimal,
    pub payment_method: String,
    pub special_notes: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
