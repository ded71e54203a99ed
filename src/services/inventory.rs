use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::inventory_item::{self, Entity as InventoryItem};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Derived availability label. Never persisted; always recomputed from the
/// current quantity so list and detail views can't disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "in-stock")]
    InStock,
    #[serde(rename = "low-stock")]
    LowStock,
    #[serde(rename = "out-of-stock")]
    OutOfStock,
}

pub fn stock_status(quantity: i32) -> StockStatus {
    if quantity > 10 {
        StockStatus::InStock
    } else if quantity > 0 {
        StockStatus::LowStock
    } else {
        StockStatus::OutOfStock
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertItemRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Unit is required"))]
    pub unit: String,

    #[validate(required(message = "Price is required"))]
    pub price: Option<Decimal>,

    #[validate(required(message = "Quantity is required"))]
    pub quantity: Option<i32>,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemResponse {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub price: Decimal,
    pub quantity: i32,
    pub description: String,
    pub status: StockStatus,
}

impl From<inventory_item::Model> for InventoryItemResponse {
    fn from(model: inventory_item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            unit: model.unit,
            price: model.price,
            quantity: model.quantity,
            description: model.description,
            status: stock_status(model.quantity),
        }
    }
}

pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        supplier_id: Uuid,
    ) -> Result<Vec<InventoryItemResponse>, ServiceError> {
        let items = InventoryItem::find()
            .filter(inventory_item::Column::SupplierId.eq(supplier_id))
            .order_by_asc(inventory_item::Column::Name)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(items.into_iter().map(InventoryItemResponse::from).collect())
    }

    #[instrument(skip(self, request), fields(item_name = %request.name))]
    pub async fn add_item(
        &self,
        supplier_id: Uuid,
        request: UpsertItemRequest,
    ) -> Result<InventoryItemResponse, ServiceError> {
        request.validate()?;
        let price = request
            .price
            .ok_or_else(|| ServiceError::ValidationError("Price is required".to_string()))?;
        let quantity = request
            .quantity
            .ok_or_else(|| ServiceError::ValidationError("Quantity is required".to_string()))?;

        let now = Utc::now();
        let model = inventory_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_id: Set(supplier_id),
            name: Set(request.name),
            unit: Set(request.unit),
            price: Set(price),
            quantity: Set(quantity),
            description: Set(request.description),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model.insert(self.db_pool.as_ref()).await?;

        info!(item_id = %inserted.id, supplier_id = %supplier_id, "inventory item added");
        Ok(inserted.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update_item(
        &self,
        supplier_id: Uuid,
        item_id: Uuid,
        request: UpsertItemRequest,
    ) -> Result<InventoryItemResponse, ServiceError> {
        request.validate()?;
        let price = request
            .price
            .ok_or_else(|| ServiceError::ValidationError("Price is required".to_string()))?;
        let quantity = request
            .quantity
            .ok_or_else(|| ServiceError::ValidationError("Quantity is required".to_string()))?;

        let existing = InventoryItem::find_by_id(item_id)
            .filter(inventory_item::Column::SupplierId.eq(supplier_id))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Item not found".to_string()))?;

        let old_quantity = existing.quantity;
        let mut model: inventory_item::ActiveModel = existing.into();
        model.name = Set(request.name);
        model.unit = Set(request.unit);
        model.price = Set(price);
        model.quantity = Set(quantity);
        model.description = Set(request.description);
        model.updated_at = Set(Utc::now());
        let updated = model.update(self.db_pool.as_ref()).await?;

        if old_quantity != updated.quantity {
            if let Err(e) = self
                .event_sender
                .send(Event::InventoryAdjusted {
                    item_id,
                    old_quantity,
                    new_quantity: updated.quantity,
                })
                .await
            {
                error!("Failed to send InventoryAdjusted event: {}", e);
            }
        }

        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, supplier_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let existing = InventoryItem::find_by_id(item_id)
            .filter(inventory_item::Column::SupplierId.eq(supplier_id))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Item not found".to_string()))?;

        let model: inventory_item::ActiveModel = existing.into();
        model.delete(self.db_pool.as_ref()).await?;

        info!(item_id = %item_id, supplier_id = %supplier_id, "inventory item deleted");
        if let Err(e) = self
            .event_sender
            .send(Event::InventoryItemRemoved(item_id))
            .await
        {
            error!("Failed to send InventoryItemRemoved event: {}", e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_above_ten_are_in_stock() {
        assert_eq!(stock_status(11), StockStatus::InStock);
        assert_eq!(stock_status(500), StockStatus::InStock);
    }

    #[test]
    fn boundary_quantity_ten_is_low_stock() {
        assert_eq!(stock_status(10), StockStatus::LowStock);
        assert_eq!(stock_status(1), StockStatus::LowStock);
    }

    #[test]
    fn zero_and_negative_are_out_of_stock() {
        assert_eq!(stock_status(0), StockStatus::OutOfStock);
        assert_eq!(stock_status(-3), StockStatus::OutOfStock);
    }

    #[test]
    fn upsert_request_requires_price_and_quantity() {
        let request = UpsertItemRequest {
            name: "Onions".into(),
            unit: "kg".into(),
            price: None,
            quantity: None,
            description: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
