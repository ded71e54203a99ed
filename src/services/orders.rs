use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::order::{OrderLine, OrderLines, OrderStatus};
use crate::entities::user::UserRole;
use crate::entities::{credit_transaction, incoming_order, inventory_item, order, supplier, user};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[validate(required(message = "Vendor id is required"))]
    pub vendor_id: Option<Uuid>,

    #[validate(required(message = "Supplier id is required"))]
    pub supplier_id: Option<Uuid>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Order items are required"))]
    pub items: Vec<OrderLineRequest>,

    #[validate(required(message = "Total is required"))]
    pub total: Option<Decimal>,

    #[serde(default)]
    pub delivery_fee: Option<Decimal>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,

    #[serde(default)]
    pub special_notes: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OrderLineRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,

    #[validate(required(message = "Item quantity is required"))]
    pub quantity: Option<i32>,

    #[validate(required(message = "Item price is required"))]
    pub price: Option<Decimal>,

    #[serde(default)]
    pub unit: String,
}

/// Query-string parameters for order history.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub status: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub supplier_id: Uuid,
    pub vendor_name: String,
    pub vendor_address: String,
    pub supplier_name: String,
    pub supplier_phone: String,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub delivery_fee: Decimal,
    pub payment_method: String,
    pub special_notes: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            vendor_id: model.vendor_id,
            supplier_id: model.supplier_id,
            vendor_name: model.vendor_name,
            vendor_address: model.vendor_address,
            supplier_name: model.supplier_name,
            supplier_phone: model.supplier_phone,
            items: model.items.0,
            total: model.total,
            delivery_fee: model.delivery_fee,
            payment_method: model.payment_method,
            special_notes: model.special_notes,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<incoming_order::Model> for OrderResponse {
    fn from(model: incoming_order::Model) -> Self {
        Self {
            id: model.id,
            vendor_id: model.vendor_id,
            supplier_id: model.supplier_id,
            vendor_name: model.vendor_name,
            vendor_address: model.vendor_address,
            supplier_name: model.supplier_name,
            supplier_phone: model.supplier_phone,
            items: model.items.0,
            total: model.total,
            delivery_fee: model.delivery_fee,
            payment_method: model.payment_method,
            special_notes: model.special_notes,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates the vendor copy and the supplier mirror in one transaction.
    /// Both rows share the same id for the life of the order.
    #[instrument(skip(self, request))]
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<Uuid, ServiceError> {
        request.validate()?;
        for line in &request.items {
            line.validate()?;
        }
        let vendor_id = request
            .vendor_id
            .ok_or_else(|| ServiceError::ValidationError("Vendor id is required".to_string()))?;
        let supplier_id = request
            .supplier_id
            .ok_or_else(|| ServiceError::ValidationError("Supplier id is required".to_string()))?;
        let total = request
            .total
            .ok_or_else(|| ServiceError::ValidationError("Total is required".to_string()))?;

        // Counterparty snapshots; missing rows degrade to placeholders rather
        // than failing the order
        let vendor = user::Entity::find_by_id(vendor_id)
            .filter(user::Column::Role.eq(UserRole::Vendor))
            .one(self.db_pool.as_ref())
            .await?;
        let (vendor_name, vendor_address) = match vendor {
            Some(v) => (v.name, v.address),
            None => ("Unknown Vendor".to_string(), "Unknown Address".to_string()),
        };

        let supplier = supplier::Entity::find_by_id(supplier_id)
            .one(self.db_pool.as_ref())
            .await?;
        let (supplier_name, supplier_phone) = match supplier {
            Some(s) => (s.name, s.phone),
            None => ("Unknown Supplier".to_string(), "N/A".to_string()),
        };

        let order_id = Uuid::new_v4();
        let now = Utc::now();
        let items = OrderLines(
            request
                .items
                .into_iter()
                .map(|line| OrderLine {
                    name: line.name,
                    quantity: line.quantity.unwrap_or(0),
                    price: line.price.unwrap_or_default(),
                    unit: line.unit,
                })
                .collect(),
        );
        let delivery_fee = request.delivery_fee.unwrap_or_default();

        let txn = self.db_pool.begin().await?;

        order::ActiveModel {
            id: Set(order_id),
            vendor_id: Set(vendor_id),
            supplier_id: Set(supplier_id),
            vendor_name: Set(vendor_name.clone()),
            vendor_address: Set(vendor_address.clone()),
            supplier_name: Set(supplier_name.clone()),
            supplier_phone: Set(supplier_phone.clone()),
            items: Set(items.clone()),
            total: Set(total),
            delivery_fee: Set(delivery_fee),
            payment_method: Set(request.payment_method.clone()),
            special_notes: Set(request.special_notes.clone()),
            status: Set(OrderStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        incoming_order::ActiveModel {
            id: Set(order_id),
            vendor_id: Set(vendor_id),
            supplier_id: Set(supplier_id),
            vendor_name: Set(vendor_name),
            vendor_address: Set(vendor_address),
            supplier_name: Set(supplier_name),
            supplier_phone: Set(supplier_phone),
            items: Set(items),
            total: Set(total),
            delivery_fee: Set(delivery_fee),
            payment_method: Set(request.payment_method),
            special_notes: Set(request.special_notes),
            status: Set(OrderStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(order_id = %order_id, vendor_id = %vendor_id, supplier_id = %supplier_id, "order placed");
        if let Err(e) = self.event_sender.send(Event::OrderPlaced(order_id)).await {
            error!("Failed to send OrderPlaced event: {}", e);
        }

        Ok(order_id)
    }

    /// Active orders for a vendor, newest first.
    #[instrument(skip(self))]
    pub async fn vendor_orders(&self, vendor_id: Uuid) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = order::Entity::find()
            .filter(order::Column::VendorId.eq(vendor_id))
            .filter(order::Column::Status.is_in([OrderStatus::Pending, OrderStatus::Confirmed]))
            .order_by_desc(order::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    /// Settled orders for a vendor, optionally narrowed by status and a
    /// date window. `to_date` is inclusive of the whole day.
    #[instrument(skip(self))]
    pub async fn vendor_history(
        &self,
        vendor_id: Uuid,
        query: HistoryQuery,
    ) -> Result<Vec<OrderResponse>, ServiceError> {
        let statuses = history_statuses(query.status.as_deref())?;

        let mut find = order::Entity::find()
            .filter(order::Column::VendorId.eq(vendor_id))
            .order_by_desc(order::Column::CreatedAt);

        if let Some(statuses) = statuses {
            find = find.filter(order::Column::Status.is_in(statuses));
        }
        if let Some(from) = query.from_date {
            find = find.filter(order::Column::CreatedAt.gte(day_start(from)));
        }
        if let Some(to) = query.to_date {
            let upper = to
                .checked_add_days(chrono::Days::new(1))
                .ok_or_else(|| ServiceError::ValidationError("Invalid toDate".to_string()))?;
            find = find.filter(order::Column::CreatedAt.lt(day_start(upper)));
        }

        let orders = find.all(self.db_pool.as_ref()).await?;
        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    /// Supplier work queue, newest first, optionally narrowed by status.
    #[instrument(skip(self))]
    pub async fn incoming_orders(
        &self,
        supplier_id: Uuid,
        query: StatusQuery,
    ) -> Result<Vec<OrderResponse>, ServiceError> {
        let mut find = incoming_order::Entity::find()
            .filter(incoming_order::Column::SupplierId.eq(supplier_id))
            .order_by_desc(incoming_order::Column::CreatedAt);

        if let Some(raw) = query.status.as_deref().filter(|s| !s.eq_ignore_ascii_case("all")) {
            let status = OrderStatus::parse(raw).ok_or_else(|| {
                ServiceError::InvalidStatus(format!("Unknown order status '{}'", raw))
            })?;
            find = find.filter(incoming_order::Column::Status.eq(status));
        }

        let orders = find.all(self.db_pool.as_ref()).await?;
        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    /// Vendor-initiated cancellation, allowed while the order is still
    /// pending or confirmed. Both copies move to cancelled together.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, vendor_id: Uuid, order_id: Uuid) -> Result<(), ServiceError> {
        let existing = order::Entity::find_by_id(order_id)
            .filter(order::Column::VendorId.eq(vendor_id))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        if !matches!(
            existing.status,
            OrderStatus::Pending | OrderStatus::Confirmed
        ) {
            return Err(ServiceError::OrderError(format!(
                "Order cannot be cancelled in '{}' status",
                existing.status.as_str()
            )));
        }
        let old_status = existing.status;

        let txn = self.db_pool.begin().await?;
        set_vendor_status(&txn, existing, OrderStatus::Cancelled).await?;
        set_incoming_status_by_id(&txn, order_id, OrderStatus::Cancelled).await?;
        txn.commit().await?;

        self.emit_status_change(order_id, old_status, OrderStatus::Cancelled)
            .await;
        Ok(())
    }

    /// Supplier accepts a pending order and commits the stock for it. Each
    /// line is matched against the supplier's inventory by item name; a line
    /// with no matching item is skipped, a line with insufficient stock
    /// aborts the whole acceptance and no quantity changes survive.
    #[instrument(skip(self))]
    pub async fn accept_order(
        &self,
        supplier_id: Uuid,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        let incoming = self.find_incoming(supplier_id, order_id).await?;
        if incoming.status != OrderStatus::Pending {
            return Err(ServiceError::InvalidStatus(format!(
                "Order cannot be accepted in '{}' status",
                incoming.status.as_str()
            )));
        }

        let txn = self.db_pool.begin().await?;

        for line in &incoming.items.0 {
            let item = inventory_item::Entity::find()
                .filter(inventory_item::Column::SupplierId.eq(supplier_id))
                .filter(inventory_item::Column::Name.eq(line.name.clone()))
                .one(&txn)
                .await?;

            let Some(item) = item else {
                warn!(order_id = %order_id, item_name = %line.name, "ordered item not in supplier inventory, skipping");
                continue;
            };

            if item.quantity < line.quantity {
                // Early return drops the open transaction and rolls back any
                // deductions already applied
                return Err(ServiceError::InventoryError(format!(
                    "Insufficient stock for {}",
                    line.name
                )));
            }

            let new_quantity = item.quantity - line.quantity;
            let mut active: inventory_item::ActiveModel = item.into();
            active.quantity = Set(new_quantity);
            active.updated_at = Set(Utc::now());
            active.update(&txn).await?;
        }

        set_incoming_status(&txn, incoming, OrderStatus::Confirmed).await?;
        set_vendor_status_by_id(&txn, order_id, OrderStatus::Confirmed).await?;
        txn.commit().await?;

        self.emit_status_change(order_id, OrderStatus::Pending, OrderStatus::Confirmed)
            .await;
        Ok(())
    }

    /// Supplier declines a pending order. The vendor copy reads 'cancelled',
    /// the supplier copy keeps the 'rejected' disposition.
    #[instrument(skip(self))]
    pub async fn reject_order(
        &self,
        supplier_id: Uuid,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        let incoming = self.find_incoming(supplier_id, order_id).await?;
        if incoming.status != OrderStatus::Pending {
            return Err(ServiceError::InvalidStatus(format!(
                "Order cannot be rejected in '{}' status",
                incoming.status.as_str()
            )));
        }

        let txn = self.db_pool.begin().await?;
        set_incoming_status(&txn, incoming, OrderStatus::Rejected).await?;
        set_vendor_status_by_id(&txn, order_id, OrderStatus::Cancelled).await?;
        txn.commit().await?;

        self.emit_status_change(order_id, OrderStatus::Pending, OrderStatus::Rejected)
            .await;
        Ok(())
    }

    /// Supplier marks a confirmed order delivered. The vendor copy reads
    /// 'completed'. A Credit-paid order also gets a pending credit
    /// transaction for its full total, in the same transaction.
    #[instrument(skip(self))]
    pub async fn deliver_order(
        &self,
        supplier_id: Uuid,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        let incoming = self.find_incoming(supplier_id, order_id).await?;
        if incoming.status != OrderStatus::Confirmed {
            return Err(ServiceError::InvalidStatus(format!(
                "Order cannot be delivered in '{}' status",
                incoming.status.as_str()
            )));
        }

        let vendor_id = incoming.vendor_id;
        let total = incoming.total;
        let supplier_name = incoming.supplier_name.clone();
        let on_credit = incoming.payment_method == "Credit";

        let txn = self.db_pool.begin().await?;
        set_incoming_status(&txn, incoming, OrderStatus::Delivered).await?;
        set_vendor_status_by_id(&txn, order_id, OrderStatus::Completed).await?;

        if on_credit {
            credit_transaction::ActiveModel {
                id: Set(Uuid::new_v4()),
                vendor_id: Set(vendor_id),
                order_id: Set(order_id),
                supplier_id: Set(supplier_id),
                supplier_name: Set(supplier_name),
                amount: Set(total),
                status: Set(credit_transaction::CreditStatus::Pending),
                created_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        self.emit_status_change(order_id, OrderStatus::Confirmed, OrderStatus::Delivered)
            .await;
        if on_credit {
            if let Err(e) = self
                .event_sender
                .send(Event::CreditTransactionCreated {
                    vendor_id,
                    order_id,
                    amount: total,
                })
                .await
            {
                error!("Failed to send CreditTransactionCreated event: {}", e);
            }
        }
        Ok(())
    }

    async fn find_incoming(
        &self,
        supplier_id: Uuid,
        order_id: Uuid,
    ) -> Result<incoming_order::Model, ServiceError> {
        incoming_order::Entity::find_by_id(order_id)
            .filter(incoming_order::Column::SupplierId.eq(supplier_id))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Incoming order not found".to_string()))
    }

    async fn emit_status_change(&self, order_id: Uuid, old: OrderStatus, new: OrderStatus) {
        info!(order_id = %order_id, from = old.as_str(), to = new.as_str(), "order status changed");
        if let Err(e) = self
            .event_sender
            .send(Event::OrderStatusChanged {
                order_id,
                old_status: old.as_str().to_string(),
                new_status: new.as_str().to_string(),
            })
            .await
        {
            error!("Failed to send OrderStatusChanged event: {}", e);
        }
    }
}

async fn set_vendor_status(
    txn: &sea_orm::DatabaseTransaction,
    model: order::Model,
    status: OrderStatus,
) -> Result<(), ServiceError> {
    let mut active: order::ActiveModel = model.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    active.update(txn).await?;
    Ok(())
}

async fn set_vendor_status_by_id(
    txn: &sea_orm::DatabaseTransaction,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<(), ServiceError> {
    let model = order::Entity::find_by_id(order_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
    set_vendor_status(txn, model, status).await
}

async fn set_incoming_status(
    txn: &sea_orm::DatabaseTransaction,
    model: incoming_order::Model,
    status: OrderStatus,
) -> Result<(), ServiceError> {
    let mut active: incoming_order::ActiveModel = model.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    active.update(txn).await?;
    Ok(())
}

async fn set_incoming_status_by_id(
    txn: &sea_orm::DatabaseTransaction,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<(), ServiceError> {
    let model = incoming_order::Entity::find_by_id(order_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Incoming order not found".to_string()))?;
    set_incoming_status(txn, model, status).await
}

/// Resolves the history status filter. `None` uses the settled-order default,
/// "all" disables filtering, anything else must name a single status.
fn history_statuses(raw: Option<&str>) -> Result<Option<Vec<OrderStatus>>, ServiceError> {
    match raw {
        None => Ok(Some(vec![
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Rejected,
        ])),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => {
            let status = OrderStatus::parse(s).ok_or_else(|| {
                ServiceError::InvalidStatus(format!("Unknown order status '{}'", s))
            })?;
            Ok(Some(vec![status]))
        }
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).unwrap_or_default(), Utc)
}
