use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::credit_transaction::{self, CreditStatus};
use crate::errors::ServiceError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSummary {
    /// Sum of all pending amounts
    pub total_outstanding: Decimal,
    /// Pending amounts created since the start of the current week (Sunday)
    pub due_this_week: Decimal,
    /// All amounts created since the start of the current month
    pub this_month: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransactionResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub amount: Decimal,
    pub status: CreditStatus,
    pub created_at: DateTime<Utc>,
}

impl From<credit_transaction::Model> for CreditTransactionResponse {
    fn from(model: credit_transaction::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            supplier_id: model.supplier_id,
            supplier_name: model.supplier_name,
            amount: model.amount,
            status: model.status,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditReport {
    pub summary: CreditSummary,
    pub transactions: Vec<CreditTransactionResponse>,
}

pub struct CreditService {
    db_pool: Arc<DbPool>,
}

impl CreditService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Credit position for a vendor: aggregate summary plus the full
    /// transaction list, newest first.
    #[instrument(skip(self))]
    pub async fn vendor_credit(&self, vendor_id: Uuid) -> Result<CreditReport, ServiceError> {
        let transactions = credit_transaction::Entity::find()
            .filter(credit_transaction::Column::VendorId.eq(vendor_id))
            .order_by_desc(credit_transaction::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;

        let summary = summarize_transactions(&transactions, Utc::now());

        Ok(CreditReport {
            summary,
            transactions: transactions
                .into_iter()
                .map(CreditTransactionResponse::from)
                .collect(),
        })
    }
}

/// Aggregates transactions relative to `now`. Weeks start on Sunday.
pub fn summarize_transactions(
    transactions: &[credit_transaction::Model],
    now: DateTime<Utc>,
) -> CreditSummary {
    let week_start = start_of_week(now);
    let month_start = start_of_month(now);

    let mut total_outstanding = Decimal::ZERO;
    let mut due_this_week = Decimal::ZERO;
    let mut this_month = Decimal::ZERO;

    for txn in transactions {
        if txn.status == CreditStatus::Pending {
            total_outstanding += txn.amount;
            if txn.created_at >= week_start {
                due_this_week += txn.amount;
            }
        }
        if txn.created_at >= month_start {
            this_month += txn.amount;
        }
    }

    CreditSummary {
        total_outstanding,
        due_this_week,
        this_month,
    }
}

fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    let back = Days::new(u64::from(date.weekday().num_days_from_sunday()));
    let sunday = date.checked_sub_days(back).unwrap_or(date);
    DateTime::from_naive_utc_and_offset(sunday.and_time(NaiveTime::MIN), Utc)
}

fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    let first = date.with_day(1).unwrap_or(date);
    DateTime::from_naive_utc_and_offset(first.and_time(NaiveTime::MIN), Utc)
}
