use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{inventory_item, supplier};
use crate::errors::ServiceError;
use crate::services::inventory::InventoryItemResponse;
use crate::services::ratings::{summarize_reviews, RatingSummary};

/// Query-string parameters for supplier discovery.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryQuery {
    pub search: Option<String>,
    pub max_distance: Option<f64>,
    pub sort_by: Option<SortBy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Distance,
    Price,
    Rating,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub rating: f64,
    pub total_reviews: i32,
    pub distance_km: f64,
    pub delivery_time_minutes: i32,
    /// Serialized as `inventory`, the name vendors' clients expect
    #[serde(rename = "inventory")]
    pub items: Vec<InventoryItemResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_item_price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDetail {
    #[serde(flatten)]
    pub summary: SupplierSummary,
    pub ratings: RatingSummary,
}

pub struct SupplierService {
    db_pool: Arc<DbPool>,
}

impl SupplierService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Lists suppliers with their catalogs, filtered and sorted per the query.
    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        query: DiscoveryQuery,
    ) -> Result<Vec<SupplierSummary>, ServiceError> {
        let suppliers = supplier::Entity::find()
            .order_by_asc(supplier::Column::Name)
            .find_with_related(inventory_item::Entity)
            .all(self.db_pool.as_ref())
            .await?;

        let summaries = suppliers
            .into_iter()
            .map(|(profile, items)| build_summary(profile, items))
            .collect();

        Ok(filter_and_sort(summaries, &query))
    }

    /// Single supplier with catalog and rating summary.
    #[instrument(skip(self))]
    pub async fn get_supplier(&self, supplier_id: Uuid) -> Result<SupplierDetail, ServiceError> {
        let profile = supplier::Entity::find_by_id(supplier_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))?;

        let items = inventory_item::Entity::find()
            .filter(inventory_item::Column::SupplierId.eq(supplier_id))
            .order_by_asc(inventory_item::Column::Name)
            .all(self.db_pool.as_ref())
            .await?;

        let reviews = crate::entities::rating::Entity::find()
            .filter(crate::entities::rating::Column::SupplierId.eq(supplier_id))
            .order_by_desc(crate::entities::rating::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(SupplierDetail {
            summary: build_summary(profile, items),
            ratings: summarize_reviews(&reviews),
        })
    }
}

fn build_summary(profile: supplier::Model, items: Vec<inventory_item::Model>) -> SupplierSummary {
    let average_item_price = average_price(&items);
    SupplierSummary {
        id: profile.id,
        name: profile.name,
        address: profile.address,
        phone: profile.phone,
        rating: profile.rating,
        total_reviews: profile.total_reviews,
        distance_km: profile.distance_km,
        delivery_time_minutes: profile.delivery_time_minutes,
        items: items.into_iter().map(InventoryItemResponse::from).collect(),
        average_item_price,
    }
}

fn average_price(items: &[inventory_item::Model]) -> Option<Decimal> {
    if items.is_empty() {
        return None;
    }
    let total: Decimal = items.iter().map(|item| item.price).sum();
    Some(total / Decimal::from(items.len() as i64))
}

/// Applies search, distance cap and sort order to an already-loaded supplier
/// list. A search term matches the supplier name or any catalog item name,
/// case-insensitively.
pub fn filter_and_sort(
    mut suppliers: Vec<SupplierSummary>,
    query: &DiscoveryQuery,
) -> Vec<SupplierSummary> {
    if let Some(term) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let needle = term.to_lowercase();
        suppliers.retain(|supplier| {
            supplier.name.to_lowercase().contains(&needle)
                || supplier
                    .items
                    .iter()
                    .any(|item| item.name.to_lowercase().contains(&needle))
        });
    }

    if let Some(max_distance) = query.max_distance {
        suppliers.retain(|supplier| supplier.distance_km <= max_distance);
    }

    match query.sort_by.unwrap_or(SortBy::Distance) {
        SortBy::Distance => {
            suppliers.sort_by(|a, b| {
                a.distance_km
                    .partial_cmp(&b.distance_km)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        SortBy::Price => {
            // Suppliers with no catalog sort last
            suppliers.sort_by(|a, b| match (a.average_item_price, b.average_item_price) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        SortBy::Rating => {
            suppliers.sort_by(|a, b| {
                b.rating
                    .partial_cmp(&a.rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }

    suppliers
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn summary(name: &str, distance: f64, rating: f64, items: &[(&str, Decimal)]) -> SupplierSummary {
        let items: Vec<InventoryItemResponse> = items
            .iter()
            .map(|(item_name, price)| InventoryItemResponse {
                id: Uuid::new_v4(),
                name: (*item_name).to_string(),
                unit: "kg".to_string(),
                price: *price,
                quantity: 20,
                description: String::new(),
                status: crate::services::inventory::stock_status(20),
            })
            .collect();
        let average_item_price = if items.is_empty() {
            None
        } else {
            Some(items.iter().map(|i| i.price).sum::<Decimal>() / Decimal::from(items.len() as i64))
        };
        SupplierSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: "Market Road".to_string(),
            phone: "9000000000".to_string(),
            rating,
            total_reviews: 3,
            distance_km: distance,
            delivery_time_minutes: 30,
            items,
            average_item_price,
        }
    }

    #[test]
    fn search_matches_item_names() {
        let suppliers = vec![
            summary("Fresh Farms", 2.0, 4.0, &[("Onions", dec!(30))]),
            summary("Spice House", 3.0, 4.5, &[("Turmeric", dec!(120))]),
        ];
        let query = DiscoveryQuery {
            search: Some("onion".to_string()),
            ..Default::default()
        };

        let result = filter_and_sort(suppliers, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Fresh Farms");
    }

    #[test]
    fn search_matches_supplier_names_case_insensitively() {
        let suppliers = vec![
            summary("Fresh Farms", 2.0, 4.0, &[]),
            summary("Spice House", 3.0, 4.5, &[]),
        ];
        let query = DiscoveryQuery {
            search: Some("SPICE".to_string()),
            ..Default::default()
        };

        let result = filter_and_sort(suppliers, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Spice House");
    }

    #[test]
    fn max_distance_is_inclusive() {
        let suppliers = vec![
            summary("Near", 2.0, 4.0, &[]),
            summary("Far", 5.0, 4.5, &[]),
        ];
        let query = DiscoveryQuery {
            max_distance: Some(2.0),
            ..Default::default()
        };

        let result = filter_and_sort(suppliers, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Near");
    }

    #[test]
    fn default_sort_is_distance_ascending() {
        let suppliers = vec![
            summary("Far", 4.0, 4.0, &[]),
            summary("Near", 1.0, 3.0, &[]),
        ];

        let result = filter_and_sort(suppliers, &DiscoveryQuery::default());
        assert_eq!(result[0].name, "Near");
        assert_eq!(result[1].name, "Far");
    }

    #[test]
    fn rating_sort_is_descending() {
        let suppliers = vec![
            summary("Okay", 1.0, 3.0, &[]),
            summary("Great", 4.0, 4.8, &[]),
        ];
        let query = DiscoveryQuery {
            sort_by: Some(SortBy::Rating),
            ..Default::default()
        };

        let result = filter_and_sort(suppliers, &query);
        assert_eq!(result[0].name, "Great");
    }

    #[test]
    fn price_sort_puts_empty_catalogs_last() {
        let suppliers = vec![
            summary("Empty", 1.0, 4.0, &[]),
            summary("Pricey", 2.0, 4.0, &[("Saffron", dec!(500))]),
            summary("Cheap", 3.0, 4.0, &[("Onions", dec!(25))]),
        ];
        let query = DiscoveryQuery {
            sort_by: Some(SortBy::Price),
            ..Default::default()
        };

        let result = filter_and_sort(suppliers, &query);
        assert_eq!(result[0].name, "Cheap");
        assert_eq!(result[1].name, "Pricey");
        assert_eq!(result[2].name, "Empty");
    }
}
