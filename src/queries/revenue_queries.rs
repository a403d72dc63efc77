use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::Query;
use crate::errors::ServiceError;
use crate::models::{customer, invoice, InvoiceStatus};

/// One result row of [`RevenueByCustomerQuery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRevenue {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub total_revenue: Decimal,
}

/// Revenue per customer: sums invoice totals over the given statuses,
/// sorted by revenue descending (customer name as tie-break).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueByCustomerQuery {
    pub statuses: Vec<InvoiceStatus>,
}

impl Default for RevenueByCustomerQuery {
    /// Default filter counts realized revenue only: PAID and PARTIAL.
    fn default() -> Self {
        Self {
            statuses: vec![InvoiceStatus::Paid, InvoiceStatus::Partial],
        }
    }
}

#[async_trait]
impl Query for RevenueByCustomerQuery {
    type Result = Vec<CustomerRevenue>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let invoices = invoice::Entity::find()
            .filter(invoice::Column::Status.is_in(self.statuses.iter().copied()))
            .all(db)
            .await?;

        let mut totals: HashMap<Uuid, Decimal> = HashMap::new();
        for inv in &invoices {
            *totals.entry(inv.customer_id).or_insert(Decimal::ZERO) += inv.total_amount;
        }
        if totals.is_empty() {
            return Ok(vec![]);
        }

        let customers = customer::Entity::find()
            .filter(customer::Column::Id.is_in(totals.keys().copied()))
            .all(db)
            .await?;

        let mut result: Vec<CustomerRevenue> = customers
            .into_iter()
            .filter_map(|c| {
                totals.get(&c.id).map(|total| CustomerRevenue {
                    customer_id: c.id,
                    customer_name: c.name,
                    total_revenue: *total,
                })
            })
            .collect();

        result.sort_by(|a, b| {
            b.total_revenue
                .cmp(&a.total_revenue)
                .then_with(|| a.customer_name.cmp(&b.customer_name))
        });

        Ok(result)
    }
}
