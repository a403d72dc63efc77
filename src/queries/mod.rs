pub mod delivery_queries;
pub mod revenue_queries;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::errors::ServiceError;

/// Trait representing a read-only analytical query against the ledger.
#[async_trait]
pub trait Query: Send + Sync {
    type Result: Send + Sync;

    /// Executes the query using the provided database connection.
    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError>;
}

pub use delivery_queries::{MonthlyOnTimeRate, OnTimeDeliveryRateQuery};
pub use revenue_queries::{CustomerRevenue, RevenueByCustomerQuery};
