use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Query;
use crate::errors::ServiceError;
use crate::models::{route, shipment, ShipmentStatus};

/// One result row of [`OnTimeDeliveryRateQuery`]: the month (of the
/// planned arrival date, formatted `YYYY-MM`) and the percentage of
/// delivered shipments that arrived on or before plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyOnTimeRate {
    pub month: String,
    pub on_time_pct: Decimal,
}

/// On-time delivery rate per month.
///
/// Considers DELIVERED shipments whose route has a planned arrival date
/// within the period (inclusive). A shipment counts as on-time when its
/// delivery date is on or before the planned arrival date. Months without
/// any delivered shipment are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnTimeDeliveryRateQuery {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

#[async_trait]
impl Query for OnTimeDeliveryRateQuery {
    type Result = Vec<MonthlyOnTimeRate>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let rows = shipment::Entity::find()
            .filter(shipment::Column::Status.eq(ShipmentStatus::Delivered))
            .find_also_related(route::Entity)
            .filter(route::Column::PlannedArrivalDate.between(self.period_start, self.period_end))
            .all(db)
            .await?;

        // (on_time, total) per (year, month) of the planned arrival date.
        let mut buckets: BTreeMap<(i32, u32), (u64, u64)> = BTreeMap::new();
        for (shipment, route) in rows {
            let (Some(route), Some(delivered_at)) = (route, shipment.delivered_at) else {
                continue;
            };
            let planned = route.planned_arrival_date;
            let entry = buckets.entry((planned.year(), planned.month())).or_default();
            if delivered_at.date_naive() <= planned {
                entry.0 += 1;
            }
            entry.1 += 1;
        }

        let result = buckets
            .into_iter()
            .map(|((year, month), (on_time, total))| MonthlyOnTimeRate {
                month: format!("{:04}-{:02}", year, month),
                on_time_pct: (Decimal::from(on_time) * Decimal::from(100) / Decimal::from(total))
                    .round_dp(2),
            })
            .collect();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    #[test]
    fn percentage_rounds_to_two_decimals() {
        // 2 of 3 on time
        let pct = (Decimal::from(2u64) * Decimal::from(100) / Decimal::from(3u64)).round_dp(2);
        assert_eq!(pct.to_string(), "66.67");
    }

    #[test]
    fn full_and_zero_rates_are_exact() {
        let full = (Decimal::from(4u64) * Decimal::from(100) / Decimal::from(4u64)).round_dp(2);
        assert_eq!(full, Decimal::from(100));
        let none = (Decimal::from(0u64) * Decimal::from(100) / Decimal::from(5u64)).round_dp(2);
        assert_eq!(none, Decimal::ZERO);
    }
}
