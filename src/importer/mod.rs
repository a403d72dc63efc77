//! Bulk CSV import for seed data: ports, routes and shipments.
//!
//! Imports are idempotent: a row whose unique key already exists is
//! counted as skipped, so re-running the importer against the same files
//! is safe.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::{customer, port, route, shipment, ShipmentStatus};

/// Outcome of one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct PortRecord {
    code: String,
    name: String,
    country: String,
    timezone: String,
}

#[derive(Debug, Deserialize)]
struct RouteRecord {
    origin_code: String,
    dest_code: String,
    planned_departure: NaiveDate,
    planned_arrival: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct ShipmentRecord {
    booking_no: String,
    customer_email: String,
    origin_code: String,
    dest_code: String,
    status: String,
    created_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
}

/// CSV importer for the seed interface.
#[derive(Clone)]
pub struct CsvImporter {
    db: Arc<DbPool>,
}

impl CsvImporter {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Imports ports from `code,name,country,timezone` rows.
    #[instrument(skip(self, reader))]
    pub async fn import_ports<R: Read>(&self, reader: R) -> Result<ImportSummary, ServiceError> {
        let db = &*self.db;
        let mut summary = ImportSummary::default();

        for record in csv::Reader::from_reader(reader).deserialize::<PortRecord>() {
            let record = record.map_err(|e| {
                ServiceError::ValidationError(format!("malformed port row: {}", e))
            })?;
            let code = record.code.to_uppercase();

            let exists = port::Entity::find()
                .filter(port::Column::Code.eq(code.clone()))
                .one(db)
                .await?;
            if exists.is_some() {
                summary.skipped += 1;
                continue;
            }

            port::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(code),
                name: Set(record.name),
                country: Set(record.country),
                timezone: Set(record.timezone),
            }
            .insert(db)
            .await?;
            summary.inserted += 1;
        }

        info!(inserted = summary.inserted, skipped = summary.skipped, "ports imported");
        Ok(summary)
    }

    /// Imports routes from
    /// `origin_code,dest_code,planned_departure,planned_arrival` rows.
    /// Port codes must already exist.
    #[instrument(skip(self, reader))]
    pub async fn import_routes<R: Read>(&self, reader: R) -> Result<ImportSummary, ServiceError> {
        let db = &*self.db;
        let mut summary = ImportSummary::default();

        for record in csv::Reader::from_reader(reader).deserialize::<RouteRecord>() {
            let record = record.map_err(|e| {
                ServiceError::ValidationError(format!("malformed route row: {}", e))
            })?;

            let origin = self.require_port(&record.origin_code).await?;
            let dest = self.require_port(&record.dest_code).await?;
            if origin.id == dest.id {
                return Err(ServiceError::constraint(format!(
                    "route {} -> {} has identical origin and destination",
                    record.origin_code, record.dest_code
                )));
            }

            let exists = route::Entity::find()
                .filter(route::Column::OriginPortId.eq(origin.id))
                .filter(route::Column::DestPortId.eq(dest.id))
                .filter(route::Column::PlannedDepartureDate.eq(record.planned_departure))
                .one(db)
                .await?;
            if exists.is_some() {
                summary.skipped += 1;
                continue;
            }

            route::ActiveModel {
                id: Set(Uuid::new_v4()),
                origin_port_id: Set(origin.id),
                dest_port_id: Set(dest.id),
                planned_departure_date: Set(record.planned_departure),
                planned_arrival_date: Set(record.planned_arrival),
            }
            .insert(db)
            .await?;
            summary.inserted += 1;
        }

        info!(inserted = summary.inserted, skipped = summary.skipped, "routes imported");
        Ok(summary)
    }

    /// Imports shipments from
    /// `booking_no,customer_email,origin_code,dest_code,status,created_at,delivered_at`
    /// rows. Customers are resolved by email, routes by their port-code
    /// pair.
    #[instrument(skip(self, reader))]
    pub async fn import_shipments<R: Read>(&self, reader: R) -> Result<ImportSummary, ServiceError> {
        let db = &*self.db;
        let mut summary = ImportSummary::default();

        for record in csv::Reader::from_reader(reader).deserialize::<ShipmentRecord>() {
            let record = record.map_err(|e| {
                ServiceError::ValidationError(format!("malformed shipment row: {}", e))
            })?;

            let exists = shipment::Entity::find()
                .filter(shipment::Column::BookingNo.eq(record.booking_no.clone()))
                .one(db)
                .await?;
            if exists.is_some() {
                summary.skipped += 1;
                continue;
            }

            let status = ShipmentStatus::from_str(&record.status).map_err(|_| {
                ServiceError::constraint(format!(
                    "unknown shipment status {:?} for booking {}",
                    record.status, record.booking_no
                ))
            })?;

            let customer = customer::Entity::find()
                .filter(customer::Column::Email.eq(record.customer_email.clone()))
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::foreign_key(format!(
                        "no customer with email {} for booking {}",
                        record.customer_email, record.booking_no
                    ))
                })?;

            let origin = self.require_port(&record.origin_code).await?;
            let dest = self.require_port(&record.dest_code).await?;
            let route = route::Entity::find()
                .filter(route::Column::OriginPortId.eq(origin.id))
                .filter(route::Column::DestPortId.eq(dest.id))
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::foreign_key(format!(
                        "no route {} -> {} for booking {}",
                        record.origin_code, record.dest_code, record.booking_no
                    ))
                })?;

            if status == ShipmentStatus::Delivered && record.delivered_at.is_none() {
                warn!(booking_no = %record.booking_no, "delivered shipment without delivered_at");
            }

            shipment::ActiveModel {
                id: Set(Uuid::new_v4()),
                booking_no: Set(record.booking_no),
                customer_id: Set(customer.id),
                route_id: Set(route.id),
                vessel_id: Set(None),
                status: Set(status),
                created_at: Set(record.created_at),
                delivered_at: Set(record.delivered_at),
            }
            .insert(db)
            .await?;
            summary.inserted += 1;
        }

        info!(inserted = summary.inserted, skipped = summary.skipped, "shipments imported");
        Ok(summary)
    }

    /// Imports `ports.csv`, `routes.csv` and `shipments.csv` from a
    /// directory, in dependency order.
    #[instrument(skip(self))]
    pub async fn import_samples(&self, dir: &Path) -> Result<ImportSummary, ServiceError> {
        let mut total = ImportSummary::default();
        for (file, kind) in [
            ("ports.csv", SampleKind::Ports),
            ("routes.csv", SampleKind::Routes),
            ("shipments.csv", SampleKind::Shipments),
        ] {
            let path = dir.join(file);
            let reader = std::fs::File::open(&path).map_err(|e| {
                ServiceError::ValidationError(format!("cannot open {}: {}", path.display(), e))
            })?;
            let summary = match kind {
                SampleKind::Ports => self.import_ports(reader).await?,
                SampleKind::Routes => self.import_routes(reader).await?,
                SampleKind::Shipments => self.import_shipments(reader).await?,
            };
            total.inserted += summary.inserted;
            total.skipped += summary.skipped;
        }
        Ok(total)
    }

    async fn require_port(&self, code: &str) -> Result<port::Model, ServiceError> {
        port::Entity::find()
            .filter(port::Column::Code.eq(code.to_uppercase()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::foreign_key(format!("no port with code {}", code)))
    }
}

enum SampleKind {
    Ports,
    Routes,
    Shipments,
}
