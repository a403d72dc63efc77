//! Shipping ledger data model.
//!
//! Normalized entities for a shipping/logistics business domain —
//! customers, ports, vessels, routes, containers, shipments, tracking
//! events, invoices and payments — with application-level integrity
//! checks, transactional lifecycle operations and two analytical read
//! queries (on-time delivery rate, revenue by customer).

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod config;
pub mod db;
pub mod errors;
pub mod importer;
pub mod logging;
pub mod models;
pub mod queries;
pub mod services;

use std::sync::Arc;

use db::DbPool;

/// All ledger services over one shared connection pool.
#[derive(Clone)]
pub struct Ledger {
    pub db: Arc<DbPool>,
    pub customers: services::CustomerService,
    pub ports: services::PortService,
    pub vessels: services::VesselService,
    pub routes: services::RouteService,
    pub containers: services::ContainerService,
    pub shipments: services::ShipmentService,
    pub invoicing: services::InvoicingService,
    pub payments: services::PaymentService,
    pub importer: importer::CsvImporter,
}

impl Ledger {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            customers: services::CustomerService::new(db.clone()),
            ports: services::PortService::new(db.clone()),
            vessels: services::VesselService::new(db.clone()),
            routes: services::RouteService::new(db.clone()),
            containers: services::ContainerService::new(db.clone()),
            shipments: services::ShipmentService::new(db.clone()),
            invoicing: services::InvoicingService::new(db.clone()),
            payments: services::PaymentService::new(db.clone()),
            importer: importer::CsvImporter::new(db.clone()),
            db,
        }
    }
}
