//! Shared test harness: an in-memory SQLite database with the full
//! schema applied, plus fixture helpers for the common entity chains.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{ConnectOptions, Database};
use uuid::Uuid;

use shipledger::db;
use shipledger::models::{customer, port, route, shipment};
use shipledger::services::customers::CreateCustomerInput;
use shipledger::services::ports::CreatePortInput;
use shipledger::services::routes::CreateRouteInput;
use shipledger::services::shipments::CreateShipmentInput;
use shipledger::Ledger;

/// Constructs a ledger backed by a fresh in-memory SQLite database.
///
/// A single pooled connection keeps the in-memory database alive and
/// shared for the whole test.
pub async fn test_ledger() -> Ledger {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let pool = Database::connect(opt)
        .await
        .expect("connect to in-memory sqlite");
    db::run_migrations(&pool).await.expect("apply migrations");

    Ledger::new(Arc::new(pool))
}

pub async fn create_customer(ledger: &Ledger, name: &str, email: &str) -> customer::Model {
    ledger
        .customers
        .create_customer(CreateCustomerInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            billing_address: "1 Quay Street".to_string(),
        })
        .await
        .expect("create customer")
}

pub async fn create_port(ledger: &Ledger, code: &str) -> port::Model {
    ledger
        .ports
        .create_port(CreatePortInput {
            code: code.to_string(),
            name: format!("Port {}", code),
            country: "Testland".to_string(),
            timezone: "UTC".to_string(),
        })
        .await
        .expect("create port")
}

pub async fn create_route(
    ledger: &Ledger,
    origin: Uuid,
    dest: Uuid,
    departure: NaiveDate,
    arrival: NaiveDate,
) -> route::Model {
    ledger
        .routes
        .create_route(CreateRouteInput {
            origin_port_id: origin,
            dest_port_id: dest,
            planned_departure_date: departure,
            planned_arrival_date: arrival,
        })
        .await
        .expect("create route")
}

pub async fn create_shipment(
    ledger: &Ledger,
    booking_no: &str,
    customer_id: Uuid,
    route_id: Uuid,
) -> shipment::Model {
    ledger
        .shipments
        .create_shipment(CreateShipmentInput {
            booking_no: booking_no.to_string(),
            customer_id,
            route_id,
            vessel_id: None,
        })
        .await
        .expect("create shipment")
}

/// Everything a shipment test needs: customer, two ports, a route and a
/// freshly booked shipment.
pub struct ShipmentFixture {
    pub customer: customer::Model,
    pub origin: port::Model,
    pub dest: port::Model,
    pub route: route::Model,
    pub shipment: shipment::Model,
}

pub async fn booked_shipment(ledger: &Ledger, booking_no: &str) -> ShipmentFixture {
    let suffix = &booking_no[booking_no.len().saturating_sub(2)..];
    let customer = create_customer(
        ledger,
        "Test Shipper",
        &format!("shipper+{}@example.com", booking_no.to_lowercase()),
    )
    .await;
    let origin = create_port(ledger, &format!("AA{}", suffix)).await;
    let dest = create_port(ledger, &format!("BB{}", suffix)).await;
    let route = create_route(
        ledger,
        origin.id,
        dest.id,
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
    )
    .await;
    let shipment = create_shipment(ledger, booking_no, customer.id, route.id).await;

    ShipmentFixture {
        customer,
        origin,
        dest,
        route,
        shipment,
    }
}
