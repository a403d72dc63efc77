//! Operational entry point: connects, migrates, seeds demo data from the
//! sample CSV files and prints the two ledger reports.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::info;

use shipledger::config::load_config;
use shipledger::db::establish_connection;
use shipledger::logging::init_tracing;
use shipledger::queries::{OnTimeDeliveryRateQuery, Query, RevenueByCustomerQuery};
use shipledger::services::customers::CreateCustomerInput;
use shipledger::Ledger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(&config.log_level, config.log_json);

    info!(environment = %config.environment, "starting shipledger");

    let db = establish_connection(&config)
        .await
        .context("failed to connect to database")?;
    let ledger = Ledger::new(Arc::new(db));

    let samples_dir = Path::new(&config.samples_dir);
    if samples_dir.exists() {
        seed_demo_customers(&ledger).await?;
        let summary = ledger.importer.import_samples(samples_dir).await?;
        info!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            "sample data imported"
        );
    } else {
        info!(dir = %samples_dir.display(), "samples directory not found, skipping import");
    }

    print_reports(&ledger).await?;

    Ok(())
}

/// Creates the customers the sample shipments reference, skipping any
/// that already exist.
async fn seed_demo_customers(ledger: &Ledger) -> anyhow::Result<()> {
    let demo = [
        (
            "Meridian Foods BV",
            "ops@meridianfoods.example",
            "Westzeedijk 112, Rotterdam, NL",
        ),
        (
            "Atlas Machinery GmbH",
            "logistics@atlasmachinery.example",
            "Speicherstadt 4, Hamburg, DE",
        ),
        (
            "Pacific Retail Inc",
            "imports@pacificretail.example",
            "410 Harbor Blvd, Oakland, CA, US",
        ),
    ];

    for (name, email, address) in demo {
        if ledger.customers.get_by_email(email).await?.is_some() {
            continue;
        }
        ledger
            .customers
            .create_customer(CreateCustomerInput {
                name: name.to_string(),
                email: email.to_string(),
                phone: None,
                billing_address: address.to_string(),
            })
            .await?;
        info!(%email, "demo customer created");
    }

    Ok(())
}

async fn print_reports(ledger: &Ledger) -> anyhow::Result<()> {
    let period_start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let period_end = NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date");

    let on_time = OnTimeDeliveryRateQuery {
        period_start,
        period_end,
    }
    .execute(&ledger.db)
    .await?;

    println!("On-time delivery rate ({} .. {}):", period_start, period_end);
    if on_time.is_empty() {
        println!("  (no delivered shipments in period)");
    }
    for row in &on_time {
        println!("  {}  {:>6}%", row.month, row.on_time_pct);
    }

    let revenue = RevenueByCustomerQuery::default().execute(&ledger.db).await?;

    println!("Revenue by customer (PAID + PARTIAL invoices):");
    if revenue.is_empty() {
        println!("  (no invoices in scope)");
    }
    for row in &revenue {
        println!("  {:<30} {:>12}", row.customer_name, row.total_revenue);
    }

    Ok(())
}
