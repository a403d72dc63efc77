mod common;

use common::create_customer;
use shipledger::errors::ServiceError;
use shipledger::models::ShipmentStatus;

const PORTS_CSV: &str = "\
code,name,country,timezone
CNSHA,Shanghai,China,Asia/Shanghai
nlrtm,Rotterdam,Netherlands,Europe/Amsterdam
";

const ROUTES_CSV: &str = "\
origin_code,dest_code,planned_departure,planned_arrival
CNSHA,NLRTM,2024-02-01,2024-03-10
";

const SHIPMENTS_CSV: &str = "\
booking_no,customer_email,origin_code,dest_code,status,created_at,delivered_at
BK-IMP-1,shipper@example.com,CNSHA,NLRTM,BOOKED,2024-01-15T09:00:00Z,
BK-IMP-2,shipper@example.com,CNSHA,NLRTM,DELIVERED,2024-01-10T09:00:00Z,2024-03-08T16:00:00Z
";

#[tokio::test]
async fn importing_twice_skips_existing_rows() {
    let ledger = common::test_ledger().await;

    let first = ledger.importer.import_ports(PORTS_CSV.as_bytes()).await.unwrap();
    assert_eq!(first.inserted, 2);
    assert_eq!(first.skipped, 0);

    // port codes are normalised to upper case, so the lower-case row is a dupe
    let again = ledger.importer.import_ports(PORTS_CSV.as_bytes()).await.unwrap();
    assert_eq!(again.inserted, 0);
    assert_eq!(again.skipped, 2);

    let routes = ledger.importer.import_routes(ROUTES_CSV.as_bytes()).await.unwrap();
    assert_eq!(routes.inserted, 1);
    let routes = ledger.importer.import_routes(ROUTES_CSV.as_bytes()).await.unwrap();
    assert_eq!(routes.skipped, 1);
}

#[tokio::test]
async fn shipments_resolve_customers_by_email_and_routes_by_port_pair() {
    let ledger = common::test_ledger().await;
    create_customer(&ledger, "Shipper", "shipper@example.com").await;
    ledger.importer.import_ports(PORTS_CSV.as_bytes()).await.unwrap();
    ledger.importer.import_routes(ROUTES_CSV.as_bytes()).await.unwrap();

    let summary = ledger
        .importer
        .import_shipments(SHIPMENTS_CSV.as_bytes())
        .await
        .unwrap();
    assert_eq!(summary.inserted, 2);

    let delivered = ledger
        .shipments
        .get_by_booking_no("BK-IMP-2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(delivered.status, ShipmentStatus::Delivered);
    assert!(delivered.delivered_at.is_some());

    let rerun = ledger
        .importer
        .import_shipments(SHIPMENTS_CSV.as_bytes())
        .await
        .unwrap();
    assert_eq!(rerun.inserted, 0);
    assert_eq!(rerun.skipped, 2);
}

#[tokio::test]
async fn route_rows_with_unknown_port_codes_are_rejected() {
    let ledger = common::test_ledger().await;
    ledger.importer.import_ports(PORTS_CSV.as_bytes()).await.unwrap();

    let csv = "\
origin_code,dest_code,planned_departure,planned_arrival
CNSHA,XXXXX,2024-02-01,2024-03-10
";
    let err = ledger.importer.import_routes(csv.as_bytes()).await.unwrap_err();
    assert!(matches!(err, ServiceError::ForeignKeyViolation(_)));
}

#[tokio::test]
async fn shipment_rows_with_bad_references_or_status_are_rejected() {
    let ledger = common::test_ledger().await;
    create_customer(&ledger, "Shipper", "shipper@example.com").await;
    ledger.importer.import_ports(PORTS_CSV.as_bytes()).await.unwrap();
    ledger.importer.import_routes(ROUTES_CSV.as_bytes()).await.unwrap();

    let bad_status = "\
booking_no,customer_email,origin_code,dest_code,status,created_at,delivered_at
BK-BAD-1,shipper@example.com,CNSHA,NLRTM,TELEPORTED,2024-01-15T09:00:00Z,
";
    let err = ledger
        .importer
        .import_shipments(bad_status.as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    let unknown_customer = "\
booking_no,customer_email,origin_code,dest_code,status,created_at,delivered_at
BK-BAD-2,nobody@example.com,CNSHA,NLRTM,BOOKED,2024-01-15T09:00:00Z,
";
    let err = ledger
        .importer
        .import_shipments(unknown_customer.as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ForeignKeyViolation(_)));

    let no_route = "\
booking_no,customer_email,origin_code,dest_code,status,created_at,delivered_at
BK-BAD-3,shipper@example.com,NLRTM,CNSHA,BOOKED,2024-01-15T09:00:00Z,
";
    let err = ledger
        .importer
        .import_shipments(no_route.as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ForeignKeyViolation(_)));
}

#[tokio::test]
async fn malformed_rows_surface_as_validation_errors() {
    let ledger = common::test_ledger().await;

    let csv = "\
code,name,country
ONLY,Three Columns,Testland
";
    let err = ledger.importer.import_ports(csv.as_bytes()).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn sample_directory_import_runs_in_dependency_order() {
    let ledger = common::test_ledger().await;
    create_customer(&ledger, "Shipper", "shipper@example.com").await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ports.csv"), PORTS_CSV).unwrap();
    std::fs::write(dir.path().join("routes.csv"), ROUTES_CSV).unwrap();
    std::fs::write(dir.path().join("shipments.csv"), SHIPMENTS_CSV).unwrap();

    let summary = ledger.importer.import_samples(dir.path()).await.unwrap();
    assert_eq!(summary.inserted, 5);
    assert_eq!(summary.skipped, 0);
}
