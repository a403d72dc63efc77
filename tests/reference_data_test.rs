mod common;

use chrono::NaiveDate;
use uuid::Uuid;

use common::{create_customer, create_port, create_route, create_shipment};
use shipledger::errors::ServiceError;
use shipledger::models::ContainerSize;
use shipledger::services::containers::{CreateContainerInput, UpdateContainerInput};
use shipledger::services::customers::{CreateCustomerInput, UpdateCustomerInput};
use shipledger::services::ports::UpdatePortInput;
use shipledger::services::routes::CreateRouteInput;
use shipledger::services::vessels::{CreateVesselInput, UpdateVesselInput};

#[tokio::test]
async fn container_sizes_outside_the_standard_set_are_rejected() {
    let ledger = common::test_ledger().await;

    let err = ledger
        .containers
        .create_container(CreateContainerInput {
            container_no: "BAD0000001".to_string(),
            size_feet: 30,
            type_code: "DRY".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    for (i, size) in [20, 40, 45].into_iter().enumerate() {
        let created = ledger
            .containers
            .create_container(CreateContainerInput {
                container_no: format!("OK0000000{}", i),
                size_feet: size,
                type_code: "DRY".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(created.size_feet.feet(), size);
    }
}

#[tokio::test]
async fn duplicate_container_number_is_rejected() {
    let ledger = common::test_ledger().await;
    ledger
        .containers
        .create_container(CreateContainerInput {
            container_no: "MSCU1234567".to_string(),
            size_feet: 40,
            type_code: "REEF".to_string(),
        })
        .await
        .unwrap();

    let err = ledger
        .containers
        .create_container(CreateContainerInput {
            container_no: "MSCU1234567".to_string(),
            size_feet: 20,
            type_code: "DRY".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));
}

#[tokio::test]
async fn route_with_identical_origin_and_destination_is_rejected() {
    let ledger = common::test_ledger().await;
    let port = create_port(&ledger, "ONL").await;

    let err = ledger
        .routes
        .create_route(CreateRouteInput {
            origin_port_id: port.id,
            dest_port_id: port.id,
            planned_departure_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            planned_arrival_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));
}

#[tokio::test]
async fn route_ports_must_exist() {
    let ledger = common::test_ledger().await;
    let port = create_port(&ledger, "EXS").await;

    let err = ledger
        .routes
        .create_route(CreateRouteInput {
            origin_port_id: port.id,
            dest_port_id: Uuid::new_v4(),
            planned_departure_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            planned_arrival_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ForeignKeyViolation(_)));
}

#[tokio::test]
async fn vessel_capacity_must_be_non_negative_and_imo_unique() {
    let ledger = common::test_ledger().await;

    let err = ledger
        .vessels
        .create_vessel(CreateVesselInput {
            name: "MV Testwave".to_string(),
            imo_number: "9876543".to_string(),
            capacity_teu: -10,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    ledger
        .vessels
        .create_vessel(CreateVesselInput {
            name: "MV Testwave".to_string(),
            imo_number: "9876543".to_string(),
            capacity_teu: 0,
        })
        .await
        .unwrap();

    let err = ledger
        .vessels
        .create_vessel(CreateVesselInput {
            name: "MV Other".to_string(),
            imo_number: "9876543".to_string(),
            capacity_teu: 14000,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));
}

#[tokio::test]
async fn port_lookup_is_case_insensitive_on_code() {
    let ledger = common::test_ledger().await;
    create_port(&ledger, "nlrtm").await;

    let found = ledger.ports.get_by_code("NLRTM").await.unwrap();
    assert!(found.is_some());
    assert_eq!(found.unwrap().code, "NLRTM");
}

#[tokio::test]
async fn referenced_reference_data_cannot_be_deleted() {
    let ledger = common::test_ledger().await;
    let customer = create_customer(&ledger, "Blocked Corp", "blocked@example.com").await;
    let origin = create_port(&ledger, "DLA").await;
    let dest = create_port(&ledger, "DLB").await;
    let route = create_route(
        &ledger,
        origin.id,
        dest.id,
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    )
    .await;
    create_shipment(&ledger, "BK-DEL", customer.id, route.id).await;

    let err = ledger.ports.delete_port(origin.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::ForeignKeyViolation(_)));

    let err = ledger.routes.delete_route(route.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::ForeignKeyViolation(_)));

    let err = ledger.customers.delete_customer(customer.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::ForeignKeyViolation(_)));
}

#[tokio::test]
async fn customer_email_is_unique_and_updatable() {
    let ledger = common::test_ledger().await;
    let first = create_customer(&ledger, "First", "first@example.com").await;
    create_customer(&ledger, "Second", "second@example.com").await;

    let err = ledger
        .customers
        .create_customer(CreateCustomerInput {
            name: "Impostor".to_string(),
            email: "first@example.com".to_string(),
            phone: None,
            billing_address: "2 Dock Road".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    let err = ledger
        .customers
        .update_customer(
            first.id,
            UpdateCustomerInput {
                email: Some("second@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    let updated = ledger
        .customers
        .update_customer(
            first.id,
            UpdateCustomerInput {
                name: Some("First Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "First Renamed");
    assert_eq!(updated.email, "first@example.com");
}

#[tokio::test]
async fn reference_data_updates_reapply_the_create_validation() {
    let ledger = common::test_ledger().await;
    let port = create_port(&ledger, "UPA").await;
    create_port(&ledger, "UPB").await;

    let err = ledger
        .ports
        .update_port(
            port.id,
            UpdatePortInput {
                code: Some("upb".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    let renamed = ledger
        .ports
        .update_port(
            port.id,
            UpdatePortInput {
                name: Some("Port Upalia".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Port Upalia");

    let container = ledger
        .containers
        .create_container(CreateContainerInput {
            container_no: "UPDC000001".to_string(),
            size_feet: 20,
            type_code: "DRY".to_string(),
        })
        .await
        .unwrap();
    let err = ledger
        .containers
        .update_container(
            container.id,
            UpdateContainerInput {
                size_feet: Some(30),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    let err = ledger
        .vessels
        .update_vessel(
            Uuid::new_v4(),
            UpdateVesselInput {
                capacity_teu: Some(1000),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn updating_a_missing_customer_is_not_found() {
    let ledger = common::test_ledger().await;
    let err = ledger
        .customers
        .update_customer(
            Uuid::new_v4(),
            UpdateCustomerInput {
                name: Some("Ghost".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn container_size_enum_maps_footage() {
    assert_eq!(ContainerSize::from_feet(45), Some(ContainerSize::Teu45));
    assert_eq!(ContainerSize::from_feet(30), None);
}
