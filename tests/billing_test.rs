mod common;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use uuid::Uuid;

use common::create_customer;
use shipledger::errors::ServiceError;
use shipledger::models::{invoice_line, payment, InvoiceStatus, PaymentMethod};
use shipledger::services::invoicing::{CreateInvoiceInput, InvoiceLineInput};
use shipledger::services::payments::RecordPaymentInput;

fn invoice_input(invoice_no: &str, customer_id: Uuid) -> CreateInvoiceInput {
    CreateInvoiceInput {
        invoice_no: invoice_no.to_string(),
        customer_id,
        shipment_id: None,
        issue_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        total_amount: dec!(100.00),
        lines: vec![InvoiceLineInput {
            description: "Ocean freight".to_string(),
            quantity: 1,
            unit_price: dec!(100.00),
        }],
    }
}

fn pay(invoice_id: Uuid, amount: rust_decimal::Decimal) -> RecordPaymentInput {
    RecordPaymentInput {
        invoice_id,
        paid_amount: amount,
        paid_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        method: PaymentMethod::BankTransfer,
    }
}

#[tokio::test]
async fn invoice_is_created_open_with_its_lines() {
    let ledger = common::test_ledger().await;
    let customer = create_customer(&ledger, "Billed Co", "billed@example.com").await;

    let invoice = ledger
        .invoicing
        .create_invoice(invoice_input("INV-001", customer.id))
        .await
        .unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Open);

    let lines = ledger.invoicing.list_lines(invoice.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].line_total(), dec!(100.00));
}

#[tokio::test]
async fn invoice_field_constraints_are_enforced() {
    let ledger = common::test_ledger().await;
    let customer = create_customer(&ledger, "Strict Co", "strict@example.com").await;

    // duplicate invoice number
    ledger
        .invoicing
        .create_invoice(invoice_input("INV-010", customer.id))
        .await
        .unwrap();
    let err = ledger
        .invoicing
        .create_invoice(invoice_input("INV-010", customer.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    // negative total
    let mut input = invoice_input("INV-011", customer.id);
    input.total_amount = dec!(-1.00);
    let err = ledger.invoicing.create_invoice(input).await.unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    // zero quantity line
    let mut input = invoice_input("INV-012", customer.id);
    input.lines[0].quantity = 0;
    let err = ledger.invoicing.create_invoice(input).await.unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    // negative unit price line
    let mut input = invoice_input("INV-013", customer.id);
    input.lines[0].unit_price = dec!(-0.01);
    let err = ledger.invoicing.create_invoice(input).await.unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    // unknown customer
    let err = ledger
        .invoicing
        .create_invoice(invoice_input("INV-014", Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ForeignKeyViolation(_)));
}

#[tokio::test]
async fn line_total_stays_derived_after_updates() {
    let ledger = common::test_ledger().await;
    let customer = create_customer(&ledger, "Derived Co", "derived@example.com").await;
    let invoice = ledger
        .invoicing
        .create_invoice(invoice_input("INV-020", customer.id))
        .await
        .unwrap();

    let line = ledger
        .invoicing
        .add_line(
            invoice.id,
            InvoiceLineInput {
                description: "Customs handling".to_string(),
                quantity: 3,
                unit_price: dec!(45.50),
            },
        )
        .await
        .unwrap();
    assert_eq!(line.line_total(), dec!(136.50));

    let updated = ledger
        .invoicing
        .update_line(
            line.id,
            InvoiceLineInput {
                description: "Customs handling".to_string(),
                quantity: 5,
                unit_price: dec!(40.00),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.line_total(), dec!(200.00));

    let err = ledger
        .invoicing
        .update_line(
            line.id,
            InvoiceLineInput {
                description: "Customs handling".to_string(),
                quantity: -2,
                unit_price: dec!(40.00),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));
}

#[tokio::test]
async fn negative_or_zero_payments_are_rejected() {
    let ledger = common::test_ledger().await;
    let customer = create_customer(&ledger, "Payer Co", "payer@example.com").await;
    let invoice = ledger
        .invoicing
        .create_invoice(invoice_input("INV-030", customer.id))
        .await
        .unwrap();

    let err = ledger
        .payments
        .record_payment(pay(invoice.id, dec!(-5.00)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));

    let err = ledger
        .payments
        .record_payment(pay(invoice.id, dec!(0.00)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));
}

#[tokio::test]
async fn invoice_status_is_derived_from_accumulated_payments() {
    let ledger = common::test_ledger().await;
    let customer = create_customer(&ledger, "Gradual Co", "gradual@example.com").await;
    let invoice = ledger
        .invoicing
        .create_invoice(invoice_input("INV-040", customer.id))
        .await
        .unwrap();

    ledger
        .payments
        .record_payment(pay(invoice.id, dec!(40.00)))
        .await
        .unwrap();
    let current = ledger.invoicing.get_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(current.status, InvoiceStatus::Partial);

    ledger
        .payments
        .record_payment(pay(invoice.id, dec!(60.00)))
        .await
        .unwrap();
    let current = ledger.invoicing.get_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(current.status, InvoiceStatus::Paid);
    assert_eq!(ledger.payments.total_paid(invoice.id).await.unwrap(), dec!(100.00));

    // overpayment keeps the invoice paid
    ledger
        .payments
        .record_payment(pay(invoice.id, dec!(10.00)))
        .await
        .unwrap();
    let current = ledger.invoicing.get_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(current.status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn void_invoices_reject_payments_and_paid_invoices_reject_voiding() {
    let ledger = common::test_ledger().await;
    let customer = create_customer(&ledger, "Void Co", "void@example.com").await;

    let voided = ledger
        .invoicing
        .create_invoice(invoice_input("INV-050", customer.id))
        .await
        .unwrap();
    ledger.invoicing.void_invoice(voided.id).await.unwrap();
    let err = ledger
        .payments
        .record_payment(pay(voided.id, dec!(10.00)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));

    let paid = ledger
        .invoicing
        .create_invoice(invoice_input("INV-051", customer.id))
        .await
        .unwrap();
    ledger
        .payments
        .record_payment(pay(paid.id, dec!(100.00)))
        .await
        .unwrap();
    let err = ledger.invoicing.void_invoice(paid.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)));
}

#[tokio::test]
async fn payment_against_missing_invoice_is_a_foreign_key_violation() {
    let ledger = common::test_ledger().await;
    let err = ledger
        .payments
        .record_payment(pay(Uuid::new_v4(), dec!(10.00)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ForeignKeyViolation(_)));
}

#[tokio::test]
async fn money_columns_migrate_and_round_trip_on_sqlite() {
    // test_ledger applies the full migration set against sqlite, so the
    // decimal column definitions themselves are exercised here
    let ledger = common::test_ledger().await;
    let customer = create_customer(&ledger, "Precise Co", "precise@example.com").await;

    let mut input = invoice_input("INV-070", customer.id);
    input.total_amount = dec!(999999999999.9999);
    input.lines[0].quantity = 3;
    input.lines[0].unit_price = dec!(333333333333.3333);
    let invoice = ledger.invoicing.create_invoice(input).await.unwrap();
    assert_eq!(invoice.total_amount, dec!(999999999999.9999));

    let lines = ledger.invoicing.list_lines(invoice.id).await.unwrap();
    assert_eq!(lines[0].unit_price, dec!(333333333333.3333));
    assert_eq!(lines[0].line_total(), dec!(999999999999.9999));

    ledger
        .payments
        .record_payment(pay(invoice.id, dec!(0.0001)))
        .await
        .unwrap();
    assert_eq!(
        ledger.payments.total_paid(invoice.id).await.unwrap(),
        dec!(0.0001)
    );
}

#[tokio::test]
async fn deleting_an_invoice_cascades_lines_and_payments() {
    let ledger = common::test_ledger().await;
    let customer = create_customer(&ledger, "Cascade Co", "cascade@example.com").await;
    let invoice = ledger
        .invoicing
        .create_invoice(invoice_input("INV-060", customer.id))
        .await
        .unwrap();
    ledger
        .payments
        .record_payment(pay(invoice.id, dec!(25.00)))
        .await
        .unwrap();

    ledger.invoicing.delete_invoice(invoice.id).await.unwrap();

    assert!(ledger
        .invoicing
        .get_invoice(invoice.id)
        .await
        .unwrap()
        .is_none());
    assert!(invoice_line::Entity::find()
        .all(&*ledger.db)
        .await
        .unwrap()
        .is_empty());
    assert!(payment::Entity::find()
        .all(&*ledger.db)
        .await
        .unwrap()
        .is_empty());
}
