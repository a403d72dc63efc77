use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::{invoice, payment, InvoiceStatus, PaymentMethod};

#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    pub invoice_id: Uuid,
    pub paid_amount: Decimal,
    pub paid_date: NaiveDate,
    pub method: PaymentMethod,
}

/// Service for recording payments against invoices.
///
/// Invoice status is derived from the accumulated payments: the sum of
/// payments reaching the invoice total makes it PAID, anything above zero
/// makes it PARTIAL.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DbPool>,
}

impl PaymentService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Records a payment and re-derives the invoice status in the same
    /// transaction.
    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        input: RecordPaymentInput,
    ) -> Result<payment::Model, ServiceError> {
        if input.paid_amount <= Decimal::ZERO {
            return Err(ServiceError::constraint(format!(
                "payment amount must be > 0, got {}",
                input.paid_amount
            )));
        }

        let db = &*self.db;
        let created = db
            .transaction::<_, payment::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let invoice = invoice::Entity::find_by_id(input.invoice_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::foreign_key(format!(
                                "invoice {} does not exist",
                                input.invoice_id
                            ))
                        })?;

                    if invoice.status == InvoiceStatus::Void {
                        return Err(ServiceError::invalid_transition(format!(
                            "cannot record payment against void invoice {}",
                            invoice.id
                        )));
                    }

                    let created = payment::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        invoice_id: Set(invoice.id),
                        paid_amount: Set(input.paid_amount),
                        paid_date: Set(input.paid_date),
                        method: Set(input.method),
                    }
                    .insert(txn)
                    .await?;

                    let payments = payment::Entity::find()
                        .filter(payment::Column::InvoiceId.eq(invoice.id))
                        .all(txn)
                        .await?;
                    let total_paid: Decimal = payments.iter().map(|p| p.paid_amount).sum();

                    let new_status = if total_paid >= invoice.total_amount {
                        InvoiceStatus::Paid
                    } else {
                        InvoiceStatus::Partial
                    };
                    if new_status != invoice.status {
                        let mut active: invoice::ActiveModel = invoice.into();
                        active.status = Set(new_status);
                        active.update(txn).await?;
                    }

                    Ok(created)
                })
            })
            .await?;

        info!(
            payment_id = %created.id,
            invoice_id = %created.invoice_id,
            amount = %created.paid_amount,
            "payment recorded"
        );
        Ok(created)
    }

    /// Returns the payments recorded against an invoice, oldest first.
    #[instrument(skip(self))]
    pub async fn list_payments(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<payment::Model>, ServiceError> {
        Ok(payment::Entity::find()
            .filter(payment::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(payment::Column::PaidDate)
            .all(&*self.db)
            .await?)
    }

    /// Sum of all payments recorded against an invoice.
    #[instrument(skip(self))]
    pub async fn total_paid(&self, invoice_id: Uuid) -> Result<Decimal, ServiceError> {
        let payments = self.list_payments(invoice_id).await?;
        Ok(payments.iter().map(|p| p.paid_amount).sum())
    }
}
