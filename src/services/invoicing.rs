use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::{customer, invoice, invoice_line, payment, shipment, InvoiceStatus};

#[derive(Debug, Clone, Validate)]
pub struct InvoiceLineInput {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl InvoiceLineInput {
    fn check_ranges(&self) -> Result<(), ServiceError> {
        if self.quantity <= 0 {
            return Err(ServiceError::constraint(format!(
                "invoice line quantity must be > 0, got {}",
                self.quantity
            )));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(ServiceError::constraint(format!(
                "invoice line unit price must be >= 0, got {}",
                self.unit_price
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CreateInvoiceInput {
    #[validate(length(min = 1, max = 50))]
    pub invoice_no: String,
    pub customer_id: Uuid,
    pub shipment_id: Option<Uuid>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: Decimal,
    pub lines: Vec<InvoiceLineInput>,
}

/// Service for managing invoices and their lines.
#[derive(Clone)]
pub struct InvoicingService {
    db: Arc<DbPool>,
}

impl InvoicingService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates an invoice in status OPEN together with its lines, in one
    /// transaction.
    #[instrument(skip(self, input), fields(invoice_no = %input.invoice_no))]
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<invoice::Model, ServiceError> {
        input.validate()?;
        if input.total_amount < Decimal::ZERO {
            return Err(ServiceError::constraint(format!(
                "invoice total amount must be >= 0, got {}",
                input.total_amount
            )));
        }
        for line in &input.lines {
            line.check_ranges()?;
        }

        let db = &*self.db;
        let existing = invoice::Entity::find()
            .filter(invoice::Column::InvoiceNo.eq(input.invoice_no.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::constraint(format!(
                "invoice {} already exists",
                input.invoice_no
            )));
        }
        if customer::Entity::find_by_id(input.customer_id)
            .one(db)
            .await?
            .is_none()
        {
            return Err(ServiceError::foreign_key(format!(
                "customer {} does not exist",
                input.customer_id
            )));
        }
        if let Some(shipment_id) = input.shipment_id {
            if shipment::Entity::find_by_id(shipment_id)
                .one(db)
                .await?
                .is_none()
            {
                return Err(ServiceError::foreign_key(format!(
                    "shipment {} does not exist",
                    shipment_id
                )));
            }
        }

        let created = db
            .transaction::<_, invoice::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let created = invoice::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        invoice_no: Set(input.invoice_no),
                        customer_id: Set(input.customer_id),
                        shipment_id: Set(input.shipment_id),
                        issue_date: Set(input.issue_date),
                        due_date: Set(input.due_date),
                        total_amount: Set(input.total_amount),
                        status: Set(InvoiceStatus::Open),
                    }
                    .insert(txn)
                    .await?;

                    for line in input.lines {
                        invoice_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            invoice_id: Set(created.id),
                            description: Set(line.description),
                            quantity: Set(line.quantity),
                            unit_price: Set(line.unit_price),
                        }
                        .insert(txn)
                        .await?;
                    }

                    Ok(created)
                })
            })
            .await?;

        info!(invoice_id = %created.id, invoice_no = %created.invoice_no, "invoice created");
        Ok(created)
    }

    /// Adds a line to an existing invoice.
    #[instrument(skip(self, line))]
    pub async fn add_line(
        &self,
        invoice_id: Uuid,
        line: InvoiceLineInput,
    ) -> Result<invoice_line::Model, ServiceError> {
        line.validate()?;
        line.check_ranges()?;

        let db = &*self.db;
        if invoice::Entity::find_by_id(invoice_id)
            .one(db)
            .await?
            .is_none()
        {
            return Err(ServiceError::foreign_key(format!(
                "invoice {} does not exist",
                invoice_id
            )));
        }

        let created = invoice_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            description: Set(line.description),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
        }
        .insert(db)
        .await?;
        Ok(created)
    }

    /// Updates an invoice line, re-applying the range checks to the new
    /// values. The line total stays derived from quantity × unit price.
    #[instrument(skip(self, line))]
    pub async fn update_line(
        &self,
        line_id: Uuid,
        line: InvoiceLineInput,
    ) -> Result<invoice_line::Model, ServiceError> {
        line.validate()?;
        line.check_ranges()?;

        let db = &*self.db;
        let model = invoice_line::Entity::find_by_id(line_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("invoice line {} not found", line_id))
            })?;

        let mut active: invoice_line::ActiveModel = model.into();
        active.description = Set(line.description);
        active.quantity = Set(line.quantity);
        active.unit_price = Set(line.unit_price);
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_lines(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<invoice_line::Model>, ServiceError> {
        self.require_invoice(invoice_id).await?;
        Ok(invoice_line::Entity::find()
            .filter(invoice_line::Column::InvoiceId.eq(invoice_id))
            .all(&*self.db)
            .await?)
    }

    /// Voids an invoice. A fully paid invoice cannot be voided.
    #[instrument(skip(self))]
    pub async fn void_invoice(&self, invoice_id: Uuid) -> Result<invoice::Model, ServiceError> {
        let model = self.require_invoice(invoice_id).await?;
        if model.status == InvoiceStatus::Paid {
            return Err(ServiceError::invalid_transition(format!(
                "cannot void paid invoice {}",
                invoice_id
            )));
        }

        let mut active: invoice::ActiveModel = model.into();
        active.status = Set(InvoiceStatus::Void);
        let updated = active.update(&*self.db).await?;
        info!(%invoice_id, "invoice voided");
        Ok(updated)
    }

    /// Deletes an invoice together with its lines and payments,
    /// all-or-nothing.
    #[instrument(skip(self))]
    pub async fn delete_invoice(&self, invoice_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                let model = invoice::Entity::find_by_id(invoice_id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::not_found(format!("invoice {} not found", invoice_id))
                    })?;

                invoice_line::Entity::delete_many()
                    .filter(invoice_line::Column::InvoiceId.eq(invoice_id))
                    .exec(txn)
                    .await?;
                payment::Entity::delete_many()
                    .filter(payment::Column::InvoiceId.eq(invoice_id))
                    .exec(txn)
                    .await?;
                invoice::Entity::delete_by_id(model.id).exec(txn).await?;

                Ok(())
            })
        })
        .await?;

        info!(%invoice_id, "invoice deleted with its lines and payments");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_invoice(
        &self,
        invoice_id: Uuid,
    ) -> Result<Option<invoice::Model>, ServiceError> {
        Ok(invoice::Entity::find_by_id(invoice_id).one(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_invoice_no(
        &self,
        invoice_no: &str,
    ) -> Result<Option<invoice::Model>, ServiceError> {
        Ok(invoice::Entity::find()
            .filter(invoice::Column::InvoiceNo.eq(invoice_no))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_invoices(
        &self,
        page: u64,
        limit: u64,
        status: Option<InvoiceStatus>,
    ) -> Result<(Vec<invoice::Model>, u64), ServiceError> {
        let mut query = invoice::Entity::find();
        if let Some(status) = status {
            query = query.filter(invoice::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_asc(invoice::Column::IssueDate)
            .paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let invoices = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((invoices, total))
    }

    async fn require_invoice(&self, invoice_id: Uuid) -> Result<invoice::Model, ServiceError> {
        invoice::Entity::find_by_id(invoice_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("invoice {} not found", invoice_id)))
    }
}
