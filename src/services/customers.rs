use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::{customer, invoice, shipment};

#[derive(Debug, Clone, Validate)]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1))]
    pub billing_address: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateCustomerInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1))]
    pub billing_address: Option<String>,
}

/// Service for managing customers.
#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a new customer. The email must be unique across all
    /// customers.
    #[instrument(skip(self))]
    pub async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;

        let db = &*self.db;
        let existing = customer::Entity::find()
            .filter(customer::Column::Email.eq(input.email.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::constraint(format!(
                "customer with email {} already exists",
                input.email
            )));
        }

        let now = Utc::now();
        let model = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            billing_address: Set(input.billing_address),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(db).await?;
        info!(customer_id = %created.id, "customer created");
        Ok(created)
    }

    /// Updates an existing customer, re-applying the create validation to
    /// the new field values.
    #[instrument(skip(self))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        input: UpdateCustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;

        let db = &*self.db;
        let model = customer::Entity::find_by_id(customer_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("customer {} not found", customer_id))
            })?;

        if let Some(ref email) = input.email {
            let taken = customer::Entity::find()
                .filter(customer::Column::Email.eq(email.clone()))
                .filter(customer::Column::Id.ne(customer_id))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(ServiceError::constraint(format!(
                    "customer with email {} already exists",
                    email
                )));
            }
        }

        let mut active: customer::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(billing_address) = input.billing_address {
            active.billing_address = Set(billing_address);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<customer::Model>, ServiceError> {
        Ok(customer::Entity::find_by_id(customer_id)
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<customer::Model>, ServiceError> {
        Ok(customer::Entity::find()
            .filter(customer::Column::Email.eq(email))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<customer::Model>, u64), ServiceError> {
        let paginator = customer::Entity::find().paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let customers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((customers, total))
    }

    /// Deletes a customer. Refused while shipments or invoices still
    /// reference it.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, customer_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let model = customer::Entity::find_by_id(customer_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("customer {} not found", customer_id))
            })?;

        let shipment_count = shipment::Entity::find()
            .filter(shipment::Column::CustomerId.eq(customer_id))
            .count(db)
            .await?;
        if shipment_count > 0 {
            return Err(ServiceError::foreign_key(format!(
                "customer {} is referenced by {} shipment(s)",
                customer_id, shipment_count
            )));
        }

        let invoice_count = invoice::Entity::find()
            .filter(invoice::Column::CustomerId.eq(customer_id))
            .count(db)
            .await?;
        if invoice_count > 0 {
            return Err(ServiceError::foreign_key(format!(
                "customer {} is referenced by {} invoice(s)",
                customer_id, invoice_count
            )));
        }

        customer::Entity::delete_by_id(model.id).exec(db).await?;
        info!(%customer_id, "customer deleted");
        Ok(())
    }
}
