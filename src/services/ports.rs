use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::{port, route, tracking_event};

#[derive(Debug, Clone, Validate)]
pub struct CreatePortInput {
    /// UN/LOCODE-style code, e.g. "NLRTM" or "SGSIN".
    #[validate(length(min = 3, max = 10))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(length(min = 1, max = 64))]
    pub timezone: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdatePortInput {
    #[validate(length(min = 3, max = 10))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub timezone: Option<String>,
}

/// Service for managing ports.
#[derive(Clone)]
pub struct PortService {
    db: Arc<DbPool>,
}

impl PortService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_port(&self, input: CreatePortInput) -> Result<port::Model, ServiceError> {
        input.validate()?;

        let db = &*self.db;
        let code = input.code.to_uppercase();
        let existing = port::Entity::find()
            .filter(port::Column::Code.eq(code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::constraint(format!(
                "port with code {} already exists",
                code
            )));
        }

        let model = port::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            name: Set(input.name),
            country: Set(input.country),
            timezone: Set(input.timezone),
        };

        let created = model.insert(db).await?;
        info!(port_id = %created.id, code = %created.code, "port created");
        Ok(created)
    }

    /// Updates a port, re-applying the create validation to the new field
    /// values.
    #[instrument(skip(self))]
    pub async fn update_port(
        &self,
        port_id: Uuid,
        input: UpdatePortInput,
    ) -> Result<port::Model, ServiceError> {
        input.validate()?;

        let db = &*self.db;
        let model = port::Entity::find_by_id(port_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("port {} not found", port_id)))?;

        if let Some(ref code) = input.code {
            let code = code.to_uppercase();
            let taken = port::Entity::find()
                .filter(port::Column::Code.eq(code.clone()))
                .filter(port::Column::Id.ne(port_id))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(ServiceError::constraint(format!(
                    "port with code {} already exists",
                    code
                )));
            }
        }

        let mut active: port::ActiveModel = model.into();
        if let Some(code) = input.code {
            active.code = Set(code.to_uppercase());
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(country) = input.country {
            active.country = Set(country);
        }
        if let Some(timezone) = input.timezone {
            active.timezone = Set(timezone);
        }

        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_port(&self, port_id: Uuid) -> Result<Option<port::Model>, ServiceError> {
        Ok(port::Entity::find_by_id(port_id).one(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_code(&self, code: &str) -> Result<Option<port::Model>, ServiceError> {
        Ok(port::Entity::find()
            .filter(port::Column::Code.eq(code.to_uppercase()))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_ports(&self) -> Result<Vec<port::Model>, ServiceError> {
        Ok(port::Entity::find()
            .order_by_asc(port::Column::Code)
            .all(&*self.db)
            .await?)
    }

    /// Deletes a port. Refused while routes or tracking events reference
    /// it.
    #[instrument(skip(self))]
    pub async fn delete_port(&self, port_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        port::Entity::find_by_id(port_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("port {} not found", port_id)))?;

        let route_count = route::Entity::find()
            .filter(
                Condition::any()
                    .add(route::Column::OriginPortId.eq(port_id))
                    .add(route::Column::DestPortId.eq(port_id)),
            )
            .count(db)
            .await?;
        if route_count > 0 {
            return Err(ServiceError::foreign_key(format!(
                "port {} is referenced by {} route(s)",
                port_id, route_count
            )));
        }

        let event_count = tracking_event::Entity::find()
            .filter(tracking_event::Column::PortId.eq(port_id))
            .count(db)
            .await?;
        if event_count > 0 {
            return Err(ServiceError::foreign_key(format!(
                "port {} is referenced by {} tracking event(s)",
                port_id, event_count
            )));
        }

        port::Entity::delete_by_id(port_id).exec(db).await?;
        Ok(())
    }
}
