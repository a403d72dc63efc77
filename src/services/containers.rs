use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::{container, shipment_container, ContainerSize};

#[derive(Debug, Clone, Validate)]
pub struct CreateContainerInput {
    #[validate(length(min = 1, max = 20))]
    pub container_no: String,
    /// Raw footage; must be one of 20, 40 or 45.
    pub size_feet: i32,
    #[validate(length(min = 1, max = 10))]
    pub type_code: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateContainerInput {
    #[validate(length(min = 1, max = 20))]
    pub container_no: Option<String>,
    pub size_feet: Option<i32>,
    #[validate(length(min = 1, max = 10))]
    pub type_code: Option<String>,
}

/// Service for managing containers.
#[derive(Clone)]
pub struct ContainerService {
    db: Arc<DbPool>,
}

impl ContainerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a container. The size must come from the closed set
    /// {20, 40, 45} and the container number must be unique.
    #[instrument(skip(self))]
    pub async fn create_container(
        &self,
        input: CreateContainerInput,
    ) -> Result<container::Model, ServiceError> {
        input.validate()?;

        let size = ContainerSize::from_feet(input.size_feet).ok_or_else(|| {
            ServiceError::constraint(format!(
                "container size must be one of 20, 40 or 45 feet, got {}",
                input.size_feet
            ))
        })?;

        let db = &*self.db;
        let existing = container::Entity::find()
            .filter(container::Column::ContainerNo.eq(input.container_no.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::constraint(format!(
                "container {} already exists",
                input.container_no
            )));
        }

        let model = container::ActiveModel {
            id: Set(Uuid::new_v4()),
            container_no: Set(input.container_no),
            size_feet: Set(size),
            type_code: Set(input.type_code),
        };

        let created = model.insert(db).await?;
        info!(container_id = %created.id, container_no = %created.container_no, "container created");
        Ok(created)
    }

    /// Updates a container, re-applying the create validation to the new
    /// field values.
    #[instrument(skip(self))]
    pub async fn update_container(
        &self,
        container_id: Uuid,
        input: UpdateContainerInput,
    ) -> Result<container::Model, ServiceError> {
        input.validate()?;

        let size = match input.size_feet {
            Some(feet) => Some(ContainerSize::from_feet(feet).ok_or_else(|| {
                ServiceError::constraint(format!(
                    "container size must be one of 20, 40 or 45 feet, got {}",
                    feet
                ))
            })?),
            None => None,
        };

        let db = &*self.db;
        let model = container::Entity::find_by_id(container_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("container {} not found", container_id))
            })?;

        if let Some(ref container_no) = input.container_no {
            let taken = container::Entity::find()
                .filter(container::Column::ContainerNo.eq(container_no.clone()))
                .filter(container::Column::Id.ne(container_id))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(ServiceError::constraint(format!(
                    "container {} already exists",
                    container_no
                )));
            }
        }

        let mut active: container::ActiveModel = model.into();
        if let Some(container_no) = input.container_no {
            active.container_no = Set(container_no);
        }
        if let Some(size) = size {
            active.size_feet = Set(size);
        }
        if let Some(type_code) = input.type_code {
            active.type_code = Set(type_code);
        }

        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_container(
        &self,
        container_id: Uuid,
    ) -> Result<Option<container::Model>, ServiceError> {
        Ok(container::Entity::find_by_id(container_id)
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_number(
        &self,
        container_no: &str,
    ) -> Result<Option<container::Model>, ServiceError> {
        Ok(container::Entity::find()
            .filter(container::Column::ContainerNo.eq(container_no))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_containers(&self) -> Result<Vec<container::Model>, ServiceError> {
        Ok(container::Entity::find()
            .order_by_asc(container::Column::ContainerNo)
            .all(&*self.db)
            .await?)
    }

    /// Deletes a container. Refused while attached to any shipment.
    #[instrument(skip(self))]
    pub async fn delete_container(&self, container_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        container::Entity::find_by_id(container_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("container {} not found", container_id))
            })?;

        let attached = shipment_container::Entity::find()
            .filter(shipment_container::Column::ContainerId.eq(container_id))
            .count(db)
            .await?;
        if attached > 0 {
            return Err(ServiceError::foreign_key(format!(
                "container {} is attached to {} shipment(s)",
                container_id, attached
            )));
        }

        container::Entity::delete_by_id(container_id).exec(db).await?;
        Ok(())
    }
}
