use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::{shipment, vessel};

#[derive(Debug, Clone, Validate)]
pub struct CreateVesselInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// IMO registry number, unique per vessel.
    #[validate(length(min = 7, max = 10))]
    pub imo_number: String,
    pub capacity_teu: i32,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateVesselInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 7, max = 10))]
    pub imo_number: Option<String>,
    pub capacity_teu: Option<i32>,
}

/// Service for managing vessels.
#[derive(Clone)]
pub struct VesselService {
    db: Arc<DbPool>,
}

impl VesselService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_vessel(
        &self,
        input: CreateVesselInput,
    ) -> Result<vessel::Model, ServiceError> {
        input.validate()?;
        if input.capacity_teu < 0 {
            return Err(ServiceError::constraint(format!(
                "vessel capacity must be >= 0, got {}",
                input.capacity_teu
            )));
        }

        let db = &*self.db;
        let existing = vessel::Entity::find()
            .filter(vessel::Column::ImoNumber.eq(input.imo_number.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::constraint(format!(
                "vessel with IMO number {} already exists",
                input.imo_number
            )));
        }

        let model = vessel::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            imo_number: Set(input.imo_number),
            capacity_teu: Set(input.capacity_teu),
        };

        let created = model.insert(db).await?;
        info!(vessel_id = %created.id, imo = %created.imo_number, "vessel created");
        Ok(created)
    }

    /// Updates a vessel, re-applying the create validation to the new
    /// field values.
    #[instrument(skip(self))]
    pub async fn update_vessel(
        &self,
        vessel_id: Uuid,
        input: UpdateVesselInput,
    ) -> Result<vessel::Model, ServiceError> {
        input.validate()?;
        if let Some(capacity) = input.capacity_teu {
            if capacity < 0 {
                return Err(ServiceError::constraint(format!(
                    "vessel capacity must be >= 0, got {}",
                    capacity
                )));
            }
        }

        let db = &*self.db;
        let model = vessel::Entity::find_by_id(vessel_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("vessel {} not found", vessel_id)))?;

        if let Some(ref imo_number) = input.imo_number {
            let taken = vessel::Entity::find()
                .filter(vessel::Column::ImoNumber.eq(imo_number.clone()))
                .filter(vessel::Column::Id.ne(vessel_id))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(ServiceError::constraint(format!(
                    "vessel with IMO number {} already exists",
                    imo_number
                )));
            }
        }

        let mut active: vessel::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(imo_number) = input.imo_number {
            active.imo_number = Set(imo_number);
        }
        if let Some(capacity) = input.capacity_teu {
            active.capacity_teu = Set(capacity);
        }

        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_vessel(&self, vessel_id: Uuid) -> Result<Option<vessel::Model>, ServiceError> {
        Ok(vessel::Entity::find_by_id(vessel_id).one(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_imo(&self, imo_number: &str) -> Result<Option<vessel::Model>, ServiceError> {
        Ok(vessel::Entity::find()
            .filter(vessel::Column::ImoNumber.eq(imo_number))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_vessels(&self) -> Result<Vec<vessel::Model>, ServiceError> {
        Ok(vessel::Entity::find()
            .order_by_asc(vessel::Column::Name)
            .all(&*self.db)
            .await?)
    }

    /// Deletes a vessel. Refused while shipments still have it assigned.
    #[instrument(skip(self))]
    pub async fn delete_vessel(&self, vessel_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        vessel::Entity::find_by_id(vessel_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("vessel {} not found", vessel_id)))?;

        let assigned = shipment::Entity::find()
            .filter(shipment::Column::VesselId.eq(vessel_id))
            .count(db)
            .await?;
        if assigned > 0 {
            return Err(ServiceError::foreign_key(format!(
                "vessel {} is assigned to {} shipment(s)",
                vessel_id, assigned
            )));
        }

        vessel::Entity::delete_by_id(vessel_id).exec(db).await?;
        Ok(())
    }
}
