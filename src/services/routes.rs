use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::{port, route, shipment};

#[derive(Debug, Clone)]
pub struct CreateRouteInput {
    pub origin_port_id: Uuid,
    pub dest_port_id: Uuid,
    pub planned_departure_date: NaiveDate,
    pub planned_arrival_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRouteInput {
    pub origin_port_id: Option<Uuid>,
    pub dest_port_id: Option<Uuid>,
    pub planned_departure_date: Option<NaiveDate>,
    pub planned_arrival_date: Option<NaiveDate>,
}

/// Service for managing routes between ports.
#[derive(Clone)]
pub struct RouteService {
    db: Arc<DbPool>,
}

impl RouteService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    async fn ensure_port_exists(&self, port_id: Uuid, role: &str) -> Result<(), ServiceError> {
        let found = port::Entity::find_by_id(port_id).one(&*self.db).await?;
        if found.is_none() {
            return Err(ServiceError::foreign_key(format!(
                "{} port {} does not exist",
                role, port_id
            )));
        }
        Ok(())
    }

    /// Creates a route. Origin and destination ports must exist and must
    /// differ.
    #[instrument(skip(self))]
    pub async fn create_route(&self, input: CreateRouteInput) -> Result<route::Model, ServiceError> {
        if input.origin_port_id == input.dest_port_id {
            return Err(ServiceError::constraint(
                "route origin and destination ports must differ",
            ));
        }
        self.ensure_port_exists(input.origin_port_id, "origin").await?;
        self.ensure_port_exists(input.dest_port_id, "destination").await?;

        let model = route::ActiveModel {
            id: Set(Uuid::new_v4()),
            origin_port_id: Set(input.origin_port_id),
            dest_port_id: Set(input.dest_port_id),
            planned_departure_date: Set(input.planned_departure_date),
            planned_arrival_date: Set(input.planned_arrival_date),
        };

        let created = model.insert(&*self.db).await?;
        info!(route_id = %created.id, "route created");
        Ok(created)
    }

    /// Updates a route, re-applying the create validation to the new
    /// field values.
    #[instrument(skip(self))]
    pub async fn update_route(
        &self,
        route_id: Uuid,
        input: UpdateRouteInput,
    ) -> Result<route::Model, ServiceError> {
        let db = &*self.db;
        let model = route::Entity::find_by_id(route_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("route {} not found", route_id)))?;

        let origin = input.origin_port_id.unwrap_or(model.origin_port_id);
        let dest = input.dest_port_id.unwrap_or(model.dest_port_id);
        if origin == dest {
            return Err(ServiceError::constraint(
                "route origin and destination ports must differ",
            ));
        }
        if input.origin_port_id.is_some() {
            self.ensure_port_exists(origin, "origin").await?;
        }
        if input.dest_port_id.is_some() {
            self.ensure_port_exists(dest, "destination").await?;
        }

        let mut active: route::ActiveModel = model.into();
        active.origin_port_id = Set(origin);
        active.dest_port_id = Set(dest);
        if let Some(departure) = input.planned_departure_date {
            active.planned_departure_date = Set(departure);
        }
        if let Some(arrival) = input.planned_arrival_date {
            active.planned_arrival_date = Set(arrival);
        }

        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_route(&self, route_id: Uuid) -> Result<Option<route::Model>, ServiceError> {
        Ok(route::Entity::find_by_id(route_id).one(&*self.db).await?)
    }

    /// Finds a route by its origin/destination port pair. Used by the CSV
    /// importer to resolve shipments.
    #[instrument(skip(self))]
    pub async fn find_by_ports(
        &self,
        origin_port_id: Uuid,
        dest_port_id: Uuid,
    ) -> Result<Option<route::Model>, ServiceError> {
        Ok(route::Entity::find()
            .filter(route::Column::OriginPortId.eq(origin_port_id))
            .filter(route::Column::DestPortId.eq(dest_port_id))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_routes(&self) -> Result<Vec<route::Model>, ServiceError> {
        Ok(route::Entity::find()
            .order_by_asc(route::Column::PlannedDepartureDate)
            .all(&*self.db)
            .await?)
    }

    /// Deletes a route. Refused while shipments still travel it.
    #[instrument(skip(self))]
    pub async fn delete_route(&self, route_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        route::Entity::find_by_id(route_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("route {} not found", route_id)))?;

        let shipment_count = shipment::Entity::find()
            .filter(shipment::Column::RouteId.eq(route_id))
            .count(db)
            .await?;
        if shipment_count > 0 {
            return Err(ServiceError::foreign_key(format!(
                "route {} is referenced by {} shipment(s)",
                route_id, shipment_count
            )));
        }

        route::Entity::delete_by_id(route_id).exec(db).await?;
        Ok(())
    }
}
