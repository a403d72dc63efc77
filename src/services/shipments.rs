use chrono::{DateTime, Utc};
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
use crate::models::{
    container, customer, port, route, shipment, shipment_container, tracking_event,
    ShipmentStatus, TrackingEventType,
};

#[derive(Debug, Clone, Validate)]
pub struct CreateShipmentInput {
    #[validate(length(min = 1, max = 50))]
    pub booking_no: String,
    pub customer_id: Uuid,
    pub route_id: Uuid,
    pub vessel_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateShipmentInput {
    #[validate(length(min = 1, max = 50))]
    pub booking_no: Option<String>,
    pub route_id: Option<Uuid>,
    pub vessel_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct RecordTrackingEventInput {
    pub shipment_id: Uuid,
    pub event_type: TrackingEventType,
    pub event_time: DateTime<Utc>,
    pub port_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Service for managing shipments, their container associations and their
/// append-only tracking event log.
#[derive(Clone)]
pub struct ShipmentService {
    db: Arc<DbPool>,
}

impl ShipmentService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a new shipment in status BOOKED.
    #[instrument(skip(self))]
    pub async fn create_shipment(
        &self,
        input: CreateShipmentInput,
    ) -> Result<shipment::Model, ServiceError> {
        input.validate()?;

        let db = &*self.db;
        let existing = shipment::Entity::find()
            .filter(shipment::Column::BookingNo.eq(input.booking_no.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::constraint(format!(
                "shipment with booking number {} already exists",
                input.booking_no
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
        if route::Entity::find_by_id(input.route_id)
            .one(db)
            .await?
            .is_none()
        {
            return Err(ServiceError::foreign_key(format!(
                "route {} does not exist",
                input.route_id
            )));
        }
        if let Some(vessel_id) = input.vessel_id {
            self.ensure_vessel_exists(vessel_id).await?;
        }

        let model = shipment::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_no: Set(input.booking_no),
            customer_id: Set(input.customer_id),
            route_id: Set(input.route_id),
            vessel_id: Set(input.vessel_id),
            status: Set(ShipmentStatus::Booked),
            created_at: Set(Utc::now()),
            delivered_at: Set(None),
        };

        let created = model.insert(db).await?;
        info!(shipment_id = %created.id, booking_no = %created.booking_no, "shipment booked");
        Ok(created)
    }

    /// Updates a shipment, re-applying the create validation to the new
    /// field values.
    #[instrument(skip(self))]
    pub async fn update_shipment(
        &self,
        shipment_id: Uuid,
        input: UpdateShipmentInput,
    ) -> Result<shipment::Model, ServiceError> {
        input.validate()?;

        let db = &*self.db;
        let model = self.require_shipment(shipment_id).await?;

        if let Some(ref booking_no) = input.booking_no {
            let taken = shipment::Entity::find()
                .filter(shipment::Column::BookingNo.eq(booking_no.clone()))
                .filter(shipment::Column::Id.ne(shipment_id))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(ServiceError::constraint(format!(
                    "shipment with booking number {} already exists",
                    booking_no
                )));
            }
        }
        if let Some(route_id) = input.route_id {
            if route::Entity::find_by_id(route_id).one(db).await?.is_none() {
                return Err(ServiceError::foreign_key(format!(
                    "route {} does not exist",
                    route_id
                )));
            }
        }
        if let Some(vessel_id) = input.vessel_id {
            self.ensure_vessel_exists(vessel_id).await?;
        }

        let mut active: shipment::ActiveModel = model.into();
        if let Some(booking_no) = input.booking_no {
            active.booking_no = Set(booking_no);
        }
        if let Some(route_id) = input.route_id {
            active.route_id = Set(route_id);
        }
        if let Some(vessel_id) = input.vessel_id {
            active.vessel_id = Set(Some(vessel_id));
        }

        Ok(active.update(db).await?)
    }

    /// Assigns a vessel to a shipment.
    #[instrument(skip(self))]
    pub async fn assign_vessel(
        &self,
        shipment_id: Uuid,
        vessel_id: Uuid,
    ) -> Result<shipment::Model, ServiceError> {
        self.ensure_vessel_exists(vessel_id).await?;
        let model = self.require_shipment(shipment_id).await?;

        let mut active: shipment::ActiveModel = model.into();
        active.vessel_id = Set(Some(vessel_id));
        Ok(active.update(&*self.db).await?)
    }

    /// Cancels a shipment. Only BOOKED shipments can be cancelled.
    #[instrument(skip(self))]
    pub async fn cancel_shipment(&self, shipment_id: Uuid) -> Result<shipment::Model, ServiceError> {
        let model = self.require_shipment(shipment_id).await?;
        if model.status != ShipmentStatus::Booked {
            return Err(ServiceError::invalid_transition(format!(
                "cannot cancel shipment {} in status {}",
                shipment_id, model.status
            )));
        }

        let mut active: shipment::ActiveModel = model.into();
        active.status = Set(ShipmentStatus::Cancelled);
        let updated = active.update(&*self.db).await?;
        info!(%shipment_id, "shipment cancelled");
        Ok(updated)
    }

    /// Attaches a container to a shipment. Both sides must exist and the
    /// pair must not already be associated.
    #[instrument(skip(self))]
    pub async fn attach_container(
        &self,
        shipment_id: Uuid,
        container_id: Uuid,
    ) -> Result<shipment_container::Model, ServiceError> {
        let db = &*self.db;
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
        if container::Entity::find_by_id(container_id)
            .one(db)
            .await?
            .is_none()
        {
            return Err(ServiceError::foreign_key(format!(
                "container {} does not exist",
                container_id
            )));
        }

        let existing = shipment_container::Entity::find_by_id((shipment_id, container_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::constraint(format!(
                "container {} is already attached to shipment {}",
                container_id, shipment_id
            )));
        }

        let model = shipment_container::ActiveModel {
            shipment_id: Set(shipment_id),
            container_id: Set(container_id),
        };
        Ok(model.insert(db).await?)
    }

    /// Detaches a container from a shipment.
    #[instrument(skip(self))]
    pub async fn detach_container(
        &self,
        shipment_id: Uuid,
        container_id: Uuid,
    ) -> Result<(), ServiceError> {
        let result = shipment_container::Entity::delete_by_id((shipment_id, container_id))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found(format!(
                "container {} is not attached to shipment {}",
                container_id, shipment_id
            )));
        }
        Ok(())
    }

    /// Appends a tracking event to a shipment's log.
    ///
    /// DEPARTED moves a BOOKED shipment to IN_TRANSIT. DELIVERED sets
    /// `delivered_at` to the event time and the status to DELIVERED in
    /// the same transaction as the event insert. Events against a
    /// cancelled or already-delivered shipment are rejected.
    #[instrument(skip(self))]
    pub async fn record_tracking_event(
        &self,
        input: RecordTrackingEventInput,
    ) -> Result<tracking_event::Model, ServiceError> {
        let db = &*self.db;
        let event = db
            .transaction::<_, tracking_event::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let shipment = shipment::Entity::find_by_id(input.shipment_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::invalid_transition(format!(
                                "cannot record tracking event: shipment {} does not exist",
                                input.shipment_id
                            ))
                        })?;

                    if shipment.status == ShipmentStatus::Cancelled {
                        return Err(ServiceError::invalid_transition(format!(
                            "cannot record tracking event on cancelled shipment {}",
                            shipment.id
                        )));
                    }
                    if input.event_type == TrackingEventType::Delivered
                        && shipment.status == ShipmentStatus::Delivered
                    {
                        return Err(ServiceError::invalid_transition(format!(
                            "shipment {} is already delivered",
                            shipment.id
                        )));
                    }

                    if let Some(port_id) = input.port_id {
                        if port::Entity::find_by_id(port_id).one(txn).await?.is_none() {
                            return Err(ServiceError::foreign_key(format!(
                                "port {} does not exist",
                                port_id
                            )));
                        }
                    }

                    let event = tracking_event::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        shipment_id: Set(shipment.id),
                        event_type: Set(input.event_type),
                        event_time: Set(input.event_time),
                        port_id: Set(input.port_id),
                        notes: Set(input.notes),
                    }
                    .insert(txn)
                    .await?;

                    let mut active: shipment::ActiveModel = shipment.clone().into();
                    let mut dirty = false;
                    match input.event_type {
                        TrackingEventType::Departed if shipment.status == ShipmentStatus::Booked => {
                            active.status = Set(ShipmentStatus::InTransit);
                            dirty = true;
                        }
                        TrackingEventType::Delivered => {
                            active.status = Set(ShipmentStatus::Delivered);
                            active.delivered_at = Set(Some(input.event_time));
                            dirty = true;
                        }
                        _ => {}
                    }
                    if dirty {
                        active.update(txn).await?;
                    }

                    Ok(event)
                })
            })
            .await?;

        info!(
            shipment_id = %event.shipment_id,
            event_type = %event.event_type,
            "tracking event recorded"
        );
        Ok(event)
    }

    /// Deletes a shipment together with its container associations and
    /// tracking events, all-or-nothing.
    #[instrument(skip(self))]
    pub async fn delete_shipment(&self, shipment_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                let shipment = shipment::Entity::find_by_id(shipment_id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::not_found(format!("shipment {} not found", shipment_id))
                    })?;

                shipment_container::Entity::delete_many()
                    .filter(shipment_container::Column::ShipmentId.eq(shipment_id))
                    .exec(txn)
                    .await?;
                tracking_event::Entity::delete_many()
                    .filter(tracking_event::Column::ShipmentId.eq(shipment_id))
                    .exec(txn)
                    .await?;
                shipment::Entity::delete_by_id(shipment.id).exec(txn).await?;

                Ok(())
            })
        })
        .await?;

        info!(%shipment_id, "shipment deleted with its containers and tracking events");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_shipment(
        &self,
        shipment_id: Uuid,
    ) -> Result<Option<shipment::Model>, ServiceError> {
        Ok(shipment::Entity::find_by_id(shipment_id)
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_booking_no(
        &self,
        booking_no: &str,
    ) -> Result<Option<shipment::Model>, ServiceError> {
        Ok(shipment::Entity::find()
            .filter(shipment::Column::BookingNo.eq(booking_no))
            .one(&*self.db)
            .await?)
    }

    /// Lists shipments with pagination and an optional status filter.
    #[instrument(skip(self))]
    pub async fn list_shipments(
        &self,
        page: u64,
        limit: u64,
        status: Option<ShipmentStatus>,
    ) -> Result<(Vec<shipment::Model>, u64), ServiceError> {
        let mut query = shipment::Entity::find();
        if let Some(status) = status {
            query = query.filter(shipment::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(shipment::Column::CreatedAt)
            .paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let shipments = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((shipments, total))
    }

    /// Returns a shipment's tracking log, ordered by event time.
    #[instrument(skip(self))]
    pub async fn list_tracking_events(
        &self,
        shipment_id: Uuid,
    ) -> Result<Vec<tracking_event::Model>, ServiceError> {
        self.require_shipment(shipment_id).await?;
        Ok(tracking_event::Entity::find()
            .filter(tracking_event::Column::ShipmentId.eq(shipment_id))
            .order_by_asc(tracking_event::Column::EventTime)
            .all(&*self.db)
            .await?)
    }

    /// Returns the containers attached to a shipment.
    #[instrument(skip(self))]
    pub async fn list_containers(
        &self,
        shipment_id: Uuid,
    ) -> Result<Vec<container::Model>, ServiceError> {
        self.require_shipment(shipment_id).await?;
        let links = shipment_container::Entity::find()
            .filter(shipment_container::Column::ShipmentId.eq(shipment_id))
            .all(&*self.db)
            .await?;
        let ids: Vec<Uuid> = links.iter().map(|l| l.container_id).collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(container::Entity::find()
            .filter(container::Column::Id.is_in(ids))
            .order_by_asc(container::Column::ContainerNo)
            .all(&*self.db)
            .await?)
    }

    async fn require_shipment(&self, shipment_id: Uuid) -> Result<shipment::Model, ServiceError> {
        shipment::Entity::find_by_id(shipment_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("shipment {} not found", shipment_id)))
    }

    async fn ensure_vessel_exists(&self, vessel_id: Uuid) -> Result<(), ServiceError> {
        use crate::models::vessel;
        if vessel::Entity::find_by_id(vessel_id)
            .one(&*self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::foreign_key(format!(
                "vessel {} does not exist",
                vessel_id
            )));
        }
        Ok(())
    }
}
