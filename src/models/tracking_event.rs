use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Tracking event types, in the order they typically occur along a
/// shipment's journey.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingEventType {
    #[sea_orm(string_value = "LOADED")]
    Loaded,
    #[sea_orm(string_value = "DEPARTED")]
    Departed,
    #[sea_orm(string_value = "ARRIVED")]
    Arrived,
    #[sea_orm(string_value = "CUSTOMS")]
    Customs,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
}

/// Append-only tracking event belonging to exactly one shipment. Events
/// are never mutated or deleted individually; they go away only when the
/// parent shipment is deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tracking_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub event_type: TrackingEventType,
    pub event_time: DateTimeUtc,
    pub port_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shipment::Entity",
        from = "Column::ShipmentId",
        to = "super::shipment::Column::Id"
    )]
    Shipment,
    #[sea_orm(
        belongs_to = "super::port::Entity",
        from = "Column::PortId",
        to = "super::port::Column::Id"
    )]
    Port,
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipment.def()
    }
}

impl Related<super::port::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Port.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
