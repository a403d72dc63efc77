use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Route between two distinct ports with planned departure/arrival dates.
/// Origin and destination must always differ.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "routes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub origin_port_id: Uuid,
    pub dest_port_id: Uuid,
    pub planned_departure_date: Date,
    pub planned_arrival_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::port::Entity",
        from = "Column::OriginPortId",
        to = "super::port::Column::Id"
    )]
    OriginPort,
    #[sea_orm(
        belongs_to = "super::port::Entity",
        from = "Column::DestPortId",
        to = "super::port::Column::Id"
    )]
    DestPort,
    #[sea_orm(has_many = "super::shipment::Entity")]
    Shipments,
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
