use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Container size in feet, restricted to the standard set. Stored as the
/// integer footage so the database CHECK constraint reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum ContainerSize {
    #[sea_orm(num_value = 20)]
    Teu20,
    #[sea_orm(num_value = 40)]
    Teu40,
    #[sea_orm(num_value = 45)]
    Teu45,
}

impl ContainerSize {
    /// Maps raw footage to the closed size set. Anything outside
    /// {20, 40, 45} is not a valid container size.
    pub fn from_feet(feet: i32) -> Option<Self> {
        match feet {
            20 => Some(ContainerSize::Teu20),
            40 => Some(ContainerSize::Teu40),
            45 => Some(ContainerSize::Teu45),
            _ => None,
        }
    }

    pub fn feet(&self) -> i32 {
        match self {
            ContainerSize::Teu20 => 20,
            ContainerSize::Teu40 => 40,
            ContainerSize::Teu45 => 45,
        }
    }
}

impl fmt::Display for ContainerSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ft", self.feet())
    }
}

/// Container entity with a globally unique container number (e.g.
/// "MSCU1234567") and an ISO type code such as "DRY" or "REEF".
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "containers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub container_no: String,
    pub size_feet: ContainerSize,
    pub type_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shipment_container::Entity")]
    ShipmentContainers,
}

impl Related<super::shipment_container::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShipmentContainers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
