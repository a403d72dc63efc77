use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_reference_tables::{
    Containers, Customers, Ports, Routes, Vessels,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shipments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shipments::Id).uuid().primary_key().not_null())
                    .col(
                        ColumnDef::new(Shipments::BookingNo)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Shipments::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Shipments::RouteId).uuid().not_null())
                    .col(ColumnDef::new(Shipments::VesselId).uuid().null())
                    .col(ColumnDef::new(Shipments::Status).string().not_null())
                    .col(ColumnDef::new(Shipments::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Shipments::DeliveredAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipments_customer")
                            .from(Shipments::Table, Shipments::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipments_route")
                            .from(Shipments::Table, Shipments::RouteId)
                            .to(Routes::Table, Routes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipments_vessel")
                            .from(Shipments::Table, Shipments::VesselId)
                            .to(Vessels::Table, Vessels::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ShipmentContainers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ShipmentContainers::ShipmentId).uuid().not_null())
                    .col(
                        ColumnDef::new(ShipmentContainers::ContainerId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ShipmentContainers::ShipmentId)
                            .col(ShipmentContainers::ContainerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipment_containers_shipment")
                            .from(ShipmentContainers::Table, ShipmentContainers::ShipmentId)
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipment_containers_container")
                            .from(ShipmentContainers::Table, ShipmentContainers::ContainerId)
                            .to(Containers::Table, Containers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TrackingEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackingEvents::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TrackingEvents::ShipmentId).uuid().not_null())
                    .col(ColumnDef::new(TrackingEvents::EventType).string().not_null())
                    .col(
                        ColumnDef::new(TrackingEvents::EventTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TrackingEvents::PortId).uuid().null())
                    .col(ColumnDef::new(TrackingEvents::Notes).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracking_events_shipment")
                            .from(TrackingEvents::Table, TrackingEvents::ShipmentId)
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracking_events_port")
                            .from(TrackingEvents::Table, TrackingEvents::PortId)
                            .to(Ports::Table, Ports::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracking_events_shipment_time")
                    .table(TrackingEvents::Table)
                    .col(TrackingEvents::ShipmentId)
                    .col(TrackingEvents::EventTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrackingEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShipmentContainers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shipments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Shipments {
    Table,
    Id,
    BookingNo,
    CustomerId,
    RouteId,
    VesselId,
    Status,
    CreatedAt,
    DeliveredAt,
}

#[derive(DeriveIden)]
pub enum ShipmentContainers {
    Table,
    ShipmentId,
    ContainerId,
}

#[derive(DeriveIden)]
pub enum TrackingEvents {
    Table,
    Id,
    ShipmentId,
    EventType,
    EventTime,
    PortId,
    Notes,
}
