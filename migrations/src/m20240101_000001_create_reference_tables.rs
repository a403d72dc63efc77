use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(
                        ColumnDef::new(Customers::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Customers::Phone).string().null())
                    .col(ColumnDef::new(Customers::BillingAddress).text().not_null())
                    .col(ColumnDef::new(Customers::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Customers::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ports::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ports::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Ports::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Ports::Name).string().not_null())
                    .col(ColumnDef::new(Ports::Country).string().not_null())
                    .col(ColumnDef::new(Ports::Timezone).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vessels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vessels::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Vessels::Name).string().not_null())
                    .col(
                        ColumnDef::new(Vessels::ImoNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Vessels::CapacityTeu)
                            .integer()
                            .not_null()
                            .check(Expr::col(Vessels::CapacityTeu).gte(0)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Routes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Routes::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Routes::OriginPortId).uuid().not_null())
                    .col(ColumnDef::new(Routes::DestPortId).uuid().not_null())
                    .col(
                        ColumnDef::new(Routes::PlannedDepartureDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Routes::PlannedArrivalDate).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_routes_origin_port")
                            .from(Routes::Table, Routes::OriginPortId)
                            .to(Ports::Table, Ports::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_routes_dest_port")
                            .from(Routes::Table, Routes::DestPortId)
                            .to(Ports::Table, Ports::Id),
                    )
                    .check(
                        Expr::col(Routes::OriginPortId)
                            .ne(Expr::col(Routes::DestPortId)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Containers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Containers::Id).uuid().primary_key().not_null())
                    .col(
                        ColumnDef::new(Containers::ContainerNo)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Containers::SizeFeet)
                            .integer()
                            .not_null()
                            .check(Expr::col(Containers::SizeFeet).is_in([20, 40, 45])),
                    )
                    .col(ColumnDef::new(Containers::TypeCode).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Containers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Routes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vessels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Customers {
    Table,
    Id,
    Name,
    Email,
    Phone,
    BillingAddress,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Ports {
    Table,
    Id,
    Code,
    Name,
    Country,
    Timezone,
}

#[derive(DeriveIden)]
pub enum Vessels {
    Table,
    Id,
    Name,
    ImoNumber,
    CapacityTeu,
}

#[derive(DeriveIden)]
pub enum Routes {
    Table,
    Id,
    OriginPortId,
    DestPortId,
    PlannedDepartureDate,
    PlannedArrivalDate,
}

#[derive(DeriveIden)]
pub enum Containers {
    Table,
    Id,
    ContainerNo,
    SizeFeet,
    TypeCode,
}
