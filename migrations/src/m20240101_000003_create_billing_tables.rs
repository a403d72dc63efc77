use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_reference_tables::Customers;
use crate::m20240101_000002_create_shipment_tables::Shipments;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Invoices::Id).uuid().primary_key().not_null())
                    .col(
                        ColumnDef::new(Invoices::InvoiceNo)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Invoices::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Invoices::ShipmentId).uuid().null())
                    .col(ColumnDef::new(Invoices::IssueDate).date().not_null())
                    .col(ColumnDef::new(Invoices::DueDate).date().not_null())
                    .col(
                        ColumnDef::new(Invoices::TotalAmount)
                            .decimal_len(16, 4)
                            .not_null()
                            .check(Expr::col(Invoices::TotalAmount).gte(0)),
                    )
                    .col(ColumnDef::new(Invoices::Status).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_customer")
                            .from(Invoices::Table, Invoices::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_shipment")
                            .from(Invoices::Table, Invoices::ShipmentId)
                            .to(Shipments::Table, Shipments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InvoiceLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvoiceLines::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InvoiceLines::InvoiceId).uuid().not_null())
                    .col(ColumnDef::new(InvoiceLines::Description).string().not_null())
                    .col(
                        ColumnDef::new(InvoiceLines::Quantity)
                            .integer()
                            .not_null()
                            .check(Expr::col(InvoiceLines::Quantity).gt(0)),
                    )
                    .col(
                        ColumnDef::new(InvoiceLines::UnitPrice)
                            .decimal_len(16, 4)
                            .not_null()
                            .check(Expr::col(InvoiceLines::UnitPrice).gte(0)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_lines_invoice")
                            .from(InvoiceLines::Table, InvoiceLines::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Payments::InvoiceId).uuid().not_null())
                    .col(
                        ColumnDef::new(Payments::PaidAmount)
                            .decimal_len(16, 4)
                            .not_null()
                            .check(Expr::col(Payments::PaidAmount).gt(0)),
                    )
                    .col(ColumnDef::new(Payments::PaidDate).date().not_null())
                    .col(ColumnDef::new(Payments::Method).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_invoice")
                            .from(Payments::Table, Payments::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_customer_status")
                    .table(Invoices::Table)
                    .col(Invoices::CustomerId)
                    .col(Invoices::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvoiceLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Invoices {
    Table,
    Id,
    InvoiceNo,
    CustomerId,
    ShipmentId,
    IssueDate,
    DueDate,
    TotalAmount,
    Status,
}

#[derive(DeriveIden)]
pub enum InvoiceLines {
    Table,
    Id,
    InvoiceId,
    Description,
    Quantity,
    UnitPrice,
}

#[derive(DeriveIden)]
pub enum Payments {
    Table,
    Id,
    InvoiceId,
    PaidAmount,
    PaidDate,
    Method,
}
