use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Equipment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Equipment::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Equipment::Name).string().not_null())
                    .col(
                        ColumnDef::new(Equipment::SerialNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Equipment::Category).string().null())
                    .col(ColumnDef::new(Equipment::Department).string().null())
                    .col(
                        ColumnDef::new(Equipment::AssignedEmployeeName)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(Equipment::PurchaseDate).date().null())
                    .col(ColumnDef::new(Equipment::WarrantyEndDate).date().null())
                    .col(ColumnDef::new(Equipment::Location).string().null())
                    .col(
                        ColumnDef::new(Equipment::MaintenanceTeamId)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Equipment::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Equipment::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_equipment_team")
                            .from(Equipment::Table, Equipment::MaintenanceTeamId)
                            .to(Teams::Table, Teams::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Equipment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Equipment {
    Table,
    Id,
    Name,
    SerialNumber,
    Category,
    Department,
    AssignedEmployeeName,
    PurchaseDate,
    WarrantyEndDate,
    Location,
    MaintenanceTeamId,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
}
