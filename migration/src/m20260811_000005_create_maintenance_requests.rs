use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MaintenanceRequests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MaintenanceRequests::Type).string().not_null())
                    .col(
                        ColumnDef::new(MaintenanceRequests::Subject)
                            .string()
                            .not_null(),
                    )
                    // Exactly one of equipment_id / work_center_id is set; the API
                    // layer enforces the XOR, the store keeps both nullable.
                    .col(
                        ColumnDef::new(MaintenanceRequests::EquipmentId)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRequests::WorkCenterId)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(MaintenanceRequests::TeamId).integer().null())
                    .col(
                        ColumnDef::new(MaintenanceRequests::ScheduledDate)
                            .date()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRequests::Status)
                            .string()
                            .not_null()
                            .default("new"),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRequests::AssignedToUserId)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRequests::DurationHours)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRequests::CreatedByUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRequests::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRequests::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mr_equipment")
                            .from(MaintenanceRequests::Table, MaintenanceRequests::EquipmentId)
                            .to(Equipment::Table, Equipment::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mr_work_center")
                            .from(
                                MaintenanceRequests::Table,
                                MaintenanceRequests::WorkCenterId,
                            )
                            .to(WorkCenters::Table, WorkCenters::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mr_team")
                            .from(MaintenanceRequests::Table, MaintenanceRequests::TeamId)
                            .to(Teams::Table, Teams::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mr_assignee")
                            .from(
                                MaintenanceRequests::Table,
                                MaintenanceRequests::AssignedToUserId,
                            )
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mr_creator")
                            .from(
                                MaintenanceRequests::Table,
                                MaintenanceRequests::CreatedByUserId,
                            )
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notes::RequestId).integer().not_null())
                    .col(ColumnDef::new(Notes::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notes::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notes_request")
                            .from(Notes::Table, Notes::RequestId)
                            .to(MaintenanceRequests::Table, MaintenanceRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MaintenanceRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MaintenanceRequests {
    Table,
    Id,
    Type,
    Subject,
    EquipmentId,
    WorkCenterId,
    TeamId,
    ScheduledDate,
    Status,
    AssignedToUserId,
    DurationHours,
    CreatedByUserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Notes {
    Table,
    Id,
    RequestId,
    Message,
    CreatedAt,
}

#[derive(Iden)]
enum Equipment {
    Table,
    Id,
}

#[derive(Iden)]
enum WorkCenters {
    Table,
    Id,
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
