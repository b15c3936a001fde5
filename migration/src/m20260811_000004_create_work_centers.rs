use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkCenters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkCenters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WorkCenters::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(WorkCenters::Code).string().null().unique_key())
                    .col(ColumnDef::new(WorkCenters::Tag).string().null())
                    .col(
                        ColumnDef::new(WorkCenters::CostPerHour)
                            .double()
                            .not_null()
                            .default(0)
                            .check(Expr::col(WorkCenters::CostPerHour).gte(0)),
                    )
                    .col(
                        ColumnDef::new(WorkCenters::CapacityPerHour)
                            .double()
                            .not_null()
                            .default(0)
                            .check(Expr::col(WorkCenters::CapacityPerHour).gte(0)),
                    )
                    .col(
                        ColumnDef::new(WorkCenters::TimeEfficiencyPct)
                            .double()
                            .not_null()
                            .default(100)
                            .check(Expr::col(WorkCenters::TimeEfficiencyPct).between(0, 100)),
                    )
                    .col(
                        ColumnDef::new(WorkCenters::OeeTargetPct)
                            .double()
                            .not_null()
                            .default(0)
                            .check(Expr::col(WorkCenters::OeeTargetPct).between(0, 100)),
                    )
                    .col(
                        ColumnDef::new(WorkCenters::Status)
                            .string()
                            .not_null()
                            .default("active")
                            .check(Expr::col(WorkCenters::Status).is_in(["active", "inactive"])),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkCenterAlternatives::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkCenterAlternatives::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WorkCenterAlternatives::WorkCenterId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkCenterAlternatives::AlternativeWorkCenterId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wca_work_center")
                            .from(
                                WorkCenterAlternatives::Table,
                                WorkCenterAlternatives::WorkCenterId,
                            )
                            .to(WorkCenters::Table, WorkCenters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wca_alternative")
                            .from(
                                WorkCenterAlternatives::Table,
                                WorkCenterAlternatives::AlternativeWorkCenterId,
                            )
                            .to(WorkCenters::Table, WorkCenters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_wca_unique")
                    .table(WorkCenterAlternatives::Table)
                    .col(WorkCenterAlternatives::WorkCenterId)
                    .col(WorkCenterAlternatives::AlternativeWorkCenterId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkCenterAlternatives::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkCenters::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum WorkCenters {
    Table,
    Id,
    Name,
    Code,
    Tag,
    CostPerHour,
    CapacityPerHour,
    TimeEfficiencyPct,
    OeeTargetPct,
    Status,
}

#[derive(Iden)]
enum WorkCenterAlternatives {
    Table,
    Id,
    WorkCenterId,
    AlternativeWorkCenterId,
}
