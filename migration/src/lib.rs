pub use sea_orm_migration::prelude::*;

mod m20260810_000001_create_users;
mod m20260810_000002_create_teams;
mod m20260810_000003_create_equipment;
mod m20260811_000004_create_work_centers;
mod m20260811_000005_create_maintenance_requests;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_000001_create_users::Migration),
            Box::new(m20260810_000002_create_teams::Migration),
            Box::new(m20260810_000003_create_equipment::Migration),
            Box::new(m20260811_000004_create_work_centers::Migration),
            Box::new(m20260811_000005_create_maintenance_requests::Migration),
        ]
    }
}
