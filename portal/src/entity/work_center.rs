use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "work_centers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub code: Option<String>,
    pub tag: Option<String>,
    pub cost_per_hour: f64,
    pub capacity_per_hour: f64,
    pub time_efficiency_pct: f64,
    pub oee_target_pct: f64,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::maintenance_request::Entity")]
    MaintenanceRequest,
    #[sea_orm(has_many = "super::work_center_alternative::Entity")]
    Alternative,
}

impl Related<super::maintenance_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceRequest.def()
    }
}

impl Related<super::work_center_alternative::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alternative.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
