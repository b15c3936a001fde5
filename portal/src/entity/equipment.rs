use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub serial_number: String,
    pub category: Option<String>,
    pub department: Option<String>,
    pub assigned_employee_name: Option<String>,
    pub purchase_date: Option<Date>,
    pub warranty_end_date: Option<Date>,
    pub location: Option<String>,
    pub maintenance_team_id: Option<i32>,
    pub status: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::MaintenanceTeamId",
        to = "super::team::Column::Id"
    )]
    Team,
    #[sea_orm(has_many = "super::maintenance_request::Entity")]
    MaintenanceRequest,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::maintenance_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
