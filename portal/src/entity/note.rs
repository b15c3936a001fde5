use sea_orm::entity::prelude::*;

/// Notes are append-only; there is no update path for them anywhere in the API.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub request_id: i32,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::maintenance_request::Entity",
        from = "Column::RequestId",
        to = "super::maintenance_request::Column::Id"
    )]
    MaintenanceRequest,
}

impl Related<super::maintenance_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
