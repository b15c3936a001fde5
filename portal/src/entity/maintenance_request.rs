use sea_orm::entity::prelude::*;

/// A maintenance request targets exactly one of equipment / work center.
/// The XOR is enforced at the API boundary (`lifecycle::RequestTarget`);
/// the store keeps both columns nullable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "maintenance_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "type")]
    pub request_type: String,
    pub subject: String,
    pub equipment_id: Option<i32>,
    pub work_center_id: Option<i32>,
    pub team_id: Option<i32>,
    pub scheduled_date: Option<Date>,
    pub status: String,
    pub assigned_to_user_id: Option<i32>,
    pub duration_hours: Option<f64>,
    pub created_by_user_id: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id"
    )]
    Equipment,
    #[sea_orm(
        belongs_to = "super::work_center::Entity",
        from = "Column::WorkCenterId",
        to = "super::work_center::Column::Id"
    )]
    WorkCenter,
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedToUserId",
        to = "super::user::Column::Id"
    )]
    Assignee,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedByUserId",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::note::Entity")]
    Note,
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl Related<super::work_center::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkCenter.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Note.def()
    }
}

// No Related<user::Entity>: both Assignee and Creator point at users, so the
// user joins are always spelled out via Relation defs under table aliases.

impl ActiveModelBehavior for ActiveModel {}
