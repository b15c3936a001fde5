use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "work_center_alternatives")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub work_center_id: i32,
    pub alternative_work_center_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_center::Entity",
        from = "Column::WorkCenterId",
        to = "super::work_center::Column::Id"
    )]
    WorkCenter,
    #[sea_orm(
        belongs_to = "super::work_center::Entity",
        from = "Column::AlternativeWorkCenterId",
        to = "super::work_center::Column::Id"
    )]
    AlternativeWorkCenter,
}

// Owner side; the alternative side is joined explicitly under an alias.
impl Related<super::work_center::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkCenter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
