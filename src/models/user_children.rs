use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Table de liaison parent -> enfant (clé composite, pas de doublon possible)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_children")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub parent_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub child_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ParentId",
        to = "super::users::Column::Id"
    )]
    Parent,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ChildId",
        to = "super::users::Column::Id"
    )]
    Child,
}

impl ActiveModelBehavior for ActiveModel {}
