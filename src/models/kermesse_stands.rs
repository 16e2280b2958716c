use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Liaison kermesse <-> stands
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kermesse_stands")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub kermesse_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub stand_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kermesse::Entity",
        from = "Column::KermesseId",
        to = "super::kermesse::Column::Id"
    )]
    Kermesse,

    #[sea_orm(
        belongs_to = "super::stand::Entity",
        from = "Column::StandId",
        to = "super::stand::Column::Id"
    )]
    Stand,
}

impl ActiveModelBehavior for ActiveModel {}
