use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Liaison kermesse <-> organisateurs
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kermesse_organizers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub kermesse_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
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
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl ActiveModelBehavior for ActiveModel {}
