use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub picture: Option<String>,
    #[serde(rename = "type")]
    #[sea_orm(column_name = "type")]
    pub product_type: String,
    pub jetons_requis: i64,
    pub stock: i64, // Quantité restante, jamais négative
    pub stand_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stand::Entity",
        from = "Column::StandId",
        to = "super::stand::Column::Id"
    )]
    Stand,
}

impl Related<super::stand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
