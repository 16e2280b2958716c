use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Catalogue des paquets de jetons achetables (pas de lien direct vers users)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jetons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nb_jetons: i64,
    pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
