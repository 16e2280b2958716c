use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)] // Jamais exposé en JSON
    pub password_hash: String, // Format: pbkdf2:sha256:iterations$salt$hash
    pub picture: Option<String>,
    pub role: i32, // 1 = ADMIN / 2 = ORGANISATEUR / 3 = TENEUR DE STAND / 4 = PARENT / 5 = ELEVE
    pub jetons: i64,
    pub pts_attribues: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::kermesse::Entity")]
    Kermesse,

    #[sea_orm(has_many = "super::stand::Entity")]
    Stand,

    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,

    #[sea_orm(has_many = "super::history::Entity")]
    History,
}

impl Related<super::kermesse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kermesse.def()
    }
}

impl Related<super::stand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stand.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
