use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Paiement enregistré : recharge de jetons ou ticket de tombola.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[serde(rename = "type")]
    #[sea_orm(column_name = "type")]
    pub kind: String, // 'jetons', 'tombola'
    pub date: DateTimeUtc,
    pub price: Decimal,
    pub quantity: i64,
    pub payment_intent_id: String,
    pub user_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
