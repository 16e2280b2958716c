// Requêtes et réponses structurées de l'API
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{history, kermesse, product, stand, transaction, users};

// ---------------------------------------------------------------- Auth

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 64))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub picture: Option<String>,
    pub role: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Mise à jour partielle : seuls les champs non vides écrasent l'existant
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub password: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Profil complet : chaque collection est chargée explicitement
#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: users::Model,
    pub parents: Vec<users::Model>,
    pub children: Vec<users::Model>,
    pub kermesses: Vec<kermesse::Model>,
    pub stands: Vec<stand::Model>,
    pub transactions: Vec<transaction::Model>,
    pub history: Vec<history::Model>,
}

// ---------------------------------------------------------------- Users

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub picture: Option<String>,
    pub role: i32,
    #[validate(range(min = 0))]
    pub jetons: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub password: Option<String>,
    pub picture: Option<String>,
    pub role: Option<i32>,
    #[validate(range(min = 0))]
    pub jetons: Option<i64>,
    #[validate(range(min = 0))]
    pub pts_attribues: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddChildrenRequest {
    #[validate(length(min = 1, message = "children_ids is empty"))]
    pub children_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GiveCoinsRequest {
    #[validate(range(min = 1))]
    pub nb_jetons: i64,
}

// ---------------------------------------------------------------- Kermesses

#[derive(Debug, Deserialize, Validate)]
pub struct CreateKermesseRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateKermesseRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddStandsRequest {
    #[validate(length(min = 1, message = "stand_ids is required"))]
    pub stand_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddUsersRequest {
    #[serde(rename = "type")]
    pub kind: String, // 'participants', 'organisateurs'
    #[validate(length(min = 1, message = "user_ids is required"))]
    pub user_ids: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct KermesseDetail {
    #[serde(flatten)]
    pub kermesse: kermesse::Model,
    pub organizers: Vec<users::Model>,
    pub participants: Vec<users::Model>,
    pub stands: Vec<stand::Model>,
}

// ---------------------------------------------------------------- Stands

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStandRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64))]
    pub stand_type: String,
    #[validate(range(min = 0))]
    pub jetons_requis: i64,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateStandRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64))]
    pub stand_type: Option<String>,
    #[validate(range(min = 0))]
    pub jetons_requis: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BuyProductRequest {
    #[validate(range(min = 1))]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GivePointsRequest {
    #[validate(range(min = 1))]
    pub points: i64,
}

#[derive(Debug, Serialize)]
pub struct StandDetail {
    #[serde(flatten)]
    pub stand: stand::Model,
    pub products: Vec<product::Model>,
}

// ---------------------------------------------------------------- Products

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    pub picture: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100))]
    pub product_type: String,
    #[validate(range(min = 0))]
    pub jetons_requis: i64,
    #[validate(range(min = 0))]
    pub stock: i64,
    pub stand_id: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    pub picture: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100))]
    pub product_type: Option<String>,
    #[validate(range(min = 0))]
    pub jetons_requis: Option<i64>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
}

// ---------------------------------------------------------------- Jetons & paiements

#[derive(Debug, Deserialize, Validate)]
pub struct JetonRequest {
    #[validate(range(min = 1))]
    pub nb_jetons: i64,
    pub price: Decimal,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateJetonRequest {
    #[validate(range(min = 1))]
    pub nb_jetons: Option<i64>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    #[serde(rename = "type")]
    pub kind: String, // 'jetons', 'tombola'
    #[validate(range(min = 1))]
    pub quantity: i64,
    pub price: Decimal,
}
