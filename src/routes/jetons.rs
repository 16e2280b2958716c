use actix_web::{delete, get, post, put, web, HttpResponse};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{JetonRequest, UpdateJetonRequest};
use crate::models::jeton;
use crate::services::policy::{self, Action};

fn ensure_positive_price(price: Decimal) -> Result<(), AppError> {
    if price > Decimal::ZERO {
        Ok(())
    } else {
        Err(AppError::Validation("price must be greater than 0".into()))
    }
}

/// POST /create-jeton - Ajouter un paquet de jetons au catalogue (ADMIN)
#[post("/create-jeton")]
pub async fn create_jeton(
    auth_user: AuthUser,
    body: web::Json<JetonRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::ManageJetons, false)?;
    body.validate()?;
    ensure_positive_price(body.price)?;

    let new_jeton = jeton::ActiveModel {
        nb_jetons: Set(body.nb_jetons),
        price: Set(body.price),
        ..Default::default()
    };
    let jeton = new_jeton.insert(db.get_ref()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "jeton": jeton })))
}

/// GET /jetons - Catalogue des paquets de jetons (PUBLIC)
#[get("/jetons")]
pub async fn list_jetons(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let jetons = jeton::Entity::find()
        .order_by_asc(jeton::Column::Price)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "jetons": jetons })))
}

/// PUT /jetons/{id}/update - Modifier un paquet (ADMIN)
#[put("/jetons/{id}/update")]
pub async fn update_jeton(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateJetonRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::ManageJetons, false)?;
    body.validate()?;

    let jeton = jeton::Entity::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Jeton not found".into()))?;

    let mut active: jeton::ActiveModel = jeton.clone().into();
    if let Some(nb_jetons) = body.nb_jetons {
        active.nb_jetons = Set(nb_jetons);
    }
    if let Some(price) = body.price {
        ensure_positive_price(price)?;
        active.price = Set(price);
    }

    let jeton = if active.is_changed() {
        active.update(db.get_ref()).await?
    } else {
        jeton
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({ "jeton": jeton })))
}

/// DELETE /jetons/{id}/delete - Retirer un paquet du catalogue (ADMIN)
#[delete("/jetons/{id}/delete")]
pub async fn delete_jeton(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::ManageJetons, false)?;

    let result = jeton::Entity::delete_by_id(path.into_inner())
        .exec(db.get_ref())
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Jeton not found".into()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Jeton deleted successfully"
    })))
}

pub fn jetons_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_jeton)
        .service(list_jetons)
        .service(update_jeton)
        .service(delete_jeton);
}
