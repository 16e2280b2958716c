use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{BuyProductRequest, CreateStandRequest, GivePointsRequest, StandDetail, UpdateStandRequest};
use crate::models::{kermesse_stands, product, stand};
use crate::services::ledger_service::LedgerService;
use crate::services::policy::{self, Action};

pub async fn find_stand(db: &DatabaseConnection, stand_id: i32) -> Result<stand::Model, AppError> {
    stand::Entity::find_by_id(stand_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stand not found".into()))
}

/// POST /create-stand - Créer un stand (ADMIN / TENEUR DE STAND)
#[post("/create-stand")]
pub async fn create_stand(
    auth_user: AuthUser,
    body: web::Json<CreateStandRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::CreateStand, false)?;
    body.validate()?;
    let body = body.into_inner();

    let new_stand = stand::ActiveModel {
        name: Set(body.name),
        stand_type: Set(body.stand_type),
        jetons_requis: Set(body.jetons_requis),
        conso: Set(0),
        pts_donnes: Set(0),
        user_id: Set(auth_user.user_id),
        ..Default::default()
    };
    let stand = new_stand.insert(db.get_ref()).await?;

    tracing::info!(stand_id = stand.id, user_id = auth_user.user_id, "stand created");
    Ok(HttpResponse::Created().json(serde_json::json!({ "stand": stand })))
}

/// GET /stands - Lister les stands (ADMIN)
#[get("/stands")]
pub async fn list_stands(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::ListStands, false)?;

    let stands = stand::Entity::find()
        .order_by_asc(stand::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "stands": stands })))
}

/// GET /stands/{id} - Détail d'un stand avec ses produits (CONNECTÉ)
#[get("/stands/{id}")]
pub async fn get_stand(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let stand = find_stand(db.get_ref(), path.into_inner()).await?;
    let products = product::Entity::find()
        .filter(product::Column::StandId.eq(stand.id))
        .order_by_asc(product::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "stand": StandDetail { stand, products }
    })))
}

/// PUT /stands/{id}/update - Mise à jour partielle (ADMIN / TENEUR)
#[put("/stands/{id}/update")]
pub async fn update_stand(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateStandRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let body = body.into_inner();

    let stand = find_stand(db.get_ref(), path.into_inner()).await?;
    policy::check(&auth_user, Action::UpdateStand, stand.user_id == auth_user.user_id)?;

    let mut active: stand::ActiveModel = stand.clone().into();
    if let Some(name) = body.name {
        active.name = Set(name);
    }
    if let Some(stand_type) = body.stand_type {
        active.stand_type = Set(stand_type);
    }
    if let Some(jetons_requis) = body.jetons_requis {
        active.jetons_requis = Set(jetons_requis);
    }

    let stand = if active.is_changed() {
        active.update(db.get_ref()).await?
    } else {
        stand
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({ "stand": stand })))
}

/// DELETE /stands/{id}/delete - Supprimer un stand et ses produits (ADMIN / TENEUR)
#[delete("/stands/{id}/delete")]
pub async fn delete_stand(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let stand = find_stand(db.get_ref(), path.into_inner()).await?;
    policy::check(&auth_user, Action::DeleteStand, stand.user_id == auth_user.user_id)?;

    let txn = db.begin().await?;
    product::Entity::delete_many()
        .filter(product::Column::StandId.eq(stand.id))
        .exec(&txn)
        .await?;
    kermesse_stands::Entity::delete_many()
        .filter(kermesse_stands::Column::StandId.eq(stand.id))
        .exec(&txn)
        .await?;
    stand::Entity::delete_by_id(stand.id).exec(&txn).await?;
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Stand deleted successfully"
    })))
}

/// POST /stands/{id}/interact - Jouer / consommer sur un stand (CONNECTÉ)
#[post("/stands/{id}/interact")]
pub async fn interact(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let outcome = LedgerService::interact(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// POST /stands/{id}/products/{product_id}/buy - Acheter un produit (CONNECTÉ)
#[post("/stands/{id}/products/{product_id}/buy")]
pub async fn buy_product(
    auth_user: AuthUser,
    path: web::Path<(i32, i32)>,
    body: web::Json<BuyProductRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let (stand_id, product_id) = path.into_inner();

    let outcome =
        LedgerService::purchase(db.get_ref(), auth_user.user_id, stand_id, product_id, body.quantity).await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// POST /stands/{id}/users/{user_id}/points - Donner des points (TENEUR DU STAND)
#[post("/stands/{id}/users/{user_id}/points")]
pub async fn give_points(
    auth_user: AuthUser,
    path: web::Path<(i32, i32)>,
    body: web::Json<GivePointsRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let (stand_id, user_id) = path.into_inner();

    let stand = find_stand(db.get_ref(), stand_id).await?;
    policy::check(&auth_user, Action::GivePoints, stand.user_id == auth_user.user_id)?;
    body.validate()?;

    let outcome = LedgerService::give_points(db.get_ref(), &stand, user_id, body.points).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub fn stands_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_stand)
        .service(list_stands)
        .service(get_stand)
        .service(update_stand)
        .service(delete_stand)
        .service(interact)
        .service(buy_product)
        .service(give_points);
}
