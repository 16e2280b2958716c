use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateProductRequest, UpdateProductRequest};
use crate::models::product;
use crate::routes::stands::find_stand;
use crate::services::policy::{self, Action};

async fn find_product(db: &DatabaseConnection, product_id: i32) -> Result<product::Model, AppError> {
    product::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

/// Le teneur du stand qui vend le produit en est propriétaire
async fn owns_stand(db: &DatabaseConnection, auth_user: &AuthUser, stand_id: i32) -> Result<bool, AppError> {
    let stand = find_stand(db, stand_id).await?;
    Ok(stand.user_id == auth_user.user_id)
}

/// POST /create-product - Ajouter un produit à un stand (ADMIN / TENEUR DU STAND)
#[post("/create-product")]
pub async fn create_product(
    auth_user: AuthUser,
    body: web::Json<CreateProductRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let body = body.into_inner();

    let is_owner = owns_stand(db.get_ref(), &auth_user, body.stand_id).await?;
    policy::check(&auth_user, Action::CreateProduct, is_owner)?;

    let new_product = product::ActiveModel {
        name: Set(body.name),
        picture: Set(body.picture),
        product_type: Set(body.product_type),
        jetons_requis: Set(body.jetons_requis),
        stock: Set(body.stock),
        stand_id: Set(body.stand_id),
        ..Default::default()
    };
    let product = new_product.insert(db.get_ref()).await?;

    tracing::info!(product_id = product.id, stand_id = product.stand_id, "product created");
    Ok(HttpResponse::Created().json(serde_json::json!({ "product": product })))
}

/// GET /products - Lister les produits (ADMIN)
#[get("/products")]
pub async fn list_products(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::ListProducts, false)?;

    let products = product::Entity::find()
        .order_by_asc(product::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "products": products })))
}

/// GET /products/{id} - Détail d'un produit (CONNECTÉ)
#[get("/products/{id}")]
pub async fn get_product(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let product = find_product(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "product": product })))
}

/// PUT /products/{id}/update - Mise à jour partielle (ADMIN / TENEUR DU STAND)
#[put("/products/{id}/update")]
pub async fn update_product(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateProductRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let body = body.into_inner();

    let product = find_product(db.get_ref(), path.into_inner()).await?;
    let is_owner = owns_stand(db.get_ref(), &auth_user, product.stand_id).await?;
    policy::check(&auth_user, Action::UpdateProduct, is_owner)?;

    let mut active: product::ActiveModel = product.clone().into();
    if let Some(name) = body.name {
        active.name = Set(name);
    }
    if let Some(picture) = body.picture.filter(|p| !p.is_empty()) {
        active.picture = Set(Some(picture));
    }
    if let Some(product_type) = body.product_type {
        active.product_type = Set(product_type);
    }
    if let Some(jetons_requis) = body.jetons_requis {
        active.jetons_requis = Set(jetons_requis);
    }
    if let Some(stock) = body.stock {
        active.stock = Set(stock);
    }

    let product = if active.is_changed() {
        active.update(db.get_ref()).await?
    } else {
        product
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({ "product": product })))
}

/// DELETE /products/{id}/delete - Supprimer un produit (ADMIN / TENEUR DU STAND)
#[delete("/products/{id}/delete")]
pub async fn delete_product(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let product = find_product(db.get_ref(), path.into_inner()).await?;
    let is_owner = owns_stand(db.get_ref(), &auth_user, product.stand_id).await?;
    policy::check(&auth_user, Action::DeleteProduct, is_owner)?;

    product::Entity::delete_by_id(product.id).exec(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Product deleted successfully"
    })))
}

pub fn products_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_product)
        .service(list_products)
        .service(get_product)
        .service(update_product)
        .service(delete_product);
}
