use actix_web::{get, post, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::PaymentRequest;
use crate::services::ledger_service::{LedgerService, PaymentKind, PaymentOrder};
use crate::services::payment_gateway::PaymentGateway;
use crate::services::user_service::UserService;

/// Clé d'idempotence optionnelle du client (en-tête `Idempotency-Key`, un UUID).
/// Préfixée par l'utilisateur pour qu'une clé ne désigne jamais le paiement d'un autre.
fn idempotency_key(req: &HttpRequest, user_id: i32) -> Result<Option<String>, AppError> {
    let Some(value) = req.headers().get("Idempotency-Key") else {
        return Ok(None);
    };
    let key = value
        .to_str()
        .ok()
        .and_then(|v| uuid::Uuid::parse_str(v.trim()).ok())
        .ok_or_else(|| AppError::Validation("Idempotency-Key must be a UUID".into()))?;
    Ok(Some(format!("{}:{}", user_id, key)))
}

/// POST /payment - Payer des jetons ou un ticket de tombola (CONNECTÉ)
#[post("/payment")]
pub async fn create_payment(
    req: HttpRequest,
    auth_user: AuthUser,
    body: web::Json<PaymentRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    gateway: web::Data<dyn PaymentGateway>,
) -> Result<HttpResponse, AppError> {
    let kind = PaymentKind::parse(&body.kind)?;
    body.validate()?;
    let idempotency_key = idempotency_key(&req, auth_user.user_id)?;

    let order = PaymentOrder {
        user_id: auth_user.user_id,
        kind,
        quantity: body.quantity,
        price: body.price,
        idempotency_key,
    };
    let outcome =
        LedgerService::record_payment(db.get_ref(), gateway.get_ref(), &config.payment.currency, order).await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// GET /transactions - Paiements de l'utilisateur connecté
#[get("/transactions")]
pub async fn list_transactions(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let transactions = UserService::transactions(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "transactions": transactions })))
}

/// GET /history - Dépenses de jetons de l'utilisateur connecté
#[get("/history")]
pub async fn list_history(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let history = UserService::history(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "history": history })))
}

pub fn payments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_payment)
        .service(list_transactions)
        .service(list_history);
}
