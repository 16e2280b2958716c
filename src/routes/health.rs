use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::models::health::HealthResponse;

/// GET /health - Sonde de vie : le serveur répond même si la base est injoignable
#[get("/health")]
pub async fn health_check(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let database = match db.execute_unprepared("SELECT 1").await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            "unreachable"
        }
    };

    let response = HealthResponse {
        status: "ok".to_string(),
        database: database.to_string(),
        time: Utc::now(),
    };

    HttpResponse::Ok().json(response)
}
