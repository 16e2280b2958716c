use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::role::Role;
use crate::models::users::Entity as Users;
use crate::utils::jwt;

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
}

/// Extrait le token d'un header "Bearer <token>"
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Implémentation de FromRequest pour AuthUser
/// Le token est vérifié puis l'utilisateur est rechargé depuis la base,
/// pour que le rôle utilisé soit toujours celui stocké actuellement
impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();
        let config = req.app_data::<web::Data<AppConfig>>().cloned();

        // 1. Extraire le header Authorization
        let header = req
            .headers()
            .get("Authorization")
            .map(|h| h.to_str().map(str::to_owned));

        Box::pin(async move {
            let (db, config) = match (db, config) {
                (Some(db), Some(config)) => (db, config),
                _ => return Err(AppError::Internal("Application state not configured".into())),
            };

            let header = match header {
                None => return Err(AppError::Unauthorized("Missing Authorization header".into())),
                Some(Err(_)) => return Err(AppError::Unauthorized("Invalid Authorization header".into())),
                Some(Ok(h)) => h,
            };

            // 2. Extraire le token (format: "Bearer <token>")
            let token = bearer_token(&header).ok_or_else(|| {
                AppError::Unauthorized("Invalid Authorization format (expected: Bearer <token>)".into())
            })?;

            // 3. Vérifier le token JWT
            let claims = jwt::verify_token(token, &config.jwt_secret).map_err(AppError::Unauthorized)?;

            // 4. Charger l'utilisateur courant
            let user = Users::find_by_id(claims.sub)
                .one(db.get_ref())
                .await?
                .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

            let role = Role::try_from(user.role).map_err(AppError::Internal)?;

            Ok(AuthUser {
                user_id: user.id,
                email: user.email,
                role,
            })
        })
    }
}
