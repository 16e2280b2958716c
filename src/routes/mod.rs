pub mod auth;
pub mod health;
pub mod jetons;
pub mod kermesses;
pub mod payments;
pub mod products;
pub mod stands;
pub mod users;

use actix_web::web;

use crate::error::AppError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Corps JSON ou paramètres de chemin invalides : même format d'erreur que le reste de l'API
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    );

    cfg.service(health::health_check)
        .configure(auth::auth_routes)
        .configure(users::users_routes)
        .configure(kermesses::kermesses_routes)
        .configure(stands::stands_routes)
        .configure(products::products_routes)
        .configure(jetons::jetons_routes)
        .configure(payments::payments_routes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    use crate::config::AppConfig;
    use crate::models::{jeton, kermesse, kermesse_organizers, kermesse_participants, kermesse_stands, users};
    use crate::models::role::Role;
    use crate::services::payment_gateway::{fake::FakeGateway, PaymentGateway};
    use crate::utils::jwt;

    fn user(id: i32, role: Role) -> users::Model {
        users::Model {
            id,
            firstname: "Léa".to_string(),
            lastname: "Durand".to_string(),
            email: format!("user{}@ecole.fr", id),
            password_hash: "pbkdf2:sha256:1000$x$y".to_string(),
            picture: None,
            role: role.as_i32(),
            jetons: 10,
            pts_attribues: 0,
        }
    }

    fn bearer_for(user_id: i32) -> String {
        let config = AppConfig::for_tests();
        let token = jwt::generate_token(user_id, "user@ecole.fr", &config.jwt_secret, 1).unwrap();
        format!("Bearer {}", token)
    }

    macro_rules! app {
        ($db:expr) => {{
            let gateway: Arc<dyn PaymentGateway> = Arc::new(FakeGateway::ok());
            test::init_service(
                App::new()
                    .app_data(web::Data::new($db))
                    .app_data(web::Data::new(AppConfig::for_tests()))
                    .app_data(web::Data::from(gateway))
                    .configure(configure_routes),
            )
            .await
        }};
    }

    fn empty_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[actix_web::test]
    async fn test_protected_route_without_header_is_unauthorized() {
        let app = app!(empty_db());

        let req = test::TestRequest::get().uri("/profile").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[actix_web::test]
    async fn test_invalid_token_is_unauthorized() {
        let app = app!(empty_db());

        let req = test::TestRequest::post()
            .uri("/stands/1/interact")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_token_of_deleted_user_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::get()
            .uri("/transactions")
            .insert_header(("Authorization", bearer_for(42)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_jetons_catalog_is_public() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![jeton::Model {
                id: 1,
                nb_jetons: 10,
                price: Decimal::from(5),
            }]])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::get().uri("/jetons").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["jetons"][0]["nb_jetons"], 10);
    }

    #[actix_web::test]
    async fn test_student_cannot_create_stand() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(5, Role::Student)]])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/create-stand")
            .insert_header(("Authorization", bearer_for(5)))
            .set_json(serde_json::json!({
                "name": "Chamboule-tout",
                "type": "jeu",
                "jetons_requis": 3
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_signup_as_admin_is_forbidden() {
        let app = app!(empty_db());

        let req = test::TestRequest::post()
            .uri("/signup")
            .set_json(serde_json::json!({
                "first_name": "Eve",
                "last_name": "Malin",
                "email": "eve@ecole.fr",
                "password": "secret123",
                "role": 1
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_login_unknown_email_is_bad_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(serde_json::json!({ "email": "nobody@ecole.fr", "password": "whatever" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    #[actix_web::test]
    async fn test_body_with_missing_field_gets_json_error() {
        let app = app!(empty_db());

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(serde_json::json!({ "email": "a@b.fr" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["error"].as_str().unwrap().contains("password"));
    }

    #[actix_web::test]
    async fn test_non_numeric_path_id_gets_json_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(5, Role::Student)]])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::get()
            .uri("/stands/abc")
            .insert_header(("Authorization", bearer_for(5)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_created_kermesse_can_be_fetched_by_creator() {
        let created = kermesse::Model {
            id: 3,
            name: "Kermesse de printemps".to_string(),
            picture: Some("printemps.png".to_string()),
            user_id: 8,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(8, Role::Organizer)]])
            .append_query_results([vec![created.clone()]])
            .append_query_results([vec![user(8, Role::Organizer)]])
            .append_query_results([vec![created]])
            .append_query_results([Vec::<kermesse_organizers::Model>::new()])
            .append_query_results([Vec::<kermesse_participants::Model>::new()])
            .append_query_results([Vec::<kermesse_stands::Model>::new()])
            .into_connection();
        let log_handle = match &db {
            DatabaseConnection::MockDatabaseConnection(conn) => {
                DatabaseConnection::MockDatabaseConnection(conn.clone())
            }
            _ => unreachable!("mock connection expected"),
        };
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/create-kermesse")
            .insert_header(("Authorization", bearer_for(8)))
            .set_json(serde_json::json!({ "name": "Kermesse de printemps", "picture": "printemps.png" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        let id = body["kermesse"]["id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/kermesses/{}", id))
            .insert_header(("Authorization", bearer_for(8)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["kermesse"]["name"], "Kermesse de printemps");
        assert_eq!(body["kermesse"]["picture"], "printemps.png");
        assert_eq!(body["kermesse"]["user_id"], 8);
        assert_eq!(body["kermesse"]["organizers"].as_array().unwrap().len(), 0);

        // L'INSERT porte bien le nom et le créateur issus du jeton
        let log = format!("{:?}", log_handle.into_transaction_log());
        assert!(log.contains("INSERT INTO"));
        assert!(log.contains("Kermesse de printemps"));
    }

    #[actix_web::test]
    async fn test_profile_update_rejects_malformed_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(5, Role::Student)]])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::put()
            .uri("/profile/update")
            .insert_header(("Authorization", bearer_for(5)))
            .set_json(serde_json::json!({ "email": "not-an-email" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_payment_with_malformed_idempotency_key_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(5, Role::Student)]])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/payment")
            .insert_header(("Authorization", bearer_for(5)))
            .insert_header(("Idempotency-Key", "retry-1"))
            .set_json(serde_json::json!({ "type": "tombola", "quantity": 1, "price": "2.50" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unknown_payment_type_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(5, Role::Student)]])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/payment")
            .insert_header(("Authorization", bearer_for(5)))
            .set_json(serde_json::json!({ "type": "bitcoin", "quantity": 1, "price": "2.50" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
