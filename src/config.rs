// Configuration lue depuis l'environnement (.env chargé dans main)
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub stripe_secret_key: Option<String>,
    pub api_base: String,
    pub currency: String,
}

const DEFAULT_JWT_SECRET: &str = "default-insecure-key-change-this";

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la config à partir d'une fonction de lecture des variables,
    /// ce qui permet de tester sans toucher à l'environnement du process
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| "DATABASE_URL must be set in .env file".to_string())?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not found in .env, using default (INSECURE)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let port = match lookup("PORT") {
            Some(p) => p.parse::<u16>().map_err(|_| format!("Invalid PORT: {}", p))?,
            None => 8080,
        };

        let token_ttl_hours = match lookup("TOKEN_TTL_HOURS") {
            Some(h) => h
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| format!("Invalid TOKEN_TTL_HOURS: {}", h))?,
            None => 24,
        };

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            jwt_secret,
            token_ttl_hours,
            payment: PaymentConfig {
                stripe_secret_key: lookup("STRIPE_SECRET_KEY").filter(|k| !k.is_empty()),
                api_base: lookup("STRIPE_API_BASE")
                    .unwrap_or_else(|| "https://api.stripe.com".to_string()),
                currency: lookup("PAYMENT_CURRENCY").unwrap_or_else(|| "eur".to_string()),
            },
        })
    }

    /// Configuration utilisée par les tests
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/kermesse_test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 24,
            payment: PaymentConfig {
                stripe_secret_key: None,
                api_base: "http://localhost:12111".to_string(),
                currency: "eur".to_string(),
            },
        }
    }
}
