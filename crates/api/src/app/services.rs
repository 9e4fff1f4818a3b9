use std::sync::Arc;

use chrono::Duration;

use corebank_auth::{
    Argon2Hasher, Hs256TokenCodec, NewUser, RevocationSet, TokenIssuer, TokenValidator,
    UserRegistry,
};
use corebank_fraud::{FraudScorer, HttpFraudScorer, NeutralScorer};
use corebank_ledger::{AccountStore, LedgerEngine, TransactionLog};

/// Runtime configuration, assembled in `main` (or directly by tests).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// `POST`ed transaction summaries go here; `None` disables remote scoring.
    pub fraud_endpoint: Option<String>,
    /// Admin principal seeded at startup, if any.
    pub bootstrap_admin: Option<NewUser>,
}

impl AppConfig {
    /// Read configuration from the environment. Defaults are dev-safe and
    /// the insecure ones are called out in the logs.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let bootstrap_admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD"))
        {
            (Ok(email), Ok(password)) => Some(NewUser {
                email,
                password,
                first_name: "System".to_string(),
                last_name: "Admin".to_string(),
                phone_number: std::env::var("ADMIN_PHONE")
                    .unwrap_or_else(|_| "+10000000000".to_string()),
            }),
            _ => None,
        };

        Self {
            jwt_secret,
            token_ttl: Duration::hours(1),
            fraud_endpoint: std::env::var("FRAUD_API_URL").ok(),
            bootstrap_admin,
        }
    }
}

/// Everything the handlers need, wired once at startup.
pub struct AppServices {
    pub users: Arc<UserRegistry>,
    pub tokens: Arc<Hs256TokenCodec>,
    pub revocations: Arc<RevocationSet>,
    pub accounts: Arc<AccountStore>,
    pub log: Arc<TransactionLog>,
    pub engine: LedgerEngine,
    pub fraud: Arc<dyn FraudScorer>,
}

impl AppServices {
    pub fn token_validator(&self) -> Arc<dyn TokenValidator> {
        self.tokens.clone()
    }

    pub fn token_issuer(&self) -> &dyn TokenIssuer {
        self.tokens.as_ref()
    }
}

pub fn build_services(config: AppConfig) -> AppServices {
    let hasher = Arc::new(Argon2Hasher);
    let users = Arc::new(UserRegistry::new(hasher));

    if let Some(admin) = config.bootstrap_admin {
        match users.register_admin(admin) {
            Ok(user) => tracing::info!("bootstrap admin registered: {}", user.email),
            Err(e) => tracing::warn!("bootstrap admin not registered: {e}"),
        }
    }

    let tokens = Arc::new(Hs256TokenCodec::new(
        config.jwt_secret.as_bytes(),
        config.token_ttl,
    ));
    let revocations = Arc::new(RevocationSet::new());

    let accounts = Arc::new(AccountStore::new());
    let log = Arc::new(TransactionLog::new());
    let engine = LedgerEngine::new(accounts.clone(), log.clone());

    let fraud: Arc<dyn FraudScorer> = match config.fraud_endpoint {
        Some(endpoint) => match HttpFraudScorer::new(endpoint.clone()) {
            Ok(scorer) => {
                tracing::info!("fraud scorer endpoint: {endpoint}");
                Arc::new(scorer)
            }
            Err(e) => {
                tracing::warn!("fraud scorer client unavailable ({e}); using neutral verdicts");
                Arc::new(NeutralScorer)
            }
        },
        None => Arc::new(NeutralScorer),
    };

    AppServices {
        users,
        tokens,
        revocations,
        accounts,
        log,
        engine,
        fraud,
    }
}
