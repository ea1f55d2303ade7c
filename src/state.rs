use std::sync::Arc;

use anyhow::Context;

use crate::auth::service::AuthService;
use crate::auth::store::CredentialStore;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Load config, open the store and apply migrations.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env());
        let store = CredentialStore::connect(&config.database_url).await?;
        sqlx::migrate!("./migrations")
            .run(store.pool())
            .await
            .context("run database migrations")?;
        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: CredentialStore, config: Arc<AppConfig>) -> Self {
        Self {
            auth: AuthService::new(store),
            config,
        }
    }
}
