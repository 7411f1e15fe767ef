use std::sync::Arc;

use crate::{
    config::{Config, StoreBackend, required},
    db::{ChangeFeed, MemoryStore, PgStore, RecordStore, RestStore},
    errors::AppError,
    mail::{Mailer, SmtpMailer},
};

pub type SharedStore = Arc<dyn RecordStore>;
pub type SharedMailer = Arc<dyn Mailer>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// `None` when no SMTP credentials are configured.
    pub mailer: Option<SharedMailer>,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            mailer: None,
        }
    }

    pub fn with_mailer(mut self, mailer: SharedMailer) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let store: SharedStore = match config.store {
            StoreBackend::Postgres => {
                let feed = ChangeFeed::connect(required(&config.redis_url, "REDIS_URL")?).await?;
                let database_url = required(&config.database_url, "DATABASE_URL")?;
                Arc::new(PgStore::connect(database_url, feed).await?)
            }
            StoreBackend::Rest => {
                let feed = ChangeFeed::connect(required(&config.redis_url, "REDIS_URL")?).await?;
                Arc::new(RestStore::new(
                    required(&config.supabase_url, "SUPABASE_URL")?,
                    required(&config.supabase_anon_key, "SUPABASE_ANON_KEY")?,
                    feed,
                )?)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory record store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let mailer: Option<SharedMailer> =
            match (&config.email_address, &config.email_password) {
                (Some(address), Some(password)) => Some(Arc::new(SmtpMailer::new(
                    &config.smtp_host,
                    config.smtp_port,
                    address,
                    password,
                )?)),
                _ => {
                    tracing::warn!("EMAIL_ADDRESS/EMAIL_PASSWORD not set; contact replies are disabled");
                    None
                }
            };

        tracing::info!("Record store backend: {:?}", config.store);
        Ok(Self { store, mailer })
    }
}
