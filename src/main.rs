use datifyy_admin::{
    api::{self, AppState},
    config::{DataSourceKind, database, settings},
    errors::Result,
    generator::MockDataGenerator,
    mail::{LogMailer, Mailer, MailerSendClient},
    source::{DateCurationSource, DbSource, MockSource, RevenueSource},
};
use chrono::Utc;
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let config = settings::load_from_env()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!(source = ?config.data.source, port = config.server.port, "Configuration loaded");

    // 4. Connect to the database; waitlist and verification codes always live here
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Pick the data source for the dashboards
    let now = Utc::now();
    let (revenue, dates): (Arc<dyn RevenueSource>, Arc<dyn DateCurationSource>) =
        match config.data.source {
            DataSourceKind::Mock => {
                let source = Arc::new(MockSource::generate(&config.data, now));
                (
                    Arc::clone(&source) as Arc<dyn RevenueSource>,
                    source as Arc<dyn DateCurationSource>,
                )
            }
            DataSourceKind::Database => {
                let source = DbSource::new(db.clone());
                if config.data.seed_database {
                    let mut generator = MockDataGenerator::new(config.data.seed, now);
                    let transactions = generator.transactions(config.data.mock_transactions);
                    let curated = generator.curated_dates(config.data.mock_dates);
                    source.seed_if_empty(&transactions, &curated).await?;
                }
                let source = Arc::new(source);
                (
                    Arc::clone(&source) as Arc<dyn RevenueSource>,
                    source as Arc<dyn DateCurationSource>,
                )
            }
        };

    // 6. Mail goes through MailerSend when a key is configured
    let mailer: Arc<dyn Mailer> = match env::var("MAILERSEND_API_KEY") {
        Ok(key) => Arc::new(
            MailerSendClient::new(key, config.mail.clone())
                .inspect_err(|e| error!("Failed to build mail client: {}", e))?,
        ),
        Err(_) => {
            warn!("MAILERSEND_API_KEY not set; verification emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    // 7. Serve until Ctrl-C
    let state = AppState {
        revenue,
        dates,
        db,
        mailer,
        config: Arc::new(config),
    };
    api::serve(state)
        .await
        .inspect_err(|e| error!("Server stopped with an error: {}", e))?;

    Ok(())
}
