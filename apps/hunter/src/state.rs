use std::sync::Arc;

use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tracing::info;

use crate::config::{Config, LedgerBackend, S3Config};
use crate::db::create_pool;
use crate::errors::AppError;
use crate::ledger::{ApplicationLedger, JsonlLedger, MemoryLedger, PgLedger};
use crate::letters::{FsLetterStore, LetterStore, S3LetterStore, TemplateLetterGenerator};
use crate::listings::transport::HttpTransport;
use crate::listings::ListingsClient;
use crate::pipeline::dispatch::Dispatcher;
use crate::pipeline::hunter::JobHunter;
use crate::pipeline::ranking::Ranker;
use crate::pipeline::rules::RuleTable;
use crate::resume::ResumeAnalyzer;

/// Long-lived collaborators shared by the CLI commands.
pub struct AppState {
    pub config: Config,
    pub ledger: Arc<dyn ApplicationLedger>,
}

impl AppState {
    /// Opens the configured ledger backend.
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let ledger = open_ledger(&config.ledger).await?;
        Ok(Self { config, ledger })
    }

    /// Wires the fetch, ranking and dispatch stages for a hunt cycle.
    pub async fn job_hunter(&self) -> Result<JobHunter, AppError> {
        let config = &self.config;

        let transport = HttpTransport::new(config.fetch.http_timeout, config.fetch.api_token.clone())
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;
        let client = ListingsClient::new(Arc::new(transport), config.fetch.clone());
        info!(
            "Listings client ready ({} at {})",
            config.fetch.source, config.fetch.search_url
        );

        let mut ranker = Ranker::new(RuleTable::match_score(&config.criteria.target_industries));
        if config.resume_weight > 0.0 {
            if let Some(analyzer) = ResumeAnalyzer::load_optional(&config.resume_path) {
                ranker = ranker.with_resume(Arc::new(analyzer), config.resume_weight);
            }
        }

        let store: Arc<dyn LetterStore> = match &config.letters.s3 {
            Some(s3) => {
                let client = build_s3_client(s3).await;
                info!("Cover letters go to s3://{}", s3.bucket);
                Arc::new(S3LetterStore::new(client, s3.bucket.clone()))
            }
            None => {
                info!("Cover letters go to {}", config.letters.dir.display());
                Arc::new(FsLetterStore::new(config.letters.dir.clone()))
            }
        };

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.ledger),
            Arc::new(TemplateLetterGenerator),
            store,
        );

        Ok(JobHunter::new(
            client,
            ranker,
            dispatcher,
            Arc::clone(&self.ledger),
            config.criteria.clone(),
            config.batch_mode,
        ))
    }
}

async fn open_ledger(backend: &LedgerBackend) -> Result<Arc<dyn ApplicationLedger>, AppError> {
    let ledger: Arc<dyn ApplicationLedger> = match backend {
        LedgerBackend::Memory => {
            info!("Using in-memory application ledger");
            Arc::new(MemoryLedger::new())
        }
        LedgerBackend::File(path) => {
            let ledger = JsonlLedger::new(path.clone());
            info!("Using application ledger at {}", ledger.path().display());
            Arc::new(ledger)
        }
        LedgerBackend::Postgres { database_url } => {
            let pool = create_pool(database_url).await?;
            Arc::new(PgLedger::connect(pool).await?)
        }
    };
    Ok(ledger)
}

/// Constructs an S3 client for MinIO (custom endpoint) or AWS.
///
/// Explicit keys win; otherwise the default AWS credential chain applies.
async fn build_s3_client(s3: &S3Config) -> aws_sdk_s3::Client {
    let mut loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(Region::new("us-east-1"));

    if let (Some(key_id), Some(secret)) = (&s3.access_key_id, &s3.secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret,
            None,
            None,
            "hunter-static",
        ));
    }
    if let Some(endpoint) = &s3.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(s3.endpoint.is_some())
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
