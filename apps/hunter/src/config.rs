use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use thiserror::Error;

use crate::listings::backoff::BackoffPolicy;
use crate::models::listing::ListingSource;

const DEFAULT_LOCATIONS: &[&str] = &["Austin, TX", "Remote"];
const DEFAULT_KEYWORDS: &[&str] = &[
    "Marketing Director",
    "Head of Marketing",
    "VP Marketing",
    "Growth Marketing",
    "Web3 Marketing",
];
const DEFAULT_EXCLUDE_TERMS: &[&str] = &["junior", "associate", "coordinator", "entry level", "intern"];
const DEFAULT_TARGET_INDUSTRIES: &[&str] = &["fintech", "cybersecurity", "saas", "developer tools"];
const DEFAULT_SEARCH_URL: &str = "https://api.linkedin.com/v1/job-search";
/// Upper bound on the resume bonus weight; keyword scores stay in single digits.
const MAX_RESUME_WEIGHT: f32 = 100.0;

/// Application configuration, loaded once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub criteria: SearchCriteria,
    pub fetch: FetchConfig,
    pub ledger: LedgerBackend,
    pub letters: LetterConfig,
    pub batch_mode: BatchMode,
    pub resume_path: PathBuf,
    /// Weight of the resume match fraction added to the keyword score. 0 disables it.
    pub resume_weight: f32,
    pub rust_log: String,
}

/// What to look for and how much to act on per day.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub keywords: Vec<String>,
    pub locations: Vec<String>,
    pub exclude_terms: Vec<String>,
    pub target_industries: Vec<String>,
    pub max_applications_per_day: usize,
    pub auto_apply: bool,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            keywords: to_strings(DEFAULT_KEYWORDS),
            locations: to_strings(DEFAULT_LOCATIONS),
            exclude_terms: to_strings(DEFAULT_EXCLUDE_TERMS),
            target_industries: to_strings(DEFAULT_TARGET_INDUSTRIES),
            max_applications_per_day: 20,
            auto_apply: true,
        }
    }
}

/// Listing source and fetch behavior.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub source: ListingSource,
    pub search_url: String,
    /// Base url for description lookups (`<detail_url>/<id>`). Falls back to the listing url.
    pub detail_url: Option<String>,
    pub api_token: Option<String>,
    pub recency_window_secs: u64,
    pub remote_filter: bool,
    pub pages_per_search: u32,
    pub fetch_descriptions: bool,
    pub description_delay: Duration,
    pub backoff: BackoffPolicy,
    pub http_timeout: Duration,
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            source: ListingSource::LinkedIn,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            detail_url: None,
            api_token: None,
            recency_window_secs: 86_400,
            remote_filter: true,
            pages_per_search: 1,
            fetch_descriptions: true,
            description_delay: Duration::from_millis(1000),
            backoff: BackoffPolicy::default(),
            http_timeout: Duration::from_secs(30),
            concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerBackend {
    Memory,
    File(PathBuf),
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetterConfig {
    pub dir: PathBuf,
    pub s3: Option<S3Config>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown batch mode '{0}' (expected all or per_location)")]
pub struct UnknownBatchMode(pub String);

/// Whether filter/rank/dispatch run once over every search, or once per location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    All,
    PerLocation,
}

impl FromStr for BatchMode {
    type Err = UnknownBatchMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(BatchMode::All),
            "per_location" | "per-location" => Ok(BatchMode::PerLocation),
            other => Err(UnknownBatchMode(other.to_string())),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let criteria = SearchCriteria {
            keywords: env.list("HUNT_KEYWORDS", DEFAULT_KEYWORDS),
            locations: env.list("HUNT_LOCATIONS", DEFAULT_LOCATIONS),
            exclude_terms: env.list("HUNT_EXCLUDE_TERMS", DEFAULT_EXCLUDE_TERMS),
            target_industries: env.list("HUNT_TARGET_INDUSTRIES", DEFAULT_TARGET_INDUSTRIES),
            max_applications_per_day: env.parse("MAX_APPLICATIONS_PER_DAY", 20)?,
            auto_apply: env.flag("AUTO_APPLY", true)?,
        };
        if criteria.keywords.is_empty() || criteria.locations.is_empty() {
            bail!("HUNT_KEYWORDS and HUNT_LOCATIONS must each name at least one entry");
        }

        let backoff = BackoffPolicy::new(
            Duration::from_secs(env.parse("BACKOFF_BASE_SECS", 30)?),
            env.parse("BACKOFF_MULTIPLIER", 2.0)?,
            Duration::from_secs(env.parse("BACKOFF_MAX_SECS", 120)?),
            env.parse("FETCH_MAX_ATTEMPTS", 3)?,
        )
        .context("Invalid backoff configuration")?;

        let fetch = FetchConfig {
            source: env.parse("LISTINGS_SOURCE", ListingSource::LinkedIn)?,
            search_url: env.string("LISTINGS_SEARCH_URL", DEFAULT_SEARCH_URL),
            detail_url: env.optional("LISTINGS_DETAIL_URL"),
            api_token: env.optional("LISTINGS_API_TOKEN"),
            recency_window_secs: env.parse("RECENCY_WINDOW_SECS", 86_400)?,
            remote_filter: env.flag("REMOTE_FILTER", true)?,
            pages_per_search: env.parse::<u32>("SEARCH_PAGES", 1)?.max(1),
            fetch_descriptions: env.flag("FETCH_DESCRIPTIONS", true)?,
            description_delay: Duration::from_millis(env.parse("DESCRIPTION_DELAY_MS", 1000)?),
            backoff,
            http_timeout: Duration::from_secs(env.parse("HTTP_TIMEOUT_SECS", 30)?),
            concurrency: env.parse::<usize>("FETCH_CONCURRENCY", 1)?.max(1),
        };

        let ledger = match env.string("LEDGER_BACKEND", "file").to_ascii_lowercase().as_str() {
            "memory" => LedgerBackend::Memory,
            "file" => LedgerBackend::File(PathBuf::from(
                env.string("LEDGER_PATH", "data/applications.jsonl"),
            )),
            "postgres" => LedgerBackend::Postgres {
                database_url: env.required("DATABASE_URL")?,
            },
            other => bail!("LEDGER_BACKEND must be memory, file or postgres (got '{other}')"),
        };

        let letters = LetterConfig {
            dir: PathBuf::from(env.string("LETTERS_DIR", "data/cover_letters")),
            s3: env.optional("S3_BUCKET").map(|bucket| S3Config {
                bucket,
                endpoint: env.optional("S3_ENDPOINT"),
                access_key_id: env.optional("AWS_ACCESS_KEY_ID"),
                secret_access_key: env.optional("AWS_SECRET_ACCESS_KEY"),
            }),
        };

        let resume_weight: f32 = env.parse("RESUME_WEIGHT", 0.0)?;
        if !resume_weight.is_finite() || !(0.0..=MAX_RESUME_WEIGHT).contains(&resume_weight) {
            bail!("RESUME_WEIGHT must be between 0 and {MAX_RESUME_WEIGHT} (got {resume_weight})");
        }

        Ok(Config {
            criteria,
            fetch,
            ledger,
            letters,
            batch_mode: env.parse("BATCH_MODE", BatchMode::All)?,
            resume_path: PathBuf::from(env.string("RESUME_PATH", "data/resume.pdf")),
            resume_weight,
            rust_log: env.string("RUST_LOG", "info"),
        })
    }
}

/// Thin typed accessors over a key lookup.
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key)
            .with_context(|| format!("Required environment variable '{key}' is not set"))
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse::<T>()
                .map_err(|e| anyhow!("{key} has invalid value '{raw}': {e}")),
            None => Ok(default),
        }
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool> {
        match self.optional(key).map(|v| v.to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) => match v.as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => bail!("{key} must be a boolean (got '{v}')"),
            },
        }
    }

    /// `;`-separated list; an unset variable yields the defaults.
    fn list(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.optional(key) {
            Some(raw) => raw
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => to_strings(default),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_cover_the_marketing_search_profile() {
        let config = load(&[]).unwrap();
        assert_eq!(config.criteria.locations, vec!["Austin, TX", "Remote"]);
        assert_eq!(config.criteria.keywords.len(), 5);
        assert_eq!(config.criteria.max_applications_per_day, 20);
        assert!(config.criteria.auto_apply);
        assert_eq!(config.batch_mode, BatchMode::All);
        assert_eq!(
            config.ledger,
            LedgerBackend::File(PathBuf::from("data/applications.jsonl"))
        );
        assert_eq!(config.fetch.backoff, BackoffPolicy::default());
        assert!(config.letters.s3.is_none());
        assert_eq!(config.resume_weight, 0.0);
    }

    #[test]
    fn test_lists_split_on_semicolons() {
        let config = load(&[("HUNT_LOCATIONS", "Austin, TX; New York, NY ;")]).unwrap();
        assert_eq!(config.criteria.locations, vec!["Austin, TX", "New York, NY"]);
    }

    #[test]
    fn test_flags_and_numbers_parse() {
        let config = load(&[
            ("AUTO_APPLY", "no"),
            ("MAX_APPLICATIONS_PER_DAY", "5"),
            ("FETCH_CONCURRENCY", "4"),
            ("BATCH_MODE", "per_location"),
            ("LEDGER_BACKEND", "memory"),
        ])
        .unwrap();
        assert!(!config.criteria.auto_apply);
        assert_eq!(config.criteria.max_applications_per_day, 5);
        assert_eq!(config.fetch.concurrency, 4);
        assert_eq!(config.batch_mode, BatchMode::PerLocation);
        assert_eq!(config.ledger, LedgerBackend::Memory);
    }

    #[test]
    fn test_invalid_number_names_the_variable() {
        let err = load(&[("MAX_APPLICATIONS_PER_DAY", "lots")]).unwrap_err();
        assert!(err.to_string().contains("MAX_APPLICATIONS_PER_DAY"));
    }

    #[test]
    fn test_invalid_boolean_is_rejected() {
        assert!(load(&[("AUTO_APPLY", "maybe")]).is_err());
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        assert!(load(&[("LEDGER_BACKEND", "postgres")]).is_err());
        let config = load(&[
            ("LEDGER_BACKEND", "postgres"),
            ("DATABASE_URL", "postgres://localhost/hunter"),
        ])
        .unwrap();
        assert!(matches!(config.ledger, LedgerBackend::Postgres { .. }));
    }

    #[test]
    fn test_backoff_ceiling_below_base_is_rejected() {
        let err = load(&[("BACKOFF_BASE_SECS", "60"), ("BACKOFF_MAX_SECS", "30")]).unwrap_err();
        assert!(format!("{err:#}").contains("backoff"));
    }

    #[test]
    fn test_s3_bucket_enables_s3_letters() {
        let config = load(&[("S3_BUCKET", "letters"), ("S3_ENDPOINT", "http://localhost:9000")])
            .unwrap();
        let s3 = config.letters.s3.unwrap();
        assert_eq!(s3.bucket, "letters");
        assert_eq!(s3.endpoint.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn test_resume_weight_is_bounded() {
        assert_eq!(load(&[("RESUME_WEIGHT", "2.5")]).unwrap().resume_weight, 2.5);
        assert!(load(&[("RESUME_WEIGHT", "-1")]).is_err());
        let err = load(&[("RESUME_WEIGHT", "1e12")]).unwrap_err();
        assert!(err.to_string().contains("RESUME_WEIGHT"));
    }

    #[test]
    fn test_unknown_enum_values_are_typed_errors() {
        assert_eq!(
            "hourly".parse::<BatchMode>(),
            Err(UnknownBatchMode("hourly".to_string()))
        );
        let err = load(&[("LISTINGS_SOURCE", "monster")]).unwrap_err();
        assert!(err.to_string().contains("unknown listings source 'monster'"));
    }

    #[test]
    fn test_empty_keyword_list_is_rejected() {
        assert!(load(&[("HUNT_KEYWORDS", " ; ")]).is_err());
    }
}
