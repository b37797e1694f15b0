use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Listing as delivered by the source, before normalization.
///
/// Every field is optional: the source is free to omit anything, and the
/// normalizer decides what is recoverable. `id` and `company` stay as raw JSON
/// because sources disagree on their shape (numeric ids, nested company objects).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawListing {
    /// Opaque id as a string, accepting string or numeric ids.
    pub fn id_text(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Company name from either `"company": "Acme"` or `"company": {"name": "Acme"}`.
    pub fn company_name(&self) -> Option<String> {
        match self.company.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("name").and_then(|v| v.as_str()).map(String::from),
            _ => None,
        }
    }

    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown listings source '{0}'")]
pub struct UnknownSource(pub String);

/// Where a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingSource {
    LinkedIn,
    Indeed,
}

impl fmt::Display for ListingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingSource::LinkedIn => write!(f, "LinkedIn"),
            ListingSource::Indeed => write!(f, "Indeed"),
        }
    }
}

impl FromStr for ListingSource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Ok(ListingSource::LinkedIn),
            "indeed" => Ok(ListingSource::Indeed),
            other => Err(UnknownSource(other.to_string())),
        }
    }
}

/// Canonical listing shape shared by the filter, ranking and dispatch stages.
///
/// `id` is best-effort unique: stable across repeated fetches of the same
/// listing, but two sources could collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub source: ListingSource,
}

/// A listing with its match score. Built once by the ranking stage.
#[derive(Debug, Clone, Serialize)]
pub struct RankedListing {
    pub listing: ListingRecord,
    pub match_score: u32,
    /// Resume match fraction (0.0 to 1.0) when a resume analyzer contributed.
    pub resume_match: Option<f32>,
}
