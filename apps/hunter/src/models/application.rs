use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    ReadyToApply,
    ToReview,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::ReadyToApply => "ready_to_apply",
            ApplicationStatus::ToReview => "to_review",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ready_to_apply" => Some(ApplicationStatus::ReadyToApply),
            "to_review" => Some(ApplicationStatus::ToReview),
            _ => None,
        }
    }
}

/// One entry of the application ledger. Append-only: never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    pub recorded_at: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub match_score: u32,
    pub application_url: String,
    pub run_id: Uuid,
    /// Where the generated cover letter was saved, for `ReadyToApply` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

/// Row shape of the `applications` table.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: String,
    pub title: String,
    pub company: String,
    pub recorded_at: DateTime<Utc>,
    pub status: String,
    pub match_score: i32,
    pub application_url: String,
    pub run_id: Uuid,
    pub cover_letter: Option<String>,
}

impl ApplicationRow {
    /// Converts a row back into a record. Rows with an unknown status are rejected.
    pub fn into_record(self) -> Option<ApplicationRecord> {
        Some(ApplicationRecord {
            status: ApplicationStatus::parse(&self.status)?,
            id: self.id,
            title: self.title,
            company: self.company,
            recorded_at: self.recorded_at,
            match_score: self.match_score.max(0) as u32,
            application_url: self.application_url,
            run_id: self.run_id,
            cover_letter: self.cover_letter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_is_snake_case() {
        let json = serde_json::to_string(&ApplicationStatus::ReadyToApply).unwrap();
        assert_eq!(json, r#""ready_to_apply""#);
        let status: ApplicationStatus = serde_json::from_str(r#""to_review""#).unwrap();
        assert_eq!(status, ApplicationStatus::ToReview);
    }

    #[test]
    fn test_status_parse_matches_as_str() {
        for status in [ApplicationStatus::ReadyToApply, ApplicationStatus::ToReview] {
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse("applied"), None);
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        let row = ApplicationRow {
            id: "1".to_string(),
            title: "Head of Growth".to_string(),
            company: "Acme".to_string(),
            recorded_at: Utc::now(),
            status: "submitted".to_string(),
            match_score: 4,
            application_url: "https://example.com/jobs/1".to_string(),
            run_id: Uuid::new_v4(),
            cover_letter: None,
        };
        assert!(row.into_record().is_none());
    }
}
