//! Resume analyzer: keyword overlap between the candidate's resume and a job description.

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

/// Skill catalog, grouped the way the resume is written.
const TECHNICAL_SKILLS: &[&str] = &["web3", "blockchain", "seo", "sem", "analytics"];
const MARKETING_SKILLS: &[&str] = &["gtm", "growth marketing", "content marketing", "b2b marketing"];
const LEADERSHIP_SKILLS: &[&str] = &["team management", "strategy", "business development"];

/// Scores how well a job description matches the candidate, 0.0 to 1.0.
pub trait MatchScorer: Send + Sync {
    fn score_match(&self, description: &str) -> f32;
}

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("Resume not found at {0}")]
    NotFound(String),

    #[error("Failed to read resume: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone)]
pub struct ResumeAnalyzer {
    skills: Vec<String>,
}

impl ResumeAnalyzer {
    /// Loads the resume at `path` (PDF, or any text format) and keeps the catalog
    /// skills it mentions.
    pub fn from_path(path: &Path) -> Result<Self, ResumeError> {
        if !path.exists() {
            return Err(ResumeError::NotFound(path.display().to_string()));
        }

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        let text = if is_pdf {
            pdf_extract::extract_text(path).map_err(|e| ResumeError::Pdf(e.to_string()))?
        } else {
            std::fs::read_to_string(path)?
        };

        let analyzer = Self::from_text(&text);
        info!(
            "Resume analyzer loaded {} skills from {}: {}",
            analyzer.skills().len(),
            path.display(),
            analyzer.skills().join(", ")
        );
        Ok(analyzer)
    }

    /// Loads the resume, logging and returning `None` when it is unusable.
    pub fn load_optional(path: &Path) -> Option<Self> {
        match Self::from_path(path) {
            Ok(analyzer) => Some(analyzer),
            Err(e) => {
                warn!("Resume matching disabled: {e}");
                None
            }
        }
    }

    /// Keeps the catalog skills present in `text`; falls back to the whole
    /// catalog when the resume mentions none of them.
    pub fn from_text(text: &str) -> Self {
        let text = text.to_lowercase();
        let catalog = TECHNICAL_SKILLS
            .iter()
            .chain(MARKETING_SKILLS)
            .chain(LEADERSHIP_SKILLS);

        let mentioned: Vec<String> = catalog
            .clone()
            .filter(|skill| text.contains(*skill))
            .map(|s| s.to_string())
            .collect();

        let skills = if mentioned.is_empty() {
            catalog.map(|s| s.to_string()).collect()
        } else {
            mentioned
        };
        Self { skills }
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }
}

impl MatchScorer for ResumeAnalyzer {
    fn score_match(&self, description: &str) -> f32 {
        if self.skills.is_empty() {
            return 0.0;
        }
        let description = description.to_lowercase();
        let hits = self
            .skills
            .iter()
            .filter(|skill| description.contains(skill.as_str()))
            .count();
        hits as f32 / self.skills.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_text_keeps_mentioned_skills() {
        let analyzer = ResumeAnalyzer::from_text("Growth Marketing lead. SEO, Web3, Strategy.");
        assert_eq!(
            analyzer.skills(),
            &["web3", "seo", "growth marketing", "strategy"]
        );
    }

    #[test]
    fn test_unrelated_resume_falls_back_to_catalog() {
        let analyzer = ResumeAnalyzer::from_text("Pastry chef");
        assert_eq!(analyzer.skills().len(), 12);
    }

    #[test]
    fn test_score_match_is_fraction_of_skills() {
        let analyzer = ResumeAnalyzer::from_text("web3 seo strategy growth marketing");
        let score = analyzer.score_match("We need Web3 and SEO chops");
        assert!((score - 0.5).abs() < f32::EPSILON, "score was {score}");
        assert_eq!(analyzer.score_match(""), 0.0);
    }

    #[test]
    fn test_score_match_is_bounded() {
        let analyzer = ResumeAnalyzer::from_text("web3");
        assert_eq!(analyzer.score_match("web3 web3 web3"), 1.0);
    }

    #[test]
    fn test_text_resume_loads_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        writeln!(file, "Head of Web3 Marketing. Business Development.").unwrap();

        let analyzer = ResumeAnalyzer::from_path(file.path()).unwrap();
        assert_eq!(analyzer.skills(), &["web3", "business development"]);
    }

    #[test]
    fn test_missing_resume_is_not_found() {
        let err = ResumeAnalyzer::from_path(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, ResumeError::NotFound(_)));
        assert!(ResumeAnalyzer::load_optional(Path::new("/definitely/not/here.pdf")).is_none());
    }
}
