use std::sync::Arc;

use tracing::debug;

use crate::models::listing::{ListingRecord, RankedListing};
use crate::pipeline::rules::{RuleTable, TextBag};
use crate::resume::MatchScorer;

/// Scores filtered listings and orders them best-first.
///
/// The keyword score is a pure function of the listing text. When a resume
/// scorer is attached with a positive weight, `round(weight * match)` is added.
pub struct Ranker {
    table: RuleTable,
    resume: Option<(Arc<dyn MatchScorer>, f32)>,
}

impl Ranker {
    pub fn new(table: RuleTable) -> Self {
        Self { table, resume: None }
    }

    pub fn with_resume(mut self, scorer: Arc<dyn MatchScorer>, weight: f32) -> Self {
        if weight > 0.0 {
            self.resume = Some((scorer, weight));
        }
        self
    }

    pub fn score(&self, listing: &ListingRecord) -> (u32, Option<f32>) {
        let bag = TextBag::from_listing(listing);
        let keyword_score = self.table.score(&bag);

        match &self.resume {
            Some((scorer, weight)) => {
                let fraction = scorer.score_match(&listing.description).clamp(0.0, 1.0);
                let bonus = (weight * fraction).round() as u32;
                (keyword_score.saturating_add(bonus), Some(fraction))
            }
            None => (keyword_score, None),
        }
    }

    /// Sorts descending by score. The sort is stable: equal scores keep input order.
    pub fn rank(&self, filtered: Vec<ListingRecord>) -> Vec<RankedListing> {
        let mut ranked: Vec<RankedListing> = filtered
            .into_iter()
            .map(|listing| {
                let (match_score, resume_match) = self.score(&listing);
                debug!(
                    "Scored '{}' at {}: {} {:?}",
                    listing.title,
                    listing.company,
                    match_score,
                    self.table.breakdown(&TextBag::from_listing(&listing))
                );
                RankedListing {
                    listing,
                    match_score,
                    resume_match,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        ranked
    }
}
