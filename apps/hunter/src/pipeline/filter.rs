use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::SearchCriteria;
use crate::models::listing::ListingRecord;
use crate::pipeline::rules::{Field, Predicate, TextBag, LEADERSHIP_TERMS, ROLE_TERMS};

/// Why a candidate was dropped. Only used for logging and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AlreadyProcessed,
    ExcludedTerm,
    NotLeadership,
    NotRelevant,
}

/// Drops already-processed listings and listings that fail the role heuristics.
/// Order preserving; never sorts.
#[derive(Debug, Clone)]
pub struct FilterStage {
    exclusion: Predicate,
    leadership: Predicate,
    relevance: Predicate,
}

impl FilterStage {
    pub fn new(criteria: &SearchCriteria) -> Self {
        let exclusion = Predicate::title(&criteria.exclude_terms);

        let leadership = Predicate::Any(vec![
            Predicate::title(LEADERSHIP_TERMS),
            Predicate::All(vec![
                Predicate::title(&["lead"]),
                Predicate::title(&["marketing", "growth"]),
            ]),
            // web3 roles bypass the leadership check entirely
            Predicate::title(&["web3"]),
        ]);

        let relevance = Predicate::Any(vec![
            Predicate::title(ROLE_TERMS),
            Predicate::All(vec![
                Predicate::title(&["bd"]),
                Predicate::title(&["head", "director"]),
            ]),
            Predicate::terms(
                &[Field::Description, Field::Company],
                &criteria.target_industries,
            ),
        ]);

        Self {
            exclusion,
            leadership,
            relevance,
        }
    }

    /// Returns the candidates worth ranking, in input order.
    pub fn filter(
        &self,
        candidates: Vec<ListingRecord>,
        already_processed: &HashSet<String>,
    ) -> Vec<ListingRecord> {
        candidates
            .into_iter()
            .filter(|listing| match self.check(listing, already_processed) {
                Ok(()) => {
                    info!(
                        "Matched job: {} at {} ({})",
                        listing.title, listing.company, listing.location
                    );
                    true
                }
                Err(reason) => {
                    debug!("Dropped '{}' at {}: {:?}", listing.title, listing.company, reason);
                    false
                }
            })
            .collect()
    }

    pub fn check(
        &self,
        listing: &ListingRecord,
        already_processed: &HashSet<String>,
    ) -> Result<(), Rejection> {
        if already_processed.contains(&listing.id) {
            return Err(Rejection::AlreadyProcessed);
        }

        let bag = TextBag::from_listing(listing);
        if self.exclusion.matches(&bag) {
            return Err(Rejection::ExcludedTerm);
        }
        if !self.leadership.matches(&bag) {
            return Err(Rejection::NotLeadership);
        }
        if !self.relevance.matches(&bag) {
            return Err(Rejection::NotRelevant);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listing::ListingSource;

    fn listing(id: &str, title: &str, company: &str, description: &str) -> ListingRecord {
        ListingRecord {
            id: id.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            location: "Remote".to_string(),
            description: description.to_string(),
            url: format!("https://jobs.example/{id}"),
            source: ListingSource::LinkedIn,
        }
    }

    fn stage() -> FilterStage {
        FilterStage::new(&SearchCriteria {
            exclude_terms: vec!["junior".into(), "associate".into(), "coordinator".into()],
            target_industries: vec!["fintech".into()],
            ..SearchCriteria::default()
        })
    }

    fn check(title: &str, company: &str, description: &str) -> Result<(), Rejection> {
        stage().check(&listing("1", title, company, description), &HashSet::new())
    }

    #[test]
    fn test_head_of_growth_is_kept() {
        assert_eq!(check("Head of Growth", "Acme DeFi", ""), Ok(()));
    }

    #[test]
    fn test_exclusion_term_wins_over_role_match() {
        assert_eq!(
            check("Junior Marketing Coordinator", "Acme", ""),
            Err(Rejection::ExcludedTerm)
        );
        assert_eq!(
            check("Associate Director, Marketing", "Acme", ""),
            Err(Rejection::ExcludedTerm)
        );
    }

    #[test]
    fn test_already_processed_listing_is_dropped() {
        let processed: HashSet<String> = ["1".to_string()].into_iter().collect();
        let result = stage().check(&listing("1", "Head of Growth", "Acme", ""), &processed);
        assert_eq!(result, Err(Rejection::AlreadyProcessed));
    }

    #[test]
    fn test_lead_needs_marketing_or_growth() {
        assert_eq!(check("Growth Lead", "Acme", ""), Ok(()));
        assert_eq!(check("Lead Engineer", "Acme", ""), Err(Rejection::NotLeadership));
    }

    #[test]
    fn test_web3_title_bypasses_leadership() {
        assert_eq!(check("Web3 Marketing Manager", "Acme", ""), Ok(()));
    }

    #[test]
    fn test_bd_needs_head_or_director() {
        assert_eq!(check("Head of BD", "Acme", ""), Ok(()));
        assert_eq!(check("VP, BD", "Acme", ""), Err(Rejection::NotRelevant));
    }

    #[test]
    fn test_target_industry_makes_leadership_role_relevant() {
        assert_eq!(check("Chief of Staff", "Acme", "A fintech scale-up"), Ok(()));
        assert_eq!(check("Chief of Staff", "Fintech Co", ""), Ok(()));
        assert_eq!(check("Chief of Staff", "Acme", ""), Err(Rejection::NotRelevant));
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let candidates = vec![
            listing("a", "VP Marketing", "Acme", ""),
            listing("b", "Junior Marketer", "Acme", ""),
            listing("c", "Head of Growth", "Acme", ""),
            listing("d", "Director of Partnerships", "Acme", ""),
        ];
        let processed: HashSet<String> = ["d".to_string()].into_iter().collect();
        let kept: Vec<String> = stage()
            .filter(candidates, &processed)
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(kept, vec!["a", "c"]);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(check("HEAD OF MARKETING", "ACME", ""), Ok(()));
        assert_eq!(check("jUnIoR head of growth", "Acme", ""), Err(Rejection::ExcludedTerm));
    }
}
