//! Rule table: the keyword heuristics shared by the filter and ranking stages.
//!
//! Every check is a substring test over a lowercase `TextBag`, so case folding
//! happens exactly once per listing. Scoring rules are ordered tiers of
//! (predicate, weight): the first matching tier of a rule awards its weight,
//! and a listing's score is the sum over all rules.

use crate::models::listing::ListingRecord;

pub const WEB3_TERMS: &[&str] = &["web3", "blockchain", "crypto", "defi"];
pub const LEADERSHIP_TERMS: &[&str] = &["head", "director", "vp", "vice president", "chief"];
pub const ROLE_TERMS: &[&str] = &["marketing", "growth", "partnerships", "business development"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Company,
    Location,
    Description,
}

/// Lowercased listing text, built once per listing.
#[derive(Debug, Clone)]
pub struct TextBag {
    title: String,
    company: String,
    location: String,
    description: String,
}

impl TextBag {
    pub fn new(title: &str, company: &str, location: &str, description: &str) -> Self {
        Self {
            title: title.to_lowercase(),
            company: company.to_lowercase(),
            location: location.to_lowercase(),
            description: description.to_lowercase(),
        }
    }

    pub fn from_listing(listing: &ListingRecord) -> Self {
        Self::new(
            &listing.title,
            &listing.company,
            &listing.location,
            &listing.description,
        )
    }

    fn field(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Company => &self.company,
            Field::Location => &self.location,
            Field::Description => &self.description,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Predicate {
    /// Any of `terms` occurs in any of `fields`.
    AnyTerm { fields: Vec<Field>, terms: Vec<String> },
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn terms<S: AsRef<str>>(fields: &[Field], terms: &[S]) -> Self {
        Predicate::AnyTerm {
            fields: fields.to_vec(),
            terms: terms
                .iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn title<S: AsRef<str>>(terms: &[S]) -> Self {
        Self::terms(&[Field::Title], terms)
    }

    pub fn matches(&self, bag: &TextBag) -> bool {
        match self {
            Predicate::AnyTerm { fields, terms } => fields.iter().any(|field| {
                let text = bag.field(*field);
                terms.iter().any(|term| text.contains(term.as_str()))
            }),
            Predicate::All(parts) => parts.iter().all(|p| p.matches(bag)),
            Predicate::Any(parts) => parts.iter().any(|p| p.matches(bag)),
        }
    }
}

/// One scoring rule: ordered tiers, first match wins.
#[derive(Debug, Clone)]
pub struct ScoreRule {
    pub label: &'static str,
    tiers: Vec<(Predicate, u32)>,
}

impl ScoreRule {
    pub fn new(label: &'static str, tiers: Vec<(Predicate, u32)>) -> Self {
        Self { label, tiers }
    }

    pub fn award(&self, bag: &TextBag) -> u32 {
        self.tiers
            .iter()
            .find(|(predicate, _)| predicate.matches(bag))
            .map(|(_, weight)| *weight)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<ScoreRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<ScoreRule>) -> Self {
        Self { rules }
    }

    /// The match-score rules. `target_industries` feeds the company bonus.
    pub fn match_score<S: AsRef<str>>(target_industries: &[S]) -> Self {
        Self::new(vec![
            ScoreRule::new(
                "web3",
                vec![
                    (Predicate::terms(&[Field::Title, Field::Company], WEB3_TERMS), 3),
                    (Predicate::terms(&[Field::Description], WEB3_TERMS), 2),
                ],
            ),
            ScoreRule::new(
                "remote",
                vec![(Predicate::terms(&[Field::Location], &["remote"]), 2)],
            ),
            ScoreRule::new(
                "seniority",
                vec![
                    (Predicate::title(&["head", "chief"]), 2),
                    (Predicate::title(&["director", "vp"]), 1),
                ],
            ),
            ScoreRule::new("marketing", vec![(Predicate::title(&["marketing"]), 1)]),
            ScoreRule::new("growth", vec![(Predicate::title(&["growth"]), 1)]),
            ScoreRule::new(
                "partnerships",
                vec![(Predicate::title(&["partnerships", "business development"]), 1)],
            ),
            ScoreRule::new(
                "target_industry",
                vec![(Predicate::terms(&[Field::Company], target_industries), 1)],
            ),
        ])
    }

    pub fn score(&self, bag: &TextBag) -> u32 {
        self.rules.iter().map(|rule| rule.award(bag)).sum()
    }

    /// Non-zero awards per rule, for logging why a listing scored what it did.
    pub fn breakdown(&self, bag: &TextBag) -> Vec<(&'static str, u32)> {
        self.rules
            .iter()
            .map(|rule| (rule.label, rule.award(bag)))
            .filter(|(_, points)| *points > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_INDUSTRIES: &[&str] = &[];

    #[test]
    fn test_head_of_growth_at_defi_company_scores_eight() {
        let bag = TextBag::new("Head of Growth", "Acme DeFi", "Remote", "");
        assert_eq!(RuleTable::match_score(NO_INDUSTRIES).score(&bag), 8);
    }

    #[test]
    fn test_vp_marketing_in_austin_scores_two() {
        let bag = TextBag::new("VP Marketing", "Acme Inc", "Austin, TX", "");
        assert_eq!(RuleTable::match_score(NO_INDUSTRIES).score(&bag), 2);
    }

    #[test]
    fn test_web3_in_description_only_is_worth_two() {
        let bag = TextBag::new("Director", "Acme", "NYC", "We build blockchain rails");
        let table = RuleTable::match_score(NO_INDUSTRIES);
        assert_eq!(table.breakdown(&bag), vec![("web3", 2), ("seniority", 1)]);
    }

    #[test]
    fn test_title_web3_outranks_description_web3() {
        let bag = TextBag::new("Web3 Marketing Lead", "Acme", "NYC", "crypto crypto crypto");
        let table = RuleTable::match_score(NO_INDUSTRIES);
        assert_eq!(table.breakdown(&bag), vec![("web3", 3), ("marketing", 1)]);
    }

    #[test]
    fn test_target_industry_company_bonus() {
        let table = RuleTable::match_score(&["Fintech"]);
        let bag = TextBag::new("VP Marketing", "Acme Fintech", "Remote", "");
        assert_eq!(table.score(&bag), 1 + 1 + 2 + 1);
    }

    #[test]
    fn test_empty_terms_never_match() {
        let predicate = Predicate::terms(&[Field::Company], &["", "  "]);
        assert!(!predicate.matches(&TextBag::new("x", "anything", "y", "z")));
    }

    #[test]
    fn test_all_and_any_compose() {
        let lead = Predicate::All(vec![
            Predicate::title(&["lead"]),
            Predicate::title(&["marketing", "growth"]),
        ]);
        assert!(lead.matches(&TextBag::new("Growth Lead", "", "", "")));
        assert!(!lead.matches(&TextBag::new("Team Lead, Sales", "", "", "")));

        let either = Predicate::Any(vec![Predicate::title(&["chief"]), lead]);
        assert!(either.matches(&TextBag::new("Chief Revenue Officer", "", "", "")));
    }

    #[test]
    fn test_maximum_observed_score() {
        let table = RuleTable::match_score(&["labs"]);
        let bag = TextBag::new(
            "Head of Web3 Growth Marketing & Partnerships",
            "Chain Labs",
            "Remote (US)",
            "",
        );
        assert_eq!(table.score(&bag), 3 + 2 + 2 + 1 + 1 + 1 + 1);
    }
}
