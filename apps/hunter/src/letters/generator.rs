use crate::letters::templates::{
    ALIGNMENT_TEMPLATE, CLOSING_TEMPLATE, DEFAULT_COMPANY_FOCUS, DEFAULT_KEY_REQUIREMENTS,
    DEFAULT_MATCHING_EXPERIENCE, DEFAULT_RELEVANT_BACKGROUND, EXPERIENCE_TEMPLATE, INTRO_TEMPLATE,
};
use crate::letters::LetterError;

/// Produces cover letter text for one listing.
pub trait LetterGenerator: Send + Sync {
    fn generate(&self, title: &str, company: &str, description: &str) -> Result<String, LetterError>;
}

/// A recurring theme in job descriptions and how the letter speaks to it.
struct FocusArea {
    terms: &'static [&'static str],
    requirement: &'static str,
    experience: &'static str,
    background: &'static str,
}

const FOCUS_AREAS: &[FocusArea] = &[
    FocusArea {
        terms: &["web3", "blockchain", "crypto", "defi"],
        requirement: "Web3 go-to-market expertise",
        experience: "launching and scaling Web3 marketing programs",
        background: "Web3 marketing",
    },
    FocusArea {
        terms: &["growth", "acquisition", "funnel"],
        requirement: "data-driven growth leadership",
        experience: "driving 10x growth through disciplined experimentation",
        background: "growth marketing",
    },
    FocusArea {
        terms: &["partnership", "business development", "alliances"],
        requirement: "partnership and business development leadership",
        experience: "establishing business development and partnership programs",
        background: "partnerships",
    },
    FocusArea {
        terms: &["team", "manage", "hire", "hiring"],
        requirement: "building and managing a marketing team",
        experience: "building and leading high-performance marketing teams",
        background: "team leadership",
    },
    FocusArea {
        terms: &["content", "brand", "storytelling"],
        requirement: "brand and content strategy",
        experience: "owning brand narrative and content programs",
        background: "content marketing",
    },
];

/// What the company is about, keyed by description terms. First match wins.
const COMPANY_FOCUS: &[(&str, &str)] = &[
    ("security", "commitment to security"),
    ("defi", "work in decentralized finance"),
    ("developer", "developer-first approach"),
    ("open source", "open source community"),
    ("payments", "mission in payments"),
    ("ai", "applied AI products"),
];

/// Fills the letter templates, deriving the alignment paragraph from the
/// focus areas a description mentions.
#[derive(Debug, Default, Clone)]
pub struct TemplateLetterGenerator;

impl LetterGenerator for TemplateLetterGenerator {
    fn generate(&self, title: &str, company: &str, description: &str) -> Result<String, LetterError> {
        let title = title.trim();
        let company = company.trim();
        if title.is_empty() {
            return Err(LetterError::MissingInput("title"));
        }
        if company.is_empty() {
            return Err(LetterError::MissingInput("company"));
        }

        let alignment = Alignment::from_description(description);

        let sections = [
            INTRO_TEMPLATE
                .replace("{role}", title)
                .replace("{company}", company),
            EXPERIENCE_TEMPLATE.to_string(),
            ALIGNMENT_TEMPLATE
                .replace("{key_requirements}", &alignment.key_requirements)
                .replace("{matching_experience}", &alignment.matching_experience)
                .replace("{company}", company)
                .replace("{interesting_aspect}", alignment.company_focus)
                .replace("{relevant_background}", &alignment.relevant_background),
            CLOSING_TEMPLATE.replace("{company}", company),
        ];

        Ok(sections.join("\n\n"))
    }
}

#[derive(Debug, PartialEq)]
struct Alignment {
    key_requirements: String,
    matching_experience: String,
    company_focus: &'static str,
    relevant_background: String,
}

impl Alignment {
    fn from_description(description: &str) -> Self {
        let text = description.to_lowercase();
        let areas: Vec<&FocusArea> = FOCUS_AREAS
            .iter()
            .filter(|area| area.terms.iter().any(|t| text.contains(t)))
            .take(2)
            .collect();

        let company_focus = COMPANY_FOCUS
            .iter()
            .find(|(term, _)| contains_word(&text, term))
            .map(|(_, focus)| *focus)
            .unwrap_or(DEFAULT_COMPANY_FOCUS);

        if areas.is_empty() {
            return Self {
                key_requirements: DEFAULT_KEY_REQUIREMENTS.to_string(),
                matching_experience: DEFAULT_MATCHING_EXPERIENCE.to_string(),
                company_focus,
                relevant_background: DEFAULT_RELEVANT_BACKGROUND.to_string(),
            };
        }

        let join = |pick: fn(&FocusArea) -> &'static str| {
            areas.iter().map(|a| pick(a)).collect::<Vec<_>>().join(" and ")
        };
        Self {
            key_requirements: join(|a| a.requirement),
            matching_experience: join(|a| a.experience),
            company_focus,
            relevant_background: join(|a| a.background),
        }
    }
}

/// Whole-word containment, so "ai" does not match "maintain".
fn contains_word(text: &str, word: &str) -> bool {
    text.match_indices(word).any(|(start, _)| {
        let end = start + word.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_has_four_sections_naming_role_and_company() {
        let letter = TemplateLetterGenerator
            .generate("Head of Growth", "Acme DeFi", "")
            .unwrap();
        let sections: Vec<&str> = letter.split("\n\n").collect();
        assert_eq!(sections.len(), 4);
        assert!(sections[0].contains("Head of Growth position at Acme DeFi"));
        assert!(sections[3].contains("benefit Acme DeFi"));
        assert!(!letter.contains('{'));
    }

    #[test]
    fn test_empty_description_uses_default_alignment() {
        let letter = TemplateLetterGenerator.generate("VP Marketing", "Acme", "").unwrap();
        assert!(letter.contains(DEFAULT_KEY_REQUIREMENTS));
        assert!(letter.contains(DEFAULT_COMPANY_FOCUS));
    }

    #[test]
    fn test_description_focus_drives_alignment() {
        let alignment = Alignment::from_description(
            "Lead growth for our DeFi protocol and build partnerships with exchanges.",
        );
        assert_eq!(
            alignment.key_requirements,
            "Web3 go-to-market expertise and data-driven growth leadership"
        );
        assert_eq!(alignment.company_focus, "work in decentralized finance");
        assert_eq!(alignment.relevant_background, "Web3 marketing and growth marketing");
    }

    #[test]
    fn test_company_focus_matches_whole_words_only() {
        let alignment = Alignment::from_description("Maintain campaigns");
        assert_eq!(alignment.company_focus, DEFAULT_COMPANY_FOCUS);
        let alignment = Alignment::from_description("We ship AI copilots");
        assert_eq!(alignment.company_focus, "applied AI products");
    }

    #[test]
    fn test_blank_company_is_rejected() {
        let err = TemplateLetterGenerator.generate("VP Marketing", " ", "").unwrap_err();
        assert!(matches!(err, LetterError::MissingInput("company")));
    }
}
