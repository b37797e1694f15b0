// Cover letter section templates. Placeholders in braces are replaced before use.

/// Opening paragraph. Replace `{role}` and `{company}`.
pub const INTRO_TEMPLATE: &str = "I am writing to express my strong interest in the {role} position at {company}. \
    With over 8 years of experience leading marketing and growth initiatives in tech companies, \
    including significant experience in the Web3 space, I believe I would be an excellent fit for this role.";

/// Fixed experience paragraph.
pub const EXPERIENCE_TEMPLATE: &str = "Most recently, as Head of Web3 Marketing at Immunefi, I led marketing initiatives \
    that resulted in over $150M in available bug bounties and achieved 10x growth. \
    I built and managed a team of 6 marketers while establishing comprehensive business development \
    and partnership programs.";

/// Replace `{key_requirements}`, `{matching_experience}`, `{company}`,
/// `{interesting_aspect}` and `{relevant_background}`.
pub const ALIGNMENT_TEMPLATE: &str = "Your need for {key_requirements} aligns perfectly with my experience in \
    {matching_experience}. I'm particularly excited about {company}'s {interesting_aspect} and believe \
    my background in {relevant_background} would allow me to make immediate contributions.";

/// Replace `{company}`.
pub const CLOSING_TEMPLATE: &str = "I would welcome the opportunity to discuss how my background and skills \
    would benefit {company}. Thank you for considering my application.";

pub const DEFAULT_KEY_REQUIREMENTS: &str = "strategic marketing leadership and team management";
pub const DEFAULT_COMPANY_FOCUS: &str = "innovative approach to market challenges";
pub const DEFAULT_MATCHING_EXPERIENCE: &str =
    "leading high-performance marketing teams and driving significant growth";
pub const DEFAULT_RELEVANT_BACKGROUND: &str = "Web3 marketing and team leadership";
