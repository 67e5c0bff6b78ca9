//! Keyword-based question categorization.
//!
//! Buckets a question into a fixed taxonomy by scanning its lower-cased text
//! for keywords. Rule order is policy, not tuning: earlier rules win, and
//! reordering them changes classification results.

use serde::Serialize;
use std::fmt;

use crate::model::Question;

/// The fixed question taxonomy, in rule-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    RiskManagement,
    SecurityControls,
    IsmsFramework,
    AuditCompliance,
    Documentation,
    Implementation,
    General,
}

impl Category {
    /// Every category, in taxonomy order (`General` last).
    pub const ALL: [Category; 7] = [
        Category::RiskManagement,
        Category::SecurityControls,
        Category::IsmsFramework,
        Category::AuditCompliance,
        Category::Documentation,
        Category::Implementation,
        Category::General,
    ];

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::RiskManagement => "Risk Management",
            Category::SecurityControls => "Security Controls",
            Category::IsmsFramework => "ISMS Framework",
            Category::AuditCompliance => "Audit & Compliance",
            Category::Documentation => "Documentation",
            Category::Implementation => "Implementation",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyword rules, tested in order; first match wins.
const KEYWORD_RULES: [(Category, &[&str]); 6] = [
    (Category::RiskManagement, &["risk", "threat", "vulnerability"]),
    (Category::SecurityControls, &["control", "security control"]),
    (Category::IsmsFramework, &["isms", "management system"]),
    (Category::AuditCompliance, &["audit", "review", "compliance"]),
    (Category::Documentation, &["policy", "procedure", "document"]),
    (Category::Implementation, &["implementation", "project"]),
];

/// Classify a question by its text.
#[must_use]
pub fn classify(question: &Question) -> Category {
    classify_text(question.text())
}

/// Classify raw question text. Pure; case-insensitive substring matching.
#[must_use]
pub fn classify_text(text: &str) -> Category {
    let text = text.to_lowercase();
    for (category, keywords) in &KEYWORD_RULES {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            return *category;
        }
    }
    Category::General
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;

    #[test]
    fn each_rule_matches_its_keywords() {
        assert_eq!(classify_text("How is a threat assessed?"), Category::RiskManagement);
        assert_eq!(classify_text("Pick an access control"), Category::SecurityControls);
        assert_eq!(classify_text("Scope of the ISMS"), Category::IsmsFramework);
        assert_eq!(classify_text("Internal audit frequency"), Category::AuditCompliance);
        assert_eq!(classify_text("Who approves the policy?"), Category::Documentation);
        assert_eq!(classify_text("Project kickoff steps"), Category::Implementation);
    }

    #[test]
    fn unmatched_text_falls_back_to_general() {
        assert_eq!(classify_text("What year was the standard published?"), Category::General);
    }

    #[test]
    fn earlier_rules_win() {
        // Mentions both "audit" and "risk"; risk management is tested first.
        assert_eq!(
            classify_text("When should the audit cover risk treatment?"),
            Category::RiskManagement
        );
        // "management system" loses to "control".
        assert_eq!(
            classify_text("Which control supports the management system?"),
            Category::SecurityControls
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify_text("RISK appetite definition"), Category::RiskManagement);
    }

    #[test]
    fn classify_uses_question_text() {
        let question = QuestionDraft::new(
            "What does an ISMS certify?",
            vec!["a".into(), "b".into()],
            0,
        )
        .validate()
        .unwrap();
        assert_eq!(classify(&question), Category::IsmsFramework);
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(Category::AuditCompliance.to_string(), "Audit & Compliance");
        assert_eq!(Category::ALL.len(), 7);
    }
}
