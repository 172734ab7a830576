//! Keyword-based topic classification for analytics.
//!
//! A deliberately crude classifier: case-insensitive substring match against
//! a fixed table, first matching category wins. The table is a const slice
//! rather than a map so the tie-breaking order is part of the declaration.

/// Topic label used for greeting messages; excluded from the non-greeting
/// counter that drives the name request.
pub const GREETING_TOPIC: &str = "greeting";

/// Fallback label when no keyword matches.
pub const GENERAL_TOPIC: &str = "general";

/// Classification table, scanned in declared order.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("incubation", &["incubation", "incubator", "startup facility"]),
    ("consultancy", &["consultancy", "consulting", "advisory"]),
    ("co-location", &["co-location", "colocation", "space", "office"]),
    ("research", &["research", "collaboration", "project"]),
    ("sppu-rpf", &["sppu", "rpf", "research park", "foundation"]),
    ("pipeline", &["pipeline", "building"]),
    ("funding", &["funding", "investment", "money", "capital"]),
    ("mentorship", &["mentor", "mentorship", "guidance"]),
    ("facilities", &["facility", "facilities", "infrastructure"]),
];

/// Classifies a question into a topic label.
///
/// Known approximation: terms overlap across categories ("research park" also
/// contains "research"), so the declared order decides ties.
pub fn classify(question: &str) -> &'static str {
    let question = question.to_lowercase();

    for (topic, terms) in TOPIC_KEYWORDS {
        if terms.iter().any(|term| question.contains(term)) {
            return topic;
        }
    }

    GENERAL_TOPIC
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_case_insensitive() {
        assert_eq!(classify("Tell me about INCUBATION support"), "incubation");
        assert_eq!(classify("who are the Mentors?"), "mentorship");
    }

    #[test]
    fn first_category_in_table_order_wins() {
        // "research park" hits both "research" and "sppu-rpf" terms;
        // "research" is declared earlier.
        assert_eq!(classify("where is the research park?"), "research");
        // "office space" hits co-location twice, still one label.
        assert_eq!(classify("do you rent office space?"), "co-location");
    }

    #[test]
    fn unmatched_questions_fall_back_to_general() {
        assert_eq!(classify("what are your opening hours?"), GENERAL_TOPIC);
        assert_eq!(classify(""), GENERAL_TOPIC);
    }

    #[test]
    fn every_table_category_is_reachable() {
        assert_eq!(classify("funding options"), "funding");
        assert_eq!(classify("consulting services"), "consultancy");
        assert_eq!(classify("pipeline status"), "pipeline");
        assert_eq!(classify("infrastructure available"), "facilities");
        assert_eq!(classify("sppu affiliation"), "sppu-rpf");
    }
}
