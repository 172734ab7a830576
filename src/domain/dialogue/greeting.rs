//! Greeting detection and time-of-day greeting rendering.

/// Inputs treated as greetings after trimming and lowercasing.
///
/// Matching is exact, not substring: "hello there" goes to the oracle.
const GREETINGS: [&str; 8] = [
    "hi",
    "hello",
    "hey",
    "hii",
    "hiii",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Returns true if the input is exactly one of the greeting phrases.
pub fn is_greeting(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    GREETINGS.contains(&normalized.as_str())
}

/// Renders a greeting appropriate for the given local hour.
///
/// Hour bands: [5,12) morning, [12,17) afternoon, [17,21) evening, otherwise
/// a generic "Hello".
pub fn contextual_greeting(name: Option<&str>, hour: u32) -> String {
    let salutation = match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        17..=20 => "Good evening",
        _ => "Hello",
    };

    match name {
        Some(name) => format!("{salutation}, {name}! 👋"),
        None => format!("{salutation}! 👋"),
    }
}
