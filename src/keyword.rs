//! Keyword extraction and canonicalization.
//!
//! This is the single authority for tokenization, stopword filtering, and
//! alias resolution. Every component that needs tag semantics (adapters,
//! trend tracking, knowledge tracking) calls these functions instead of
//! re-implementing normalization, so a trend spike on `"js"` and a knowledge
//! hit on `"javascript"` refer to the same canonical identity.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Function words plus low-signal words common in tech headlines.
const STOPWORDS: &[&str] = &[
    // Determiners, pronouns, prepositions, conjunctions
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "can", "shall",
    "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "through",
    "during", "before", "after", "above", "below", "between", "out", "off", "up", "down",
    "about", "or", "and", "but", "not", "no", "nor", "so", "yet", "both", "either", "neither",
    "each", "every", "all", "any", "few", "more", "most", "other", "some", "such", "than",
    "too", "very", "just", "because", "if", "when", "while", "how", "what", "which", "who",
    "whom", "this", "that", "these", "those", "it", "its", "i", "me", "my", "we", "our",
    "you", "your", "he", "him", "his", "she", "her", "they", "them", "their",
    // Common low-signal words in tech headlines
    "new", "now", "get", "got", "make", "made", "way", "back", "show", "ask", "tell", "use",
    "using", "used", "why", "via", "vs", "like", "one", "two", "first", "also", "even",
    "still", "already", "here", "there", "says", "said", "lets", "let", "see", "look",
    "need", "want", "think", "know", "work", "working", "really", "much", "many", "well",
    "only", "over", "year", "years", "day", "days", "time", "long", "part", "things",
    "thing", "goes", "going", "come", "better", "best", "big", "small", "old", "next",
    "open", "source", "free", "built", "build", "building", "people", "world", "today",
    "never", "keep", "take",
];

/// Variant spelling → canonical keyword. Keeps trending detection and the
/// knowledge profile counting one identity per topic.
const ALIASES: &[(&str, &str)] = &[
    // AI & ML
    ("gpt4", "gpt-4"),
    ("gpt-4o", "gpt-4"),
    ("gpt4o", "gpt-4"),
    ("gpt5", "gpt-5"),
    ("llms", "llm"),
    ("genai", "generative-ai"),
    ("gen-ai", "generative-ai"),
    // Languages & frameworks
    ("js", "javascript"),
    ("ts", "typescript"),
    ("reactjs", "react"),
    ("react.js", "react"),
    ("vuejs", "vue"),
    ("vue.js", "vue"),
    ("nodejs", "node"),
    ("node.js", "node"),
    ("nextjs", "next.js"),
    ("golang", "go"),
    ("rustlang", "rust"),
    ("py", "python"),
    ("cpp", "c++"),
    // Platforms & tools
    ("gh", "github"),
    ("k8s", "kubernetes"),
    ("tf", "terraform"),
    ("postgres", "postgresql"),
];

fn stopwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

fn aliases() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| ALIASES.iter().copied().collect())
}

/// Extract meaningful keywords from free text.
///
/// Lowercases the input, replaces everything outside `[a-z0-9 .-]` with
/// spaces, splits on whitespace, drops short tokens and stopwords, strips
/// leading/trailing `-`/`.` runs, and maps through the alias table. The
/// result is deduplicated with insertion order preserved. Empty input yields
/// an empty vec; this function never fails.
pub fn extract_keywords(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let normalized: String = text
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for token in normalized.split_whitespace() {
        if token.len() <= 1 || stopwords().contains(token) {
            continue;
        }

        let cleaned = token.trim_matches(|c| c == '-' || c == '.');
        if cleaned.len() <= 1 {
            continue;
        }

        let canonical = aliases().get(cleaned).copied().unwrap_or(cleaned);
        if seen.insert(canonical) {
            keywords.push(canonical.to_string());
        }
    }

    keywords
}

/// Normalize a single keyword to its canonical form.
///
/// Used for ad-hoc comparisons so they agree with [`extract_keywords`] output.
pub fn normalize_keyword(keyword: &str) -> String {
    let lower = keyword.trim().to_ascii_lowercase();
    aliases()
        .get(lower.as_str())
        .map(|s| s.to_string())
        .unwrap_or(lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("   ").is_empty());
    }

    #[test]
    fn test_stopwords_and_aliases() {
        let keywords = extract_keywords("The GPT4 Is Great");
        assert!(keywords.contains(&"gpt-4".to_string()));
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.contains(&"is".to_string()));
    }

    #[test]
    fn test_dedup_preserves_insertion_order() {
        let keywords = extract_keywords("rust tokio rust async tokio");
        assert_eq!(keywords, ["rust", "tokio", "async"]);
    }

    #[test]
    fn test_variants_collapse_to_one_identity() {
        // "js" and "javascript" dedup through the alias map
        let keywords = extract_keywords("js tips for javascript developers");
        assert_eq!(
            keywords.iter().filter(|k| *k == "javascript").count(),
            1
        );
    }

    #[test]
    fn test_punctuation_replaced_with_spaces() {
        let keywords = extract_keywords("Rust/WASM: faster than C++?");
        assert!(keywords.contains(&"rust".to_string()));
        assert!(keywords.contains(&"wasm".to_string()));
        assert!(keywords.contains(&"faster".to_string()));
    }

    #[test]
    fn test_edge_punctuation_stripped() {
        let keywords = extract_keywords("--rust-- ...node.js... -x-");
        assert!(keywords.contains(&"rust".to_string()));
        assert!(keywords.contains(&"node".to_string()));
        // "-x-" strips down to one char and is dropped
        assert!(!keywords.iter().any(|k| k.contains('x')));
    }

    #[test]
    fn test_short_tokens_dropped() {
        assert!(extract_keywords("a b c 1 2").is_empty());
    }

    #[test]
    fn test_normalize_keyword() {
        assert_eq!(normalize_keyword("  K8s "), "kubernetes");
        assert_eq!(normalize_keyword("Rust"), "rust");
        assert_eq!(normalize_keyword("gpt4"), "gpt-4");
    }
}
