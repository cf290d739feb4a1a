//! Four-letter pattern signatures: `CC`/`AA` (concrete vs abstract), `D`/`F`
//! (descriptive vs functional), `C`/`S` (complex vs simple).

use super::PatternClassifier;

const CONCRETE_INDICATORS: &[&str] = &[
    "see", "touch", "hear", "smell", "taste", "physical", "object", "thing", "material",
];
const ABSTRACT_INDICATORS: &[&str] = &[
    "think", "feel", "believe", "concept", "idea", "theory", "emotion", "thought",
];
const DESCRIPTIVE_SUFFIXES: &[&str] = &["ly", "ful", "less", "ous", "ive"];
const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
];

/// Responses longer than this many words are marked complex.
pub const COMPLEX_WORD_COUNT: usize = 50;

#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureClassifier;

impl SignatureClassifier {
    pub fn new() -> Self {
        Self
    }
}

fn contains_any(word: &str, indicators: &[&str]) -> bool {
    indicators.iter().any(|ind| word.contains(ind))
}

impl PatternClassifier for SignatureClassifier {
    fn classify(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();

        let concrete = words.iter().filter(|w| contains_any(w, CONCRETE_INDICATORS)).count();
        let abstract_ = words.iter().filter(|w| contains_any(w, ABSTRACT_INDICATORS)).count();
        let descriptive = words
            .iter()
            .filter(|w| DESCRIPTIVE_SUFFIXES.iter().any(|s| w.ends_with(s)))
            .count();
        let functional = words.iter().filter(|w| FUNCTION_WORDS.contains(*w)).count();

        let mut signature = String::with_capacity(4);
        signature.push_str(if concrete > abstract_ { "CC" } else { "AA" });
        signature.push(if descriptive > functional { 'D' } else { 'F' });
        signature.push(if words.len() > COMPLEX_WORD_COUNT { 'C' } else { 'S' });
        signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tied_descriptive_count_is_functional() {
        let sig = SignatureClassifier.classify("I see a smooth object slowly, carefully");
        // "slowly," keeps its comma, so only "carefully" is descriptive: 1 vs 1 function word.
        assert_eq!(sig, "CCFS");
    }

    #[test]
    fn abstract_functional_simple() {
        assert_eq!(SignatureClassifier.classify("I think the idea is sound"), "AAFS");
    }

    #[test]
    fn descriptive_beats_functional() {
        assert_eq!(
            SignatureClassifier.classify("quietly beautiful endless"),
            "AADS"
        );
    }

    #[test]
    fn long_text_is_complex() {
        let text = vec!["word"; COMPLEX_WORD_COUNT + 1].join(" ");
        assert!(SignatureClassifier.classify(&text).ends_with('C'));
        let text = vec!["word"; COMPLEX_WORD_COUNT].join(" ");
        assert!(SignatureClassifier.classify(&text).ends_with('S'));
    }

    #[test]
    fn empty_text() {
        assert_eq!(SignatureClassifier.classify(""), "AAFS");
    }
}
