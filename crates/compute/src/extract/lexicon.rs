//! Keyword-lexicon feature scoring.
//!
//! Every feature except `polarity` and `number` is the fraction of its
//! keyword list that occurs anywhere in the lower-cased text (substring
//! match, each keyword counted at most once).

use tide_core::{FeatureName, FeatureVector};

use super::FeatureExtractor;

const SOCIAL: &[&str] = &[
    "people", "friend", "family", "together", "social", "community", "relationship",
    "interaction", "group",
];
const EMOTION: &[&str] = &[
    "feel", "emotion", "happy", "sad", "angry", "fear", "joy", "love", "hate", "excited",
    "anxious",
];
const MORALITY: &[&str] = &[
    "right", "wrong", "should", "ought", "must", "ethical", "moral", "duty", "obligation",
    "responsibility",
];
const THOUGHT: &[&str] = &[
    "think", "believe", "know", "understand", "realize", "consider", "imagine", "wonder",
    "suppose", "assume",
];
const SELF_MOTION: &[&str] = &[
    "move", "walk", "run", "jump", "dance", "swim", "fly", "crawl", "slide", "spin",
];
const SPACE: &[&str] = &[
    "above", "below", "left", "right", "near", "far", "distance", "location", "position",
    "direction",
];
const TIME: &[&str] = &[
    "time", "when", "before", "after", "during", "while", "second", "minute", "hour", "day",
    "year",
];
const VISUAL: &[&str] = &[
    "see", "look", "view", "appear", "visible", "bright", "dark", "shape", "size", "image",
];
const COLOR: &[&str] = &[
    "red", "blue", "green", "yellow", "black", "white", "color", "colored", "shade", "hue",
];
const AUDITORY: &[&str] = &[
    "hear", "listen", "sound", "noise", "quiet", "loud", "music", "voice", "echo", "silence",
];
const SMELL_TASTE: &[&str] = &[
    "smell", "taste", "flavor", "aroma", "scent", "sweet", "sour", "bitter", "salty", "odor",
];
const TACTILE: &[&str] = &[
    "touch", "feel", "soft", "hard", "rough", "smooth", "warm", "cold", "wet", "dry",
];

const POSITIVE: &[&str] = &["good", "great", "wonderful", "beautiful", "excellent"];
const NEGATIVE: &[&str] = &["bad", "terrible", "awful", "horrible", "poor"];

const NUMBER_WORDS: &[&str] = &[
    "one", "two", "three", "many", "few", "several", "count", "calculate", "measure",
    "quantity",
];
/// Digit runs plus number-word hits at which `number` saturates.
const NUMBER_SATURATION: f64 = 10.0;

/// Keyword-count extractor over fixed lexicons.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconExtractor;

impl LexiconExtractor {
    pub fn new() -> Self {
        Self
    }

    fn keywords(name: FeatureName) -> &'static [&'static str] {
        match name {
            FeatureName::Social => SOCIAL,
            FeatureName::Emotion => EMOTION,
            FeatureName::Morality => MORALITY,
            FeatureName::Thought => THOUGHT,
            FeatureName::SelfMotion => SELF_MOTION,
            FeatureName::Space => SPACE,
            FeatureName::Time => TIME,
            FeatureName::Visual => VISUAL,
            FeatureName::Color => COLOR,
            FeatureName::Auditory => AUDITORY,
            FeatureName::SmellTaste => SMELL_TASTE,
            FeatureName::Tactile => TACTILE,
            FeatureName::Polarity | FeatureName::Number => &[],
        }
    }
}

fn hits(text: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| text.contains(*w)).count()
}

fn keyword_fraction(text: &str, words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    hits(text, words) as f64 / words.len() as f64
}

/// Number of maximal runs of ASCII digits.
fn digit_runs(text: &str) -> usize {
    let mut runs = 0;
    let mut in_run = false;
    for c in text.chars() {
        let digit = c.is_ascii_digit();
        if digit && !in_run {
            runs += 1;
        }
        in_run = digit;
    }
    runs
}

fn polarity(text: &str) -> f64 {
    let pos = hits(text, POSITIVE) as f64;
    let neg = hits(text, NEGATIVE) as f64;
    (pos - neg) / (POSITIVE.len() + NEGATIVE.len()) as f64
}

fn number(raw: &str, lower: &str) -> f64 {
    let count = (digit_runs(raw) + hits(lower, NUMBER_WORDS)) as f64;
    (count / NUMBER_SATURATION).min(1.0)
}

impl FeatureExtractor for LexiconExtractor {
    fn extract(&self, text: &str) -> FeatureVector {
        let lower = text.to_lowercase();
        FeatureName::ALL
            .iter()
            .map(|name| {
                let score = match name {
                    FeatureName::Polarity => polarity(&lower),
                    FeatureName::Number => number(text, &lower),
                    other => keyword_fraction(&lower, Self::keywords(*other)),
                };
                (*name, score)
            })
            .collect()
    }
}
