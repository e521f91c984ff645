//! Lexical sentiment polarity for customer review text.

/// Scores text polarity in `[-1.0, 1.0]`
///
/// `None` means the text could not be scored; callers count it as neutral.
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> Option<f64>;
}

/// Review vocabulary weights. Keys are lowercase single words.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("brilliant", 0.9),
    ("clean", 0.37),
    ("excellent", 1.0),
    ("fantastic", 0.4),
    ("fast", 0.2),
    ("friendly", 0.38),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("helpful", 0.5),
    ("honest", 0.6),
    ("impressed", 1.0),
    ("love", 0.5),
    ("loved", 0.7),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("pleasant", 0.73),
    ("polite", 0.5),
    ("professional", 0.1),
    ("prompt", 0.3),
    ("quality", 0.3),
    ("recommend", 0.4),
    ("recommended", 0.4),
    ("reliable", 0.5),
    ("superb", 1.0),
    ("thorough", 0.4),
    ("wonderful", 1.0),
    // Negative signals
    ("awful", -1.0),
    ("bad", -0.7),
    ("broken", -0.4),
    ("careless", -0.5),
    ("dirty", -0.6),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("expensive", -0.5),
    ("horrible", -1.0),
    ("late", -0.3),
    ("messy", -0.5),
    ("overpriced", -0.6),
    ("poor", -0.4),
    ("rude", -0.3),
    ("slow", -0.3),
    ("terrible", -1.0),
    ("unprofessional", -0.6),
    ("unreliable", -0.5),
    ("worst", -1.0),
];

/// Words that scale the polarity of the following word
const INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.4),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("really", 1.3),
    ("so", 1.2),
    ("super", 1.3),
    ("very", 1.3),
];

const NEGATORS: &[&str] = &["not", "no", "never", "nothing", "hardly"];

/// Polarity of a negated word relative to the plain word
const NEGATION_FACTOR: f64 = -0.5;

/// Dictionary-based scorer
///
/// Averages the polarity of every lexicon word found in the text. A negator
/// directly before a word (or, with an intensifier in between) flips and
/// halves it; an intensifier scales it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> Option<f64> {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|word| {
                word.trim_matches(|c: char| !c.is_alphabetic())
                    .to_lowercase()
                    .replace(['\u{2019}', '\u{2018}'], "'")
            })
            .filter(|word| !word.is_empty())
            .collect();

        if tokens.is_empty() {
            return None;
        }

        let mut total = 0.0;
        let mut hits = 0usize;

        for (idx, token) in tokens.iter().enumerate() {
            let Some(weight) = lookup(LEXICON, token) else {
                continue;
            };

            let mut polarity = weight;
            let mut lookback = idx;

            if lookback > 0 {
                if let Some(scale) = lookup(INTENSIFIERS, &tokens[lookback - 1]) {
                    polarity *= scale;
                    lookback -= 1;
                }
            }
            if lookback > 0 && is_negator(&tokens[lookback - 1]) {
                polarity *= NEGATION_FACTOR;
            }

            total += polarity.clamp(-1.0, 1.0);
            hits += 1;
        }

        if hits == 0 {
            return Some(0.0);
        }

        Some((total / hits as f64).clamp(-1.0, 1.0))
    }
}

fn lookup(table: &[(&str, f64)], word: &str) -> Option<f64> {
    table
        .iter()
        .find(|(entry, _)| *entry == word)
        .map(|(_, weight)| *weight)
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> f64 {
        LexiconScorer.polarity(text).unwrap_or(0.0)
    }

    #[test]
    fn empty_text_is_unscorable() {
        assert_eq!(LexiconScorer.polarity(""), None);
        assert_eq!(LexiconScorer.polarity("  !!! "), None);
    }

    #[test]
    fn unknown_words_are_neutral() {
        assert_eq!(score("they painted the fence on tuesday"), 0.0);
    }

    #[test]
    fn positive_review() {
        let polarity = score("Great service, would recommend!");
        assert!(polarity > 0.0, "expected positive, got {polarity}");
    }

    #[test]
    fn negative_review() {
        let polarity = score("Terrible job and rude staff.");
        assert!(polarity < 0.0, "expected negative, got {polarity}");
    }

    #[test]
    fn negation_flips_polarity() {
        assert!(score("not good") < 0.0);
        assert!(score("wasn't bad") > 0.0);
        assert!(score("not very good") < 0.0);
    }

    #[test]
    fn typographic_apostrophe_negates() {
        assert!(score("wasn\u{2019}t good") < 0.0);
        assert!(score("isn\u{2019}t bad") > 0.0);
        assert_eq!(score("wasn\u{2019}t good"), score("wasn't good"));
    }

    #[test]
    fn intensifier_strengthens() {
        assert!(score("very good") > score("good"));
    }

    #[test]
    fn averages_matched_words() {
        // good (0.7) and bad (-0.7) cancel out
        assert!(score("good food, bad parking").abs() < 1e-9);
    }

    #[test]
    fn stays_within_bounds() {
        let polarity = score("extremely awesome absolutely perfect best");
        assert!(polarity <= 1.0);
        let polarity = score("extremely awful absolutely horrible worst");
        assert!(polarity >= -1.0);
    }
}
