//! Lexicon-based polarity scoring for short social posts.

use std::collections::HashMap;

/// Maps free text to a polarity in [-1, 1].
pub trait TextScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "dont", "don't", "doesnt", "doesn't", "didnt", "didn't", "isnt",
    "isn't", "arent", "aren't", "wasnt", "wasn't", "wont", "won't", "cant", "can't", "cannot",
    "wouldnt", "wouldn't", "shouldnt", "shouldn't", "hardly", "barely", "neither", "nor",
    "without",
];

const NEGATION_WINDOW: usize = 3;
const NEGATION_SCALAR: f64 = -0.74;

const BOOSTERS: &[&str] = &[
    "very", "extremely", "super", "hugely", "massively", "really", "incredibly", "absolutely",
];
const BOOST: f64 = 0.293;

// Normalisation constant for the compound score.
const ALPHA: f64 = 15.0;

const VALENCES: &[(&str, f64)] = &[
    // positive
    ("bullish", 2.5),
    ("bull", 1.5),
    ("rally", 1.8),
    ("surge", 1.9),
    ("soar", 2.0),
    ("soaring", 2.0),
    ("gain", 1.4),
    ("gains", 1.4),
    ("profit", 1.6),
    ("profitable", 1.8),
    ("growth", 1.5),
    ("beat", 1.3),
    ("beats", 1.3),
    ("upgrade", 1.7),
    ("upgraded", 1.7),
    ("outperform", 1.8),
    ("strong", 1.6),
    ("positive", 1.8),
    ("rise", 1.2),
    ("rising", 1.2),
    ("breakout", 1.9),
    ("success", 2.0),
    ("undervalued", 1.6),
    ("buy", 1.2),
    ("buying", 1.2),
    ("optimistic", 2.0),
    ("record", 1.2),
    ("good", 1.9),
    ("great", 3.1),
    ("love", 3.2),
    ("excellent", 3.2),
    ("amazing", 2.8),
    ("win", 2.8),
    ("winning", 2.4),
    ("dividend", 0.8),
    ("buyback", 1.2),
    ("rebound", 1.5),
    ("recovery", 1.4),
    ("moon", 2.2),
    ("mooning", 2.4),
    ("rocket", 2.0),
    ("tendies", 2.0),
    ("squeeze", 1.2),
    ("calls", 1.0),
    ("hold", 0.6),
    ("hodl", 1.0),
    // negative
    ("bearish", -2.5),
    ("bear", -1.5),
    ("decline", -1.5),
    ("loss", -1.8),
    ("losses", -1.8),
    ("fall", -1.3),
    ("falling", -1.4),
    ("plunge", -2.2),
    ("crash", -2.6),
    ("crashing", -2.6),
    ("miss", -1.3),
    ("missed", -1.4),
    ("downgrade", -1.7),
    ("downgraded", -1.7),
    ("underperform", -1.8),
    ("weak", -1.6),
    ("negative", -1.8),
    ("drop", -1.3),
    ("dropping", -1.4),
    ("overvalued", -1.6),
    ("sell", -1.2),
    ("selling", -1.2),
    ("dump", -1.9),
    ("dumping", -2.0),
    ("fear", -2.2),
    ("risk", -1.0),
    ("risky", -1.4),
    ("worried", -1.8),
    ("bad", -2.5),
    ("terrible", -2.9),
    ("awful", -2.9),
    ("hate", -2.7),
    ("lawsuit", -1.6),
    ("fraud", -3.0),
    ("bankruptcy", -3.0),
    ("dilution", -1.5),
    ("layoffs", -1.6),
    ("bubble", -1.5),
    ("puts", -1.0),
    ("bagholder", -1.8),
    ("bagholding", -1.8),
    ("rekt", -2.4),
    ("scam", -2.9),
];

/// Sums word valences with negation and booster handling, then squashes the
/// total into [-1, 1] with `s / sqrt(s^2 + 15)`.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    valences: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            valences: VALENCES.iter().copied().collect(),
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl TextScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let tokens = Self::tokens(text);
        let mut sum = 0.0;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.valences.get(token.as_str()) else {
                continue;
            };

            let mut valence = base;
            if i > 0 && BOOSTERS.contains(&tokens[i - 1].as_str()) {
                valence += BOOST * valence.signum();
            }

            let window = &tokens[i.saturating_sub(NEGATION_WINDOW)..i];
            if window.iter().any(|w| NEGATION_WORDS.contains(&w.as_str())) {
                valence *= NEGATION_SCALAR;
            }

            sum += valence;
        }

        if sum == 0.0 {
            return 0.0;
        }
        (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}
