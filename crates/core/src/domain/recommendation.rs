use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Hold,
    Sell,
}

impl Signal {
    pub fn from_score(score: i32) -> Self {
        if score >= 2 {
            Signal::Buy
        } else if score <= -2 {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    pub fn color(self) -> Color {
        match self {
            Signal::Buy => Color::Green,
            Signal::Hold => Color::Yellow,
            Signal::Sell => Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub ticker: String,
    pub recommendation: Signal,
    pub score: i32,
    pub max_score: i32,
    pub color: Color,
    /// One line per factor: RSI, moving-average trend, MACD, sentiment.
    pub reasons: [String; 4],
    pub sentiment_weight: f64,
    pub technical_weight: f64,
}
