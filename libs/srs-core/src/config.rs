//! Deck configuration and validation.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Card, DeckId};

/// Number of weights the memory model curve family takes.
pub const FSRS_PARAM_COUNT: usize = 19;

/// Published default weights for the 19-parameter curve family.
pub const DEFAULT_FSRS_PARAMS: [f64; FSRS_PARAM_COUNT] = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

/// Ordering policy for new cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewCardOrder {
    /// By id, oldest first.
    Added,
    /// Salted-hash shuffle per card, stable within a day.
    Random,
    /// Salted-hash shuffle per note, keeping siblings adjacent.
    RandomNote,
}

impl Default for NewCardOrder {
    fn default() -> Self {
        Self::Added
    }
}

/// Ordering policy for due review cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewCardOrder {
    Day,
    DayThenDeck,
    DeckThenDay,
    IntervalsAscending,
    IntervalsDescending,
    EaseAscending,
    EaseDescending,
    RelativeOverdueness,
    Random,
    Added,
    ReverseAdded,
}

impl Default for ReviewCardOrder {
    fn default() -> Self {
        Self::Day
    }
}

/// What happens to a card when the leech threshold fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeechAction {
    /// Move the card to the suspended queue.
    Suspend,
    /// Leave scheduling untouched; tagging is the caller's responsibility.
    TagOnly,
}

impl Default for LeechAction {
    fn default() -> Self {
        Self::TagOnly
    }
}

/// Scheduling configuration for one deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckConfig {
    /// Learning step delays in minutes.
    pub learn_steps: Vec<f32>,
    /// Relearning step delays in minutes.
    pub relearn_steps: Vec<f32>,
    pub new_per_day: u32,
    pub reviews_per_day: u32,
    /// Minimum interval in days when graduating via Good.
    pub graduating_interval_good: u32,
    /// Minimum interval in days when graduating via Easy.
    pub graduating_interval_easy: u32,
    /// Ease seeded on first graduation, x1000.
    pub initial_ease: u16,
    /// Memory model weights; must hold exactly [`FSRS_PARAM_COUNT`] finite
    /// positive entries.
    pub fsrs_params: Vec<f64>,
    /// Target recall probability, strictly inside (0, 1).
    pub desired_retention: f64,
    /// Hard cap on scheduled intervals, in days.
    pub maximum_interval: u32,
    pub new_card_order: NewCardOrder,
    pub review_order: ReviewCardOrder,
    pub leech_action: LeechAction,
    /// Lapse count at which a card is first flagged as a leech; 0 disables.
    pub leech_threshold: u32,
    pub bury_new: bool,
    pub bury_reviews: bool,
    pub bury_interday_learning: bool,
    /// Look-ahead window for intraday learning cards, in seconds.
    pub learn_ahead_secs: i64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            learn_steps: vec![1.0, 5.0],
            relearn_steps: vec![5.0],
            new_per_day: 20,
            reviews_per_day: 200,
            graduating_interval_good: 1,
            graduating_interval_easy: 4,
            initial_ease: 2500,
            fsrs_params: DEFAULT_FSRS_PARAMS.to_vec(),
            desired_retention: 0.99,
            maximum_interval: 36_500,
            new_card_order: NewCardOrder::default(),
            review_order: ReviewCardOrder::default(),
            leech_action: LeechAction::default(),
            leech_threshold: 8,
            bury_new: false,
            bury_reviews: false,
            bury_interday_learning: false,
            learn_ahead_secs: 1200,
        }
    }
}

impl DeckConfig {
    /// Check the memory model fields. Invalid configuration fails fast; the
    /// engine never silently coerces it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_params(&self.fsrs_params)?;
        validate_retention(self.desired_retention)
    }
}

pub(crate) fn validate_params(params: &[f64]) -> Result<(), ConfigError> {
    if params.len() != FSRS_PARAM_COUNT {
        return Err(ConfigError::WrongParamCount {
            expected: FSRS_PARAM_COUNT,
            got: params.len(),
        });
    }
    for (index, &value) in params.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::InvalidParam { index, value });
        }
    }
    Ok(())
}

pub(crate) fn validate_retention(retention: f64) -> Result<(), ConfigError> {
    if retention > 0.0 && retention < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::RetentionOutOfRange(retention))
    }
}

/// A named collection of cards scheduled under one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub config: DeckConfig,
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(id: DeckId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            config: DeckConfig::default(),
            cards: Vec::new(),
        }
    }
}
