//! Core scheduling entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied card identifier. The engine never mints ids.
pub type CardId = i64;
/// Caller-supplied note identifier, used for sibling grouping.
pub type NoteId = i64;
/// Caller-supplied deck identifier.
pub type DeckId = i64;

/// Seconds in a day. Also the boundary between intraday unix-second due
/// values and day-number due values.
pub const SECS_PER_DAY: i64 = 86_400;

/// Lifecycle type of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    New,
    Learn,
    Review,
    Relearn,
}

impl Default for CardType {
    fn default() -> Self {
        Self::New
    }
}

/// Queue membership of a card.
///
/// The unit of [`Card::due`] depends on this: `New` uses an ordering
/// position, `Learn`/`PreviewRepeat` use unix seconds, `Review`/`DayLearn`
/// use days since the unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardQueue {
    New,
    Learn,
    Review,
    DayLearn,
    PreviewRepeat,
    Suspended,
    SchedBuried,
    UserBuried,
}

impl Default for CardQueue {
    fn default() -> Self {
        Self::New
    }
}

/// Rating for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Convert to the 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from the 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }
}

/// Stability/difficulty pair produced by the memory model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsrsMemoryState {
    /// Days until recall probability decays to the target retention. Always
    /// positive.
    pub stability: f64,
    /// Card difficulty, between 1.0 and 10.0.
    pub difficulty: f64,
}

/// One flashcard's scheduling state.
///
/// Cards are owned by their deck; the scheduler returns updated copies that
/// the caller merges and persists. The engine holds no card storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub note_id: NoteId,
    pub deck_id: DeckId,
    pub ctype: CardType,
    pub queue: CardQueue,
    /// Queue-dependent: position, unix seconds, or days since epoch.
    pub due: i64,
    /// Current interval in whole days.
    pub interval: u32,
    /// Fixed-point ease factor, stored x1000. 0 until first graduation,
    /// never below 1300 afterwards.
    pub ease_factor: u16,
    pub reps: u32,
    pub lapses: u32,
    /// Steps left in the current learning ladder, counting the current one.
    pub remaining_steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_state: Option<FsrsMemoryState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
    pub mtime: DateTime<Utc>,
}

impl Card {
    /// A brand-new card at `position` in the new-card queue.
    pub fn new(id: CardId, note_id: NoteId, deck_id: DeckId, position: u32) -> Self {
        Self {
            id,
            note_id,
            deck_id,
            ctype: CardType::New,
            queue: CardQueue::New,
            due: position as i64,
            interval: 0,
            ease_factor: 0,
            reps: 0,
            lapses: 0,
            remaining_steps: 0,
            memory_state: None,
            last_review: None,
            mtime: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Whole days since the last review, zero for unseen cards.
    pub(crate) fn days_since_last_review(&self, now: DateTime<Utc>) -> u32 {
        self.last_review
            .map(|last| (now - last).num_days().max(0) as u32)
            .unwrap_or(0)
    }
}

/// Kind of a review-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewKind {
    Learning,
    Review,
    Relearning,
    /// Reserved for caller-authored entries from filtered decks.
    Filtered,
    /// Reserved for caller-authored manual reschedules.
    Manual,
}

/// Immutable record of one answer, appended once per review.
///
/// The scheduler only emits these; it never reads history back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    pub card_id: CardId,
    pub reviewed_at: DateTime<Utc>,
    /// The 4-point rating value (1-4).
    pub rating: u8,
    pub kind: ReviewKind,
    /// Interval in days before the answer was applied.
    pub interval_before: u32,
    /// Interval in days after the answer was applied.
    pub interval_after: u32,
    /// Post-answer ease factor, x1000.
    pub ease_factor: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_state: Option<FsrsMemoryState>,
}

/// Days since the unix epoch for `now`.
pub(crate) fn days_since_epoch(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(SECS_PER_DAY)
}
