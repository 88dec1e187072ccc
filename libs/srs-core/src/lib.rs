//! Spaced-repetition scheduling engine.
//!
//! Decides which cards are due, in what order they are shown, and how each
//! card's due date, memory estimates, and retry state evolve after a grade.
//!
//! Provides:
//! - Queue building: gather, sort, and interleave a deck into a study queue
//!   ([`build_queue`])
//! - Answering: per-rating state transitions and button previews
//!   ([`Scheduler`])
//! - Session state: sibling burying and day-rollover unburying
//!   ([`SiblingBuryState`], [`unbury_cards`])
//! - A pluggable memory model boundary with a default FSRS implementation
//!   ([`MemoryModel`], [`FsrsMemoryModel`])
//!
//! The engine is synchronous and pure with respect to external resources:
//! every operation takes an explicit snapshot (`Deck`, `Card`, `now`) and
//! returns new values. Persistence, clocks, and identity generation belong
//! to the caller, and a multi-threaded host must serialize mutations to a
//! given deck.

pub mod bury;
pub mod config;
pub mod ease;
pub mod error;
pub mod memory;
pub mod queue;
pub mod scheduler;
mod sort;
pub mod steps;
pub mod types;

pub use bury::{bury_siblings_after_answer, unbury_cards, BuryMode, SiblingBuryState};
pub use config::{
    Deck, DeckConfig, LeechAction, NewCardOrder, ReviewCardOrder, DEFAULT_FSRS_PARAMS,
    FSRS_PARAM_COUNT,
};
pub use error::{ConfigError, Result, ScheduleError};
pub use memory::{FsrsMemoryModel, MemoryModel, ProjectedState, SchedulingStates};
pub use queue::{
    build_queue, Counts, Intersperser, LearningEntry, QueueEntry, QueueKind, StudyQueue,
};
pub use scheduler::{format_duration, AnswerOutcome, ButtonIntervals, Scheduler};
pub use steps::LearningSteps;
pub use types::{
    Card, CardId, CardQueue, CardType, DeckId, FsrsMemoryState, NoteId, Rating, ReviewKind,
    ReviewLog, SECS_PER_DAY,
};
