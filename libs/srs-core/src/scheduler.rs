//! Per-answer state transitions.
//!
//! The scheduler owns the state machine crossing lifecycle type with queue
//! placement: stepped answers walk the learning ladder, graduation and
//! review answers are driven by the memory model projection, and the ease,
//! leech, and bury policies are applied on the way out. Every operation is
//! pure with respect to external resources: it takes a card snapshot and
//! `now`, and returns updated values for the caller to merge and persist.

use chrono::{DateTime, Utc};

use crate::bury::{bury_siblings_after_answer, SiblingBuryState};
use crate::config::{DeckConfig, LeechAction};
use crate::ease::{adjust_ease, graduation_ease, leech_fired};
use crate::error::{ConfigError, Result, ScheduleError};
use crate::memory::{FsrsMemoryModel, MemoryModel, SchedulingStates};
use crate::steps::LearningSteps;
use crate::types::{
    days_since_epoch, Card, CardId, CardQueue, CardType, Rating, ReviewKind, ReviewLog,
    SECS_PER_DAY,
};

/// Fallback learning delay when a step list unexpectedly has no entry.
const DEFAULT_STEP_SECS: u32 = 600;

/// Outcome of answering a card: the updated card and log entry the caller
/// must persist, and whether the leech threshold fired (tagging on
/// `LeechAction::TagOnly` is the caller's responsibility).
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub card: Card,
    pub review_log: ReviewLog,
    pub leech_fired: bool,
}

/// Human-readable preview of the four answer buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonIntervals {
    pub again: String,
    pub hard: String,
    pub good: String,
    pub easy: String,
}

/// Per-deck scheduler. Construction validates the configuration; answering
/// never fails on config grounds afterwards.
pub struct Scheduler {
    config: DeckConfig,
    memory: Box<dyn MemoryModel>,
}

impl Scheduler {
    pub fn new(config: DeckConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let memory = FsrsMemoryModel::new(
            &config.fsrs_params,
            config.desired_retention,
            config.maximum_interval,
        )?;
        Ok(Self {
            config,
            memory: Box::new(memory),
        })
    }

    /// Swap in a different memory model implementation.
    pub fn with_memory_model(
        config: DeckConfig,
        memory: Box<dyn MemoryModel>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, memory })
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    /// Apply `rating` (1-4) to `card` at `now`, returning the updated card
    /// and its review-log entry. The input card is left untouched; on error
    /// nothing is produced.
    pub fn answer_card(&self, card: &Card, rating: u8, now: DateTime<Utc>) -> Result<AnswerOutcome> {
        let rating = Rating::from_value(rating).ok_or(ScheduleError::InvalidRating(rating))?;
        let projection = self
            .memory
            .project(card.memory_state, card.days_since_last_review(now));

        let mut updated = card.clone();
        if self.in_stepped_phase(card) {
            self.answer_stepped(&mut updated, rating, &projection, now);
        } else if card.ctype == CardType::Review {
            if card.memory_state.is_none() {
                return Err(ScheduleError::MissingMemoryState(card.id));
            }
            self.answer_review(&mut updated, rating, &projection, now);
        } else {
            // No steps configured: graduate straight through the memory
            // model for any rating.
            self.graduate(&mut updated, rating, &projection, now);
        }

        updated.reps += 1;
        updated.memory_state = Some(projection.for_rating(rating).memory);
        updated.last_review = Some(now);
        updated.mtime = now;

        let leech = leech_fired(self.config.leech_threshold, card.lapses, updated.lapses);
        if leech {
            tracing::info!(card_id = card.id, lapses = updated.lapses, "leech threshold fired");
            if self.config.leech_action == LeechAction::Suspend {
                updated.queue = CardQueue::Suspended;
            }
        }

        let review_log = ReviewLog {
            card_id: card.id,
            reviewed_at: now,
            rating: rating.to_value(),
            kind: self.review_kind(card, rating),
            interval_before: card.interval,
            interval_after: updated.interval,
            ease_factor: updated.ease_factor,
            memory_state: updated.memory_state,
        };

        Ok(AnswerOutcome {
            card: updated,
            review_log,
            leech_fired: leech,
        })
    }

    /// Bury the answered card's siblings for the rest of the session.
    /// `answered` is the pre-answer snapshot of the card that was shown.
    pub fn bury_siblings(
        &self,
        answered: &Card,
        cards: &mut [Card],
        state: &mut SiblingBuryState,
    ) -> Vec<CardId> {
        bury_siblings_after_answer(answered, cards, state, &self.config)
    }

    /// Preview the delay each rating would produce, without mutating the
    /// card or advancing any counter.
    pub fn button_intervals(&self, card: &Card, now: DateTime<Utc>) -> ButtonIntervals {
        let projection = self
            .memory
            .project(card.memory_state, card.days_since_last_review(now));
        let delay = |rating| format_duration(self.preview_delay_secs(card, rating, &projection));
        ButtonIntervals {
            again: delay(Rating::Again),
            hard: delay(Rating::Hard),
            good: delay(Rating::Good),
            easy: delay(Rating::Easy),
        }
    }

    /// Relearn steps apply once a card has lapsed; learn steps before that.
    fn steps_for(&self, card: &Card) -> LearningSteps<'_> {
        if card.ctype == CardType::Relearn || card.lapses > 0 {
            LearningSteps::new(&self.config.relearn_steps)
        } else {
            LearningSteps::new(&self.config.learn_steps)
        }
    }

    fn in_stepped_phase(&self, card: &Card) -> bool {
        matches!(
            card.ctype,
            CardType::New | CardType::Learn | CardType::Relearn
        ) && !self.steps_for(card).is_empty()
    }

    /// Remaining-steps counter, treating a still-new card as freshly entered.
    fn remaining_for(&self, card: &Card, steps: LearningSteps<'_>) -> u32 {
        if card.ctype == CardType::New {
            steps.full_count()
        } else {
            card.remaining_steps
        }
    }

    fn answer_stepped(
        &self,
        card: &mut Card,
        rating: Rating,
        projection: &SchedulingStates,
        now: DateTime<Utc>,
    ) {
        let steps = self.steps_for(card);
        let remaining = self.remaining_for(card, steps);
        match rating {
            Rating::Again => {
                card.ctype = if card.lapses > 0 {
                    CardType::Relearn
                } else {
                    CardType::Learn
                };
                card.remaining_steps = steps.full_count();
                let delay = steps.again_delay_secs().unwrap_or(DEFAULT_STEP_SECS);
                self.place_in_learning(card, delay, now);
            }
            Rating::Hard => {
                if card.ctype == CardType::New {
                    card.ctype = CardType::Learn;
                    card.remaining_steps = remaining;
                }
                let delay = steps.hard_delay_secs(remaining).unwrap_or(DEFAULT_STEP_SECS);
                self.place_in_learning(card, delay, now);
            }
            Rating::Good => match steps.good_delay_secs(remaining) {
                Some(delay) => {
                    if card.ctype == CardType::New {
                        card.ctype = CardType::Learn;
                    }
                    card.remaining_steps = steps.remaining_after_good(remaining);
                    self.place_in_learning(card, delay, now);
                }
                None => self.graduate(card, rating, projection, now),
            },
            Rating::Easy => self.graduate(card, rating, projection, now),
        }
    }

    fn answer_review(
        &self,
        card: &mut Card,
        rating: Rating,
        projection: &SchedulingStates,
        now: DateTime<Utc>,
    ) {
        let relearn = LearningSteps::new(&self.config.relearn_steps);
        if rating == Rating::Again && !relearn.is_empty() {
            // Failed review: drop into the relearning ladder.
            card.ctype = CardType::Relearn;
            card.remaining_steps = relearn.full_count();
            card.interval = projection.again.scheduled_days.max(1);
            let delay = relearn.again_delay_secs().unwrap_or(DEFAULT_STEP_SECS);
            self.place_in_learning(card, delay, now);
            card.ease_factor = adjust_ease(card.ease_factor, Rating::Again);
            card.lapses += 1;
        } else {
            let projected = projection.for_rating(rating);
            card.interval = projected.scheduled_days.max(1);
            card.due = days_since_epoch(now) + card.interval as i64;
            card.queue = CardQueue::Review;
            card.ease_factor = adjust_ease(card.ease_factor, rating);
            if rating == Rating::Again {
                card.lapses += 1;
            }
        }
    }

    /// Exit the learning ladder into review scheduling.
    fn graduate(
        &self,
        card: &mut Card,
        rating: Rating,
        projection: &SchedulingStates,
        now: DateTime<Utc>,
    ) {
        card.interval = self.graduation_interval(rating, projection);
        card.ctype = CardType::Review;
        card.queue = CardQueue::Review;
        card.due = days_since_epoch(now) + card.interval as i64;
        card.ease_factor = graduation_ease(card.ease_factor, self.config.initial_ease, rating);
        card.remaining_steps = 0;
    }

    fn graduation_interval(&self, rating: Rating, projection: &SchedulingStates) -> u32 {
        let floor = if rating == Rating::Easy {
            self.config.graduating_interval_easy
        } else {
            self.config.graduating_interval_good
        };
        projection.for_rating(rating).scheduled_days.max(floor)
    }

    /// Sub-day delays wait in the intraday queue on a unix-seconds due;
    /// day-or-longer delays wait in the interday queue on a day number.
    fn place_in_learning(&self, card: &mut Card, delay_secs: u32, now: DateTime<Utc>) {
        if (delay_secs as i64) < SECS_PER_DAY {
            card.queue = CardQueue::Learn;
            card.due = now.timestamp() + delay_secs as i64;
        } else {
            card.queue = CardQueue::DayLearn;
            card.due = days_since_epoch(now) + delay_secs as i64 / SECS_PER_DAY;
        }
    }

    fn review_kind(&self, card: &Card, rating: Rating) -> ReviewKind {
        match card.ctype {
            CardType::New | CardType::Learn => ReviewKind::Learning,
            CardType::Relearn => ReviewKind::Relearning,
            CardType::Review => {
                if rating == Rating::Again && !self.config.relearn_steps.is_empty() {
                    ReviewKind::Relearning
                } else {
                    ReviewKind::Review
                }
            }
        }
    }

    fn preview_delay_secs(
        &self,
        card: &Card,
        rating: Rating,
        projection: &SchedulingStates,
    ) -> i64 {
        let graduation_secs =
            |rating| self.graduation_interval(rating, projection) as i64 * SECS_PER_DAY;
        if self.in_stepped_phase(card) {
            let steps = self.steps_for(card);
            let remaining = self.remaining_for(card, steps);
            match rating {
                Rating::Again => steps.again_delay_secs().unwrap_or(DEFAULT_STEP_SECS) as i64,
                Rating::Hard => {
                    steps.hard_delay_secs(remaining).unwrap_or(DEFAULT_STEP_SECS) as i64
                }
                Rating::Good => match steps.good_delay_secs(remaining) {
                    Some(delay) => delay as i64,
                    None => graduation_secs(rating),
                },
                Rating::Easy => graduation_secs(rating),
            }
        } else if card.ctype == CardType::Review {
            let relearn = LearningSteps::new(&self.config.relearn_steps);
            if rating == Rating::Again && !relearn.is_empty() {
                relearn.again_delay_secs().unwrap_or(DEFAULT_STEP_SECS) as i64
            } else {
                projection.for_rating(rating).scheduled_days.max(1) as i64 * SECS_PER_DAY
            }
        } else {
            graduation_secs(rating)
        }
    }
}

/// Format a duration for answer-button display: seconds under a minute,
/// minutes under an hour, hours under a day, days under a month, months
/// under a year, years beyond, at most one decimal place.
pub fn format_duration(secs: i64) -> String {
    const HOUR: f64 = 3600.0;
    const DAY: f64 = 86_400.0;
    let secs = secs.max(0) as f64;
    if secs < 60.0 {
        format_unit(secs, "s")
    } else if secs < HOUR {
        format_unit(secs / 60.0, "m")
    } else if secs < DAY {
        format_unit(secs / HOUR, "h")
    } else if secs < 30.0 * DAY {
        format_unit(secs / DAY, "d")
    } else if secs < 365.0 * DAY {
        format_unit(secs / (30.0 * DAY), "mo")
    } else {
        format_unit(secs / (365.0 * DAY), "y")
    }
}

fn format_unit(value: f64, unit: &str) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}{}", rounded as i64, unit)
    } else {
        format!("{:.1}{}", rounded, unit)
    }
}
