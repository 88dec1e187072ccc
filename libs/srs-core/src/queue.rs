//! Study queue building: gather, sort, interleave.
//!
//! A build takes a deck snapshot plus the caller's clock and day counter and
//! returns an ordered queue. Given identical inputs the result is
//! byte-for-byte reproducible; study sessions must be resumable and
//! reproducible for testing and sync reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Deck;
use crate::sort::{sort_new_cards, sort_review_cards};
use crate::types::{days_since_epoch, Card, CardQueue, SECS_PER_DAY};

/// Category a main-queue entry was gathered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    New,
    Review,
    Learning,
}

/// One card in the main study queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub card: Card,
    pub kind: QueueKind,
}

/// An intraday learning card and its due time in unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningEntry {
    pub card: Card,
    pub due: i64,
}

/// Card counts per category at build time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub new: usize,
    pub learning: usize,
    pub review: usize,
}

/// Ordered study queue for one session.
///
/// Intraday learning cards sit in a side queue because their due times are
/// time-of-day-sensitive: re-check them through the cutoff accessors as the
/// session progresses. The cutoff clock only moves when the caller calls
/// [`StudyQueue::update_learning_cutoff`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyQueue {
    pub entries: Vec<QueueEntry>,
    /// Intraday learning cards, ascending by due.
    pub intraday: Vec<LearningEntry>,
    pub counts: Counts,
    learning_cutoff: i64,
    learn_ahead_secs: i64,
}

impl StudyQueue {
    pub fn learning_cutoff(&self) -> i64 {
        self.learning_cutoff
    }

    /// Advance the cutoff clock; the engine never polls time on its own.
    pub fn update_learning_cutoff(&mut self, now: DateTime<Utc>) {
        self.learning_cutoff = now.timestamp();
    }

    /// Intraday learning cards due right now.
    pub fn intraday_due_now(&self) -> impl Iterator<Item = &LearningEntry> {
        self.intraday
            .iter()
            .filter(|entry| entry.due <= self.learning_cutoff)
    }

    /// Intraday learning cards inside the look-ahead window.
    pub fn intraday_due_soon(&self) -> impl Iterator<Item = &LearningEntry> {
        let limit = self.learning_cutoff + self.learn_ahead_secs;
        self.intraday
            .iter()
            .filter(move |entry| entry.due > self.learning_cutoff && entry.due <= limit)
    }
}

/// Gather, sort, and interleave a deck's due cards into a study queue.
///
/// `days_elapsed` is the caller's day counter; it salts the shuffled orders
/// so ordering is stable within a day and reshuffles across days. Cards that
/// fail their due check are simply omitted, never an error.
pub fn build_queue(deck: &Deck, now: DateTime<Utc>, days_elapsed: u32) -> StudyQueue {
    let config = &deck.config;
    let now_secs = now.timestamp();
    let today = days_since_epoch(now);

    let mut new_cards = Vec::new();
    let mut intraday = Vec::new();
    let mut day_learning = Vec::new();
    let mut reviews = Vec::new();

    for card in &deck.cards {
        match card.queue {
            CardQueue::New => new_cards.push(card.clone()),
            CardQueue::Learn | CardQueue::PreviewRepeat => {
                if card.due < now_secs + SECS_PER_DAY {
                    intraday.push(card.clone());
                }
            }
            CardQueue::DayLearn => {
                if card.due <= today {
                    day_learning.push(card.clone());
                }
            }
            CardQueue::Review => {
                if card.due <= today {
                    reviews.push(card.clone());
                }
            }
            // Suspended and buried cards are never gathered.
            _ => {}
        }
    }

    sort_new_cards(&mut new_cards, config.new_card_order, days_elapsed);
    new_cards.truncate(config.new_per_day as usize);
    sort_review_cards(&mut reviews, config.review_order, days_elapsed, today);
    reviews.truncate(config.reviews_per_day as usize);
    intraday.sort_by_key(|card| (card.due, card.id));
    day_learning.sort_by_key(|card| (card.due, card.id));

    let counts = Counts {
        new: new_cards.len(),
        learning: intraday.len() + day_learning.len(),
        review: reviews.len(),
    };
    tracing::debug!(
        new = counts.new,
        learning = counts.learning,
        review = counts.review,
        "study queue built"
    );

    let reviews: Vec<QueueEntry> = reviews
        .into_iter()
        .map(|card| QueueEntry {
            card,
            kind: QueueKind::Review,
        })
        .collect();
    let day_learning: Vec<QueueEntry> = day_learning
        .into_iter()
        .map(|card| QueueEntry {
            card,
            kind: QueueKind::Learning,
        })
        .collect();
    let new_entries: Vec<QueueEntry> = new_cards
        .into_iter()
        .map(|card| QueueEntry {
            card,
            kind: QueueKind::New,
        })
        .collect();

    // Day-learning cards join the review stream first, then new cards join
    // the combined stream.
    let combined: Vec<QueueEntry> =
        Intersperser::new(reviews.into_iter(), day_learning.into_iter()).collect();
    let entries: Vec<QueueEntry> =
        Intersperser::new(combined.into_iter(), new_entries.into_iter()).collect();

    StudyQueue {
        entries,
        intraday: intraday
            .into_iter()
            .map(|card| LearningEntry {
                due: card.due,
                card,
            })
            .collect(),
        counts,
        learning_cutoff: now_secs,
        learn_ahead_secs: config.learn_ahead_secs,
    }
}

/// Ratio-preserving merge of a base stream and an inserted stream.
///
/// The ratio `(len(a) + 1) / (len(b) + 1)` is fixed up front; each step
/// takes from `b` when `(b_index + 1) * ratio < a_index + 1`, otherwise
/// from `a`. This spreads the sparser stream evenly instead of batching
/// either kind together.
pub struct Intersperser<A, B>
where
    A: Iterator,
    B: Iterator,
{
    a: A,
    b: B,
    ratio: f64,
    a_index: usize,
    b_index: usize,
}

impl<T, A, B> Intersperser<A, B>
where
    A: ExactSizeIterator<Item = T>,
    B: ExactSizeIterator<Item = T>,
{
    pub fn new(a: A, b: B) -> Self {
        let ratio = (a.len() + 1) as f64 / (b.len() + 1) as f64;
        Self {
            a,
            b,
            ratio,
            a_index: 0,
            b_index: 0,
        }
    }
}

impl<T, A, B> Iterator for Intersperser<A, B>
where
    A: ExactSizeIterator<Item = T>,
    B: ExactSizeIterator<Item = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let take_b = ((self.b_index + 1) as f64) * self.ratio < (self.a_index + 1) as f64;
        if take_b {
            match self.b.next() {
                Some(item) => {
                    self.b_index += 1;
                    Some(item)
                }
                None => self.a.next(),
            }
        } else {
            match self.a.next() {
                Some(item) => {
                    self.a_index += 1;
                    Some(item)
                }
                None => self.b.next(),
            }
        }
    }
}
