//! Sibling burying.
//!
//! Cards sharing a note must not co-appear in a session once one of them has
//! been seen, when the deck config enables burying for their queue category.
//! The tracker is per-session state: build it alongside the study queue and
//! drop it when the session ends.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::DeckConfig;
use crate::types::{Card, CardId, CardQueue, CardType, NoteId, SECS_PER_DAY};

/// Which queue categories burying applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuryMode {
    pub bury_new: bool,
    pub bury_reviews: bool,
    pub bury_interday_learning: bool,
}

impl BuryMode {
    pub fn from_config(config: &DeckConfig) -> Self {
        Self {
            bury_new: config.bury_new,
            bury_reviews: config.bury_reviews,
            bury_interday_learning: config.bury_interday_learning,
        }
    }

    fn applies_to(&self, queue: CardQueue) -> bool {
        match queue {
            CardQueue::New => self.bury_new,
            CardQueue::Review => self.bury_reviews,
            CardQueue::DayLearn => self.bury_interday_learning,
            _ => false,
        }
    }
}

/// Per-session map of seen notes to their recorded bury modes.
#[derive(Debug, Default)]
pub struct SiblingBuryState {
    seen: HashMap<NoteId, BuryMode>,
}

impl SiblingBuryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `mode` for `note_id` and return the mode recorded before this
    /// call. The first sighting of a note records and returns `None`; later
    /// sightings return the prior record after OR-merging `mode` into it, so
    /// a stricter sibling seen later still affects any future sibling.
    pub fn get_and_update(&mut self, note_id: NoteId, mode: BuryMode) -> Option<BuryMode> {
        let mut previous = None;
        self.seen
            .entry(note_id)
            .and_modify(|recorded| {
                previous = Some(*recorded);
                recorded.bury_new |= mode.bury_new;
                recorded.bury_reviews |= mode.bury_reviews;
                recorded.bury_interday_learning |= mode.bury_interday_learning;
            })
            .or_insert(mode);
        previous
    }
}

/// Position of a queue in the fixed gather order; `None` for queues that are
/// never gathered.
fn gather_position(queue: CardQueue) -> Option<u8> {
    match queue {
        CardQueue::Learn | CardQueue::PreviewRepeat => Some(0),
        CardQueue::DayLearn => Some(1),
        CardQueue::Review => Some(2),
        CardQueue::New => Some(3),
        _ => None,
    }
}

/// Bury the siblings of an answered card for the rest of the session.
///
/// `answered` is the card as it was when shown (pre-answer queue). Only
/// categories gathered no earlier than the answered card's own queue may be
/// buried. Returns the ids of the cards moved to `SchedBuried`.
pub fn bury_siblings_after_answer(
    answered: &Card,
    cards: &mut [Card],
    state: &mut SiblingBuryState,
    config: &DeckConfig,
) -> Vec<CardId> {
    let mode = BuryMode::from_config(config);
    state.get_and_update(answered.note_id, mode);
    let answered_position = gather_position(answered.queue);

    let mut buried = Vec::new();
    for card in cards.iter_mut() {
        if card.id == answered.id || card.note_id != answered.note_id {
            continue;
        }
        let Some(position) = gather_position(card.queue) else {
            continue;
        };
        if let Some(answered_position) = answered_position {
            if position < answered_position {
                continue;
            }
        }
        let Some(recorded) = state.get_and_update(card.note_id, mode) else {
            continue;
        };
        if recorded.applies_to(card.queue) {
            card.queue = CardQueue::SchedBuried;
            buried.push(card.id);
        }
    }
    if !buried.is_empty() {
        tracing::debug!(
            note_id = answered.note_id,
            count = buried.len(),
            "buried sibling cards"
        );
    }
    buried
}

/// Restore buried cards to the queue implied by their lifecycle type.
/// Typically run once per day rollover. Returns the restored ids.
pub fn unbury_cards(cards: &mut [Card]) -> Vec<CardId> {
    let mut restored = Vec::new();
    for card in cards.iter_mut() {
        if !matches!(
            card.queue,
            CardQueue::SchedBuried | CardQueue::UserBuried
        ) {
            continue;
        }
        card.queue = match card.ctype {
            CardType::New => CardQueue::New,
            // Day-number due values are small; intraday dues are unix stamps.
            CardType::Learn | CardType::Relearn => {
                if card.due < SECS_PER_DAY {
                    CardQueue::DayLearn
                } else {
                    CardQueue::Learn
                }
            }
            CardType::Review => CardQueue::Review,
        };
        restored.push(card.id);
    }
    restored
}
