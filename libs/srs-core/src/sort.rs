//! Deterministic card ordering.
//!
//! All shuffled orders hash with a per-day salt instead of a random source:
//! ordering is stable within a day, reshuffles across days, and two builds
//! from identical inputs always agree.

use std::cmp::Ordering;

use crate::config::{NewCardOrder, ReviewCardOrder};
use crate::types::Card;

/// 64-bit FNV-1a over the little-endian bytes of each value.
fn fnv1a_64(values: &[u64]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET_BASIS;
    for value in values {
        for byte in value.to_le_bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(PRIME);
        }
    }
    hash
}

/// Salted per-day hash used for shuffled orders and tie-breaking.
pub(crate) fn salted_hash(id: i64, salt: u32) -> u64 {
    fnv1a_64(&[id as u64, salt as u64])
}

pub(crate) fn sort_new_cards(cards: &mut [Card], order: NewCardOrder, salt: u32) {
    match order {
        NewCardOrder::Added => cards.sort_by_key(|card| card.id),
        NewCardOrder::Random => cards.sort_by(|a, b| {
            salted_hash(a.id, salt)
                .cmp(&salted_hash(b.id, salt))
                .then_with(|| a.id.cmp(&b.id))
        }),
        NewCardOrder::RandomNote => cards.sort_by(|a, b| {
            salted_hash(a.note_id, salt)
                .cmp(&salted_hash(b.note_id, salt))
                .then_with(|| a.id.cmp(&b.id))
        }),
    }
}

pub(crate) fn sort_review_cards(
    cards: &mut [Card],
    order: ReviewCardOrder,
    salt: u32,
    today: i64,
) {
    cards.sort_by(|a, b| review_cmp(a, b, order, salt, today));
}

fn review_cmp(a: &Card, b: &Card, order: ReviewCardOrder, salt: u32, today: i64) -> Ordering {
    let primary = match order {
        ReviewCardOrder::Day => a.due.cmp(&b.due),
        ReviewCardOrder::DayThenDeck => a.due.cmp(&b.due).then(a.deck_id.cmp(&b.deck_id)),
        ReviewCardOrder::DeckThenDay => a.deck_id.cmp(&b.deck_id).then(a.due.cmp(&b.due)),
        ReviewCardOrder::IntervalsAscending => a.interval.cmp(&b.interval),
        ReviewCardOrder::IntervalsDescending => b.interval.cmp(&a.interval),
        ReviewCardOrder::EaseAscending => ease_key(a).total_cmp(&ease_key(b)),
        ReviewCardOrder::EaseDescending => ease_key(b).total_cmp(&ease_key(a)),
        ReviewCardOrder::RelativeOverdueness => {
            overdueness_key(a, today).total_cmp(&overdueness_key(b, today))
        }
        ReviewCardOrder::Random => Ordering::Equal,
        ReviewCardOrder::Added => a.id.cmp(&b.id),
        ReviewCardOrder::ReverseAdded => b.id.cmp(&a.id),
    };
    // Identical keys fall back to the salted hash so every order is total
    // and deterministic, and Random is nothing but the fallback.
    primary
        .then_with(|| salted_hash(a.id, salt).cmp(&salted_hash(b.id, salt)))
        .then_with(|| a.id.cmp(&b.id))
}

/// Legacy ease, or inverted difficulty once a memory state exists (lower
/// difficulty means easier, so the direction flips).
fn ease_key(card: &Card) -> f64 {
    match card.memory_state {
        Some(memory) => -memory.difficulty,
        None => card.ease_factor as f64 / 1000.0,
    }
}

/// Most-overdue-first sort key; lower sorts first.
fn overdueness_key(card: &Card, today: i64) -> f64 {
    let interval = card.interval.max(1) as f64;
    let elapsed = (today - card.due) as f64 + interval;
    match card.memory_state {
        // Approximate retrievability.
        Some(memory) => 0.9_f64.powf(elapsed / memory.stability.max(0.1)),
        None => -(1.0 + (elapsed + 0.001) / interval),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FsrsMemoryState;
    use pretty_assertions::assert_eq;

    fn review_card(id: i64, due: i64, interval: u32, ease: u16) -> Card {
        let mut card = Card::new(id, id, 1, 0);
        card.due = due;
        card.interval = interval;
        card.ease_factor = ease;
        card
    }

    fn ids(cards: &[Card]) -> Vec<i64> {
        cards.iter().map(|card| card.id).collect()
    }

    #[test]
    fn added_order_sorts_by_id() {
        let mut cards = vec![
            review_card(3, 0, 1, 2500),
            review_card(1, 0, 1, 2500),
            review_card(2, 0, 1, 2500),
        ];
        sort_new_cards(&mut cards, NewCardOrder::Added, 7);
        assert_eq!(ids(&cards), vec![1, 2, 3]);
    }

    #[test]
    fn random_order_is_stable_within_a_day() {
        let mut first: Vec<Card> = (0..50).map(|i| review_card(i, 0, 1, 2500)).collect();
        let mut second = first.clone();
        sort_new_cards(&mut first, NewCardOrder::Random, 42);
        sort_new_cards(&mut second, NewCardOrder::Random, 42);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn random_order_reshuffles_across_days() {
        let mut today: Vec<Card> = (0..50).map(|i| review_card(i, 0, 1, 2500)).collect();
        let mut tomorrow = today.clone();
        sort_new_cards(&mut today, NewCardOrder::Random, 100);
        sort_new_cards(&mut tomorrow, NewCardOrder::Random, 101);
        assert_ne!(ids(&today), ids(&tomorrow));
    }

    #[test]
    fn random_note_order_keeps_siblings_adjacent() {
        let mut cards: Vec<Card> = (0..20)
            .map(|i| {
                let mut card = review_card(i, 0, 1, 2500);
                card.note_id = i / 2;
                card
            })
            .collect();
        sort_new_cards(&mut cards, NewCardOrder::RandomNote, 9);
        let notes: Vec<i64> = cards.iter().map(|card| card.note_id).collect();
        for pair in notes.chunks(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }

    #[test]
    fn intervals_orders_respect_direction() {
        let mut cards = vec![
            review_card(1, 10, 30, 2500),
            review_card(2, 10, 5, 2500),
            review_card(3, 10, 90, 2500),
        ];
        sort_review_cards(&mut cards, ReviewCardOrder::IntervalsAscending, 1, 10);
        assert_eq!(ids(&cards), vec![2, 1, 3]);
        sort_review_cards(&mut cards, ReviewCardOrder::IntervalsDescending, 1, 10);
        assert_eq!(ids(&cards), vec![3, 1, 2]);
    }

    #[test]
    fn ease_ascending_puts_low_ease_first() {
        let mut cards = vec![
            review_card(1, 10, 10, 2800),
            review_card(2, 10, 10, 1300),
            review_card(3, 10, 10, 2100),
        ];
        sort_review_cards(&mut cards, ReviewCardOrder::EaseAscending, 1, 10);
        assert_eq!(ids(&cards), vec![2, 3, 1]);
    }

    #[test]
    fn ease_orders_invert_with_memory_state() {
        let with_difficulty = |id, difficulty| {
            let mut card = review_card(id, 10, 10, 2500);
            card.memory_state = Some(FsrsMemoryState {
                stability: 10.0,
                difficulty,
            });
            card
        };
        // High difficulty means low ease, so it sorts first when ascending.
        let mut cards = vec![with_difficulty(1, 2.0), with_difficulty(2, 8.0)];
        sort_review_cards(&mut cards, ReviewCardOrder::EaseAscending, 1, 10);
        assert_eq!(ids(&cards), vec![2, 1]);
        sort_review_cards(&mut cards, ReviewCardOrder::EaseDescending, 1, 10);
        assert_eq!(ids(&cards), vec![1, 2]);
    }

    #[test]
    fn relative_overdueness_puts_most_overdue_first() {
        // Card 1: 10 days late on a 10-day interval. Card 2: 1 day late on a
        // 100-day interval.
        let mut cards = vec![
            review_card(2, 9, 100, 2500),
            review_card(1, 0, 10, 2500),
        ];
        sort_review_cards(&mut cards, ReviewCardOrder::RelativeOverdueness, 1, 10);
        assert_eq!(ids(&cards), vec![1, 2]);
    }

    #[test]
    fn relative_overdueness_uses_retrievability_with_memory_state() {
        let with_stability = |id, due, interval, stability| {
            let mut card = review_card(id, due, interval, 2500);
            card.memory_state = Some(FsrsMemoryState {
                stability,
                difficulty: 5.0,
            });
            card
        };
        // Lower projected recall sorts first.
        let mut cards = vec![
            with_stability(1, 0, 10, 100.0),
            with_stability(2, 0, 10, 5.0),
        ];
        sort_review_cards(&mut cards, ReviewCardOrder::RelativeOverdueness, 1, 10);
        assert_eq!(ids(&cards), vec![2, 1]);
    }

    #[test]
    fn equal_keys_break_ties_deterministically() {
        let mut first: Vec<Card> = (0..30).map(|i| review_card(i, 5, 10, 2500)).collect();
        let mut second = first.clone();
        sort_review_cards(&mut first, ReviewCardOrder::Day, 3, 10);
        sort_review_cards(&mut second, ReviewCardOrder::Day, 3, 10);
        assert_eq!(ids(&first), ids(&second));
        // All dues equal: the salted hash decides, not insertion order.
        let mut reversed: Vec<Card> = (0..30).rev().map(|i| review_card(i, 5, 10, 2500)).collect();
        sort_review_cards(&mut reversed, ReviewCardOrder::Day, 3, 10);
        assert_eq!(ids(&first), ids(&reversed));
    }
}
