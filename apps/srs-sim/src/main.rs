//! Deterministic study-session simulator.
//!
//! Builds a demo deck, walks a few simulated days of reviews with a fixed
//! rating script, and prints queue counts and button previews. Useful for
//! eyeballing scheduler behavior without a UI; output is reproducible
//! because the clock is fixed and all ordering is salted-hash based.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use srs_core::{build_queue, Card, CardQueue, Deck, Scheduler, SiblingBuryState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_DAYS: u32 = 5;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut deck = demo_deck();
    let scheduler = Scheduler::new(deck.config.clone())?;
    // Fixed epoch keeps every run identical.
    let start = Utc
        .timestamp_opt(1_700_000_000, 0)
        .single()
        .expect("valid fixed timestamp");

    for day in 0..SESSION_DAYS {
        let now = start + Duration::days(day as i64);
        run_day(&scheduler, &mut deck, now, day)?;
    }

    println!("\nfinal card states:");
    for card in &deck.cards {
        println!(
            "  card {:>2}  note {:>3}  {:?}/{:?}  interval {:>2}d  ease {}  reps {}  lapses {}",
            card.id,
            card.note_id,
            card.ctype,
            card.queue,
            card.interval,
            card.ease_factor,
            card.reps,
            card.lapses,
        );
    }
    Ok(())
}

fn demo_deck() -> Deck {
    let mut deck = Deck::new(1, "demo");
    deck.config.bury_new = true;
    // Two sibling cards per note.
    for note in 0..6 {
        for side in 0..2 {
            let id = note * 2 + side + 1;
            deck.cards.push(Card::new(id, note + 100, deck.id, id as u32));
        }
    }
    deck
}

fn run_day(scheduler: &Scheduler, deck: &mut Deck, mut now: DateTime<Utc>, day: u32) -> Result<()> {
    srs_core::unbury_cards(&mut deck.cards);
    let mut bury_state = SiblingBuryState::new();
    let queue = build_queue(deck, now, day);
    println!(
        "day {}: {} new, {} learning, {} review",
        day, queue.counts.new, queue.counts.learning, queue.counts.review
    );

    for entry in &queue.entries {
        let shown = entry.card.clone();
        // A sibling answered earlier in the session may have buried this one.
        if is_buried(deck, shown.id) {
            continue;
        }
        let preview = scheduler.button_intervals(&shown, now);
        // Struggle with every third note, breeze through the rest.
        let rating = if shown.note_id % 3 == 0 { 1 } else { 3 };
        let outcome = scheduler.answer_card(&shown, rating, now)?;
        tracing::info!(
            card_id = shown.id,
            rating,
            again = %preview.again,
            good = %preview.good,
            "answered"
        );
        merge(deck, outcome.card);
        scheduler.bury_siblings(&shown, &mut deck.cards, &mut bury_state);
        now = now + Duration::seconds(30);
    }

    // Clear the intraday learning queue before the day ends.
    loop {
        now = now + Duration::minutes(10);
        let rebuilt = build_queue(deck, now, day);
        let due: Vec<Card> = rebuilt
            .intraday_due_now()
            .map(|entry| entry.card.clone())
            .collect();
        if due.is_empty() {
            break;
        }
        for card in due {
            let outcome = scheduler.answer_card(&card, 3, now)?;
            merge(deck, outcome.card);
        }
    }
    Ok(())
}

fn is_buried(deck: &Deck, id: i64) -> bool {
    deck.cards
        .iter()
        .any(|card| card.id == id && card.queue == CardQueue::SchedBuried)
}

fn merge(deck: &mut Deck, updated: Card) {
    if let Some(slot) = deck.cards.iter_mut().find(|card| card.id == updated.id) {
        *slot = updated;
    }
}
