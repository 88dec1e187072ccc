//! Ease-factor adjustments and leech detection.
//!
//! The ease factor is tracked independently of the memory model's difficulty
//! score, for interval-multiplier display and leech/ease-based sort orders.

use crate::types::Rating;

/// Floor for the fixed-point ease factor (130%).
pub const EASE_FLOOR: u16 = 1300;

const AGAIN_DELTA: u16 = 200;
const HARD_DELTA: u16 = 150;
const EASY_DELTA: u16 = 150;

/// Review-state ease adjustment. Again and Hard decay toward the floor,
/// Easy grows without an upper bound.
pub fn adjust_ease(ease: u16, rating: Rating) -> u16 {
    match rating {
        Rating::Again => ease.saturating_sub(AGAIN_DELTA).max(EASE_FLOOR),
        Rating::Hard => ease.saturating_sub(HARD_DELTA).max(EASE_FLOOR),
        Rating::Good => ease,
        Rating::Easy => ease.saturating_add(EASY_DELTA),
    }
}

/// Ease carried out of the learning ladder. The first graduation seeds from
/// the configured initial ease; Easy graduations get the usual bump on top.
pub fn graduation_ease(current: u16, initial: u16, rating: Rating) -> u16 {
    let base = if current == 0 { initial } else { current };
    if rating == Rating::Easy {
        base.saturating_add(EASY_DELTA)
    } else {
        base
    }
}

/// True when the lapse counter newly crossed a leech firing point.
///
/// Fires at `threshold`, then every `ceil(threshold / 2)` lapses after that.
/// Only the lapse that newly satisfies the rule fires, so re-reviewing an
/// already-leeched card without lapsing stays quiet. A threshold of 0
/// disables detection.
pub fn leech_fired(threshold: u32, lapses_before: u32, lapses_after: u32) -> bool {
    if threshold == 0 || lapses_after <= lapses_before || lapses_after < threshold {
        return false;
    }
    let half = (threshold + 1) / 2;
    (lapses_after - threshold) % half == 0
}
