//! Default memory model: the 19-weight FSRS curve family.
//!
//! DSR model: difficulty (D, 1-10), stability (S, days until recall drops to
//! the target retention), retrievability (R, probability of recall).

use super::{MemoryModel, ProjectedState, SchedulingStates};
use crate::config::{validate_params, validate_retention, FSRS_PARAM_COUNT};
use crate::error::ConfigError;
use crate::types::FsrsMemoryState;

/// Power-curve constants, chosen so R(t = S) = 0.9.
const DECAY: f64 = -0.5;
const FACTOR: f64 = 19.0 / 81.0;
const S_MIN: f64 = 0.1;

/// FSRS projection with validated weights and target retention.
#[derive(Debug, Clone)]
pub struct FsrsMemoryModel {
    w: [f64; FSRS_PARAM_COUNT],
    desired_retention: f64,
    maximum_interval: u32,
}

impl FsrsMemoryModel {
    /// Build a model from raw weights. Fails fast on malformed parameters or
    /// an out-of-range retention target.
    pub fn new(
        params: &[f64],
        desired_retention: f64,
        maximum_interval: u32,
    ) -> Result<Self, ConfigError> {
        validate_params(params)?;
        validate_retention(desired_retention)?;
        let mut w = [0.0; FSRS_PARAM_COUNT];
        w.copy_from_slice(params);
        Ok(Self {
            w,
            desired_retention,
            maximum_interval,
        })
    }

    /// Initial stability for an unseen card: S0(G) = w[G-1].
    fn initial_stability(&self, rating: u8) -> f64 {
        self.w[(rating - 1) as usize].max(S_MIN)
    }

    /// Initial difficulty for an unseen card:
    /// D0(G) = w4 - e^(w5 * (G - 1)) + 1.
    fn initial_difficulty(&self, rating: u8) -> f64 {
        let g = rating as f64;
        (self.w[4] - (self.w[5] * (g - 1.0)).exp() + 1.0).clamp(1.0, 10.0)
    }

    /// Next difficulty: linear-damped delta plus mean reversion toward the
    /// Easy-start difficulty.
    /// D' = D - w6 * (G - 3) * (10 - D) / 9, then
    /// D'' = w7 * D0(4) + (1 - w7) * D'.
    fn next_difficulty(&self, difficulty: f64, rating: u8) -> f64 {
        let g = rating as f64;
        let delta = -self.w[6] * (g - 3.0);
        let damped = difficulty + delta * (10.0 - difficulty) / 9.0;
        let reverted = self.w[7] * self.initial_difficulty(4) + (1.0 - self.w[7]) * damped;
        reverted.clamp(1.0, 10.0)
    }

    /// Probability of recall `elapsed_days` after the last review.
    /// R = (1 + FACTOR * t / S)^DECAY.
    fn retrievability(&self, elapsed_days: f64, stability: f64) -> f64 {
        (1.0 + FACTOR * elapsed_days / stability.max(S_MIN)).powf(DECAY)
    }

    /// Interval satisfying the target retention, clamped to
    /// [1, maximum_interval] whole days.
    fn next_interval(&self, stability: f64) -> u32 {
        let days = stability / FACTOR * (self.desired_retention.powf(1.0 / DECAY) - 1.0);
        days.round().clamp(1.0, self.maximum_interval as f64) as u32
    }

    /// Next stability after successful recall.
    /// S' = S * (e^w8 * (11 - D) * S^-w9 * (e^(w10 * (1 - R)) - 1)
    ///          * penalty * bonus + 1).
    fn next_stability_recall(
        &self,
        stability: f64,
        difficulty: f64,
        retrievability: f64,
        rating: u8,
    ) -> f64 {
        let hard_penalty = if rating == 2 { self.w[15] } else { 1.0 };
        let easy_bonus = if rating == 4 { self.w[16] } else { 1.0 };
        let growth = self.w[8].exp()
            * (11.0 - difficulty)
            * stability.powf(-self.w[9])
            * ((self.w[10] * (1.0 - retrievability)).exp() - 1.0)
            * hard_penalty
            * easy_bonus
            + 1.0;
        (stability * growth).max(S_MIN)
    }

    /// Next stability after forgetting. Never exceeds the prior stability.
    /// S' = w11 * D^-w12 * ((S + 1)^w13 - 1) * e^(w14 * (1 - R)).
    fn next_stability_forget(&self, stability: f64, difficulty: f64, retrievability: f64) -> f64 {
        let next = self.w[11]
            * difficulty.powf(-self.w[12])
            * ((stability + 1.0).powf(self.w[13]) - 1.0)
            * (self.w[14] * (1.0 - retrievability)).exp();
        next.clamp(S_MIN, stability)
    }

    /// Same-day stability update: S' = S * e^(w17 * (G - 3 + w18)).
    fn short_term_stability(&self, stability: f64, rating: u8) -> f64 {
        let g = rating as f64;
        (stability * (self.w[17] * (g - 3.0 + self.w[18])).exp()).max(S_MIN)
    }

    fn project_rating(
        &self,
        state: Option<FsrsMemoryState>,
        days_elapsed: u32,
        rating: u8,
    ) -> ProjectedState {
        let memory = match state {
            None => FsrsMemoryState {
                stability: self.initial_stability(rating),
                difficulty: self.initial_difficulty(rating),
            },
            Some(current) => {
                let stability = if days_elapsed == 0 {
                    self.short_term_stability(current.stability, rating)
                } else {
                    let r = self.retrievability(days_elapsed as f64, current.stability);
                    if rating == 1 {
                        self.next_stability_forget(current.stability, current.difficulty, r)
                    } else {
                        self.next_stability_recall(current.stability, current.difficulty, r, rating)
                    }
                };
                FsrsMemoryState {
                    stability,
                    difficulty: self.next_difficulty(current.difficulty, rating),
                }
            }
        };
        ProjectedState {
            scheduled_days: self.next_interval(memory.stability),
            memory,
        }
    }
}

impl MemoryModel for FsrsMemoryModel {
    fn project(&self, state: Option<FsrsMemoryState>, days_elapsed: u32) -> SchedulingStates {
        SchedulingStates {
            again: self.project_rating(state, days_elapsed, 1),
            hard: self.project_rating(state, days_elapsed, 2),
            good: self.project_rating(state, days_elapsed, 3),
            easy: self.project_rating(state, days_elapsed, 4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FSRS_PARAMS;
    use pretty_assertions::assert_eq;

    fn model() -> FsrsMemoryModel {
        FsrsMemoryModel::new(&DEFAULT_FSRS_PARAMS, 0.9, 36_500).unwrap()
    }

    fn reviewed_state() -> FsrsMemoryState {
        FsrsMemoryState {
            stability: 10.0,
            difficulty: 5.0,
        }
    }

    #[test]
    fn rejects_wrong_parameter_count() {
        let result = FsrsMemoryModel::new(&[0.4; 17], 0.9, 36_500);
        assert!(matches!(
            result,
            Err(ConfigError::WrongParamCount { got: 17, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_retention() {
        let result = FsrsMemoryModel::new(&DEFAULT_FSRS_PARAMS, 1.0, 36_500);
        assert_eq!(result.unwrap_err(), ConfigError::RetentionOutOfRange(1.0));
    }

    #[test]
    fn initial_stability_increases_with_rating() {
        let m = model();
        let states = m.project(None, 0);
        assert!(states.again.memory.stability < states.hard.memory.stability);
        assert!(states.hard.memory.stability < states.good.memory.stability);
        assert!(states.good.memory.stability < states.easy.memory.stability);
    }

    #[test]
    fn initial_difficulty_decreases_with_rating() {
        let m = model();
        let states = m.project(None, 0);
        assert!(states.again.memory.difficulty > states.hard.memory.difficulty);
        assert!(states.hard.memory.difficulty > states.good.memory.difficulty);
        assert!(states.good.memory.difficulty > states.easy.memory.difficulty);
    }

    #[test]
    fn stability_grows_on_recall_and_shrinks_on_forget() {
        let m = model();
        let states = m.project(Some(reviewed_state()), 10);
        assert!(states.good.memory.stability > 10.0);
        assert!(states.again.memory.stability < 10.0);
    }

    #[test]
    fn hard_penalty_and_easy_bonus_order_stability() {
        let m = model();
        let states = m.project(Some(reviewed_state()), 10);
        assert!(states.hard.memory.stability < states.good.memory.stability);
        assert!(states.good.memory.stability < states.easy.memory.stability);
    }

    #[test]
    fn difficulty_stays_within_bounds() {
        let m = model();
        for difficulty in [1.0, 10.0] {
            let state = FsrsMemoryState {
                stability: 5.0,
                difficulty,
            };
            let states = m.project(Some(state), 5);
            for projected in [states.again, states.hard, states.good, states.easy] {
                assert!(projected.memory.difficulty >= 1.0);
                assert!(projected.memory.difficulty <= 10.0);
            }
        }
    }

    #[test]
    fn same_day_review_uses_short_term_curve() {
        let m = model();
        let states = m.project(Some(reviewed_state()), 0);
        // Below-Good same-day answers shrink stability, above-Good grow it.
        assert!(states.again.memory.stability < 10.0);
        assert!(states.easy.memory.stability > 10.0);
    }

    #[test]
    fn retrievability_is_ninety_percent_at_stability() {
        let m = model();
        let r = m.retrievability(10.0, 10.0);
        assert!((r - 0.9).abs() < 1e-9);
    }

    #[test]
    fn interval_respects_maximum() {
        let m = FsrsMemoryModel::new(&DEFAULT_FSRS_PARAMS, 0.9, 365).unwrap();
        let state = FsrsMemoryState {
            stability: 50_000.0,
            difficulty: 5.0,
        };
        let states = m.project(Some(state), 100);
        assert!(states.easy.scheduled_days <= 365);
    }

    #[test]
    fn interval_matches_stability_at_ninety_percent_retention() {
        // At retention 0.9 the predicted interval equals the stability.
        let m = model();
        let days = m.next_interval(10.0);
        assert_eq!(days, 10);
    }

    #[test]
    fn projection_is_deterministic() {
        let m = model();
        let a = m.project(Some(reviewed_state()), 7);
        let b = m.project(Some(reviewed_state()), 7);
        assert_eq!(a, b);
    }
}
