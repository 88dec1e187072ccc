//! Learning-step delay table.
//!
//! Maps answers to delays within an ordered ladder of step delays (minutes).
//! Graduation (a `None` delay from Good, or any Easy answer) exits the table
//! and hands the card to review scheduling.

const SECS_PER_MINUTE: f32 = 60.0;

/// Borrowing view over one deck's learning or relearning steps.
#[derive(Debug, Clone, Copy)]
pub struct LearningSteps<'a> {
    steps: &'a [f32],
}

impl<'a> LearningSteps<'a> {
    pub fn new(steps: &'a [f32]) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Remaining-steps counter for a card entering the ladder.
    pub fn full_count(&self) -> u32 {
        self.steps.len() as u32
    }

    /// Index of the current step given the remaining-steps counter.
    ///
    /// `remaining` counts the current step, so a stale counter of 0 clamps
    /// to the last step rather than walking off the ladder.
    fn index_for(&self, remaining: u32) -> usize {
        let last = self.steps.len().saturating_sub(1);
        self.steps
            .len()
            .saturating_sub(remaining.max(1) as usize)
            .min(last)
    }

    /// Delay after Again: always restart at the first step.
    pub fn again_delay_secs(&self) -> Option<u32> {
        self.steps.first().map(|&minutes| to_secs(minutes))
    }

    /// Delay after Hard: stay on the current step. On the first step the
    /// delay is the average of the first two steps, or 1.5x the only step.
    pub fn hard_delay_secs(&self, remaining: u32) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        let index = self.index_for(remaining);
        let minutes = if index == 0 {
            match self.steps {
                [only] => only * 1.5,
                [first, second, ..] => (first + second) / 2.0,
                [] => unreachable!(),
            }
        } else {
            self.steps[index]
        };
        Some(to_secs(minutes))
    }

    /// Delay after Good: advance to the next step. `None` signals
    /// graduation.
    pub fn good_delay_secs(&self, remaining: u32) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        self.steps
            .get(self.index_for(remaining) + 1)
            .map(|&minutes| to_secs(minutes))
    }

    /// Remaining-steps counter after a Good answer advanced the ladder.
    pub fn remaining_after_good(&self, remaining: u32) -> u32 {
        (self.steps.len() - self.index_for(remaining)).saturating_sub(1) as u32
    }
}

fn to_secs(minutes: f32) -> u32 {
    (minutes * SECS_PER_MINUTE).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn again_always_restarts_at_first_step() {
        let steps = LearningSteps::new(&[1.0, 10.0]);
        assert_eq!(steps.again_delay_secs(), Some(60));
        // Regardless of how far the card had advanced.
        assert_eq!(steps.again_delay_secs(), steps.again_delay_secs());
    }

    #[test]
    fn hard_on_first_step_averages_first_two() {
        let steps = LearningSteps::new(&[1.0, 10.0]);
        // (1 + 10) / 2 = 5.5 minutes.
        assert_eq!(steps.hard_delay_secs(2), Some(330));
    }

    #[test]
    fn hard_on_single_step_uses_one_and_a_half_times() {
        let steps = LearningSteps::new(&[10.0]);
        assert_eq!(steps.hard_delay_secs(1), Some(900));
    }

    #[test]
    fn hard_on_later_step_repeats_current_delay() {
        let steps = LearningSteps::new(&[1.0, 10.0, 30.0]);
        assert_eq!(steps.hard_delay_secs(2), Some(600));
        assert_eq!(steps.hard_delay_secs(1), Some(1800));
    }

    #[test]
    fn good_advances_until_graduation() {
        let steps = LearningSteps::new(&[1.0, 5.0]);
        assert_eq!(steps.good_delay_secs(2), Some(300));
        assert_eq!(steps.remaining_after_good(2), 1);
        // No next step left: graduation.
        assert_eq!(steps.good_delay_secs(1), None);
    }

    #[test]
    fn stale_zero_counter_clamps_to_last_step() {
        let steps = LearningSteps::new(&[1.0, 5.0]);
        assert_eq!(steps.good_delay_secs(0), None);
        assert_eq!(steps.hard_delay_secs(0), Some(300));
    }

    #[test]
    fn empty_ladder_yields_no_delays() {
        let steps = LearningSteps::new(&[]);
        assert!(steps.is_empty());
        assert_eq!(steps.again_delay_secs(), None);
        assert_eq!(steps.hard_delay_secs(1), None);
        assert_eq!(steps.good_delay_secs(1), None);
    }

    #[test]
    fn fractional_minutes_round_to_whole_seconds() {
        let steps = LearningSteps::new(&[0.5]);
        assert_eq!(steps.again_delay_secs(), Some(30));
    }
}
