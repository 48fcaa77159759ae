//! Question generation, answer judging and score keeping.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::Serialize;

use crate::error::TrialError;
use crate::playback::{PlaybackMode, PlaybackPlan, PlaybackTiming};
use crate::theory::{self, IntervalSet, midi_to_frequency};

/// Lowest root note (C3).
pub const ROOT_MIDI_MIN: u8 = 48;
/// Highest root note (C5).
pub const ROOT_MIDI_MAX: u8 = 72;

/// One question: two pitches a known interval apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    pub root_midi: u8,
    pub root_frequency: f64,
    pub target_frequency: f64,
    pub semitones: u8,
}

impl Trial {
    /// Build a trial from a root note and an interval above it.
    pub fn new(root_midi: u8, semitones: u8) -> Self {
        let root = root_midi as i32;
        Trial {
            root_midi,
            root_frequency: midi_to_frequency(root),
            target_frequency: midi_to_frequency(root + semitones as i32),
            semitones,
        }
    }

    pub fn frequencies(&self) -> (f64, f64) {
        (self.root_frequency, self.target_frequency)
    }

    pub fn plan(&self, mode: PlaybackMode, timing: &PlaybackTiming) -> PlaybackPlan {
        PlaybackPlan::for_pair(self.root_frequency, self.target_frequency, mode, timing)
    }
}

/// Running tally of answered trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

impl Score {
    /// Whole-number percentage of correct answers, rounded down.
    pub fn accuracy_percent(&self) -> Option<u32> {
        (self.total > 0).then(|| self.correct * 100 / self.total)
    }
}

/// Outcome of judging an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub correct: bool,
    pub answer_semitones: u8,
    pub answer_name: &'static str,
    pub answer_symbol: &'static str,
}

/// One user's practice session.
///
/// Holds at most one live trial. A trial is judged once: submitting an
/// answer clears it, so a second submission without a new question is
/// rejected with [`TrialError::NoActiveTrial`].
#[derive(Debug)]
pub struct Session {
    rng: StdRng,
    current: Option<Trial>,
    score: Score,
}

impl Session {
    pub fn new() -> Self {
        Session::with_rng(StdRng::from_entropy())
    }

    /// Reproducible question sequence.
    pub fn seeded(seed: u64) -> Self {
        Session::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Session {
            rng,
            current: None,
            score: Score::default(),
        }
    }

    /// Pose a new question with a random root in C3..=C5 and a random
    /// interval from `active`. Replaces any unanswered trial.
    pub fn start_trial(&mut self, active: &IntervalSet) -> Result<Trial, TrialError> {
        let semitones = active
            .iter()
            .choose(&mut self.rng)
            .ok_or(TrialError::NoIntervalsSelected)?;
        let root_midi = self.rng.gen_range(ROOT_MIDI_MIN..=ROOT_MIDI_MAX);
        self.pose(active, root_midi, semitones)
    }

    /// Pose a specific question. `semitones` must be in `active`.
    pub fn pose(
        &mut self,
        active: &IntervalSet,
        root_midi: u8,
        semitones: u8,
    ) -> Result<Trial, TrialError> {
        if active.is_empty() {
            return Err(TrialError::NoIntervalsSelected);
        }
        if !active.contains(semitones) {
            return Err(TrialError::InvalidInterval(semitones));
        }
        if !(ROOT_MIDI_MIN..=ROOT_MIDI_MAX).contains(&root_midi) {
            return Err(TrialError::RootOutOfRange(root_midi));
        }
        if let Some(prev) = self.current {
            log::debug!("replacing unanswered trial of {} semitones", prev.semitones);
        }
        let trial = Trial::new(root_midi, semitones);
        log::debug!(
            "new trial: root {} ({:.2} Hz), target {:.2} Hz",
            trial.root_midi,
            trial.root_frequency,
            trial.target_frequency
        );
        self.current = Some(trial);
        Ok(trial)
    }

    /// Frequencies of the live trial, for playing it again.
    pub fn replay(&self) -> Option<(f64, f64)> {
        self.current.map(|t| t.frequencies())
    }

    /// Judge `guess` against the live trial and clear it.
    pub fn submit_answer(&mut self, guess: u8) -> Result<Verdict, TrialError> {
        let trial = self.current.ok_or(TrialError::NoActiveTrial)?;
        let answer = theory::interval(trial.semitones)
            .ok_or(TrialError::InvalidInterval(trial.semitones))?;
        self.current = None;
        let correct = guess == trial.semitones;
        self.score.total += 1;
        if correct {
            self.score.correct += 1;
        }
        log::debug!(
            "answer {guess} for {} semitones: {} ({}/{})",
            trial.semitones,
            if correct { "correct" } else { "wrong" },
            self.score.correct,
            self.score.total
        );
        Ok(Verdict {
            correct,
            answer_semitones: trial.semitones,
            answer_name: answer.name,
            answer_symbol: answer.symbol,
        })
    }

    pub fn is_awaiting_answer(&self) -> bool {
        self.current.is_some()
    }

    pub fn score(&self) -> Score {
        self.score
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(semitones: &[u8]) -> IntervalSet {
        IntervalSet::from_semitones(semitones.iter().copied()).unwrap()
    }

    #[test]
    fn empty_selection_fails_without_state_change() {
        let mut s = Session::seeded(1);
        assert_eq!(
            s.start_trial(&IntervalSet::empty()),
            Err(TrialError::NoIntervalsSelected)
        );
        assert!(!s.is_awaiting_answer());
        assert_eq!(s.score(), Score::default());
    }

    #[test]
    fn single_interval_always_chosen() {
        let mut s = Session::seeded(7);
        let fifth = 2.0_f64.powf(7.0 / 12.0);
        for _ in 0..200 {
            let t = s.start_trial(&set(&[7])).unwrap();
            assert_eq!(t.semitones, 7);
            assert!((t.target_frequency / t.root_frequency - fifth).abs() < 1e-9);
            assert!((ROOT_MIDI_MIN..=ROOT_MIDI_MAX).contains(&t.root_midi));
        }
    }

    #[test]
    fn chosen_interval_is_in_active_set() {
        let mut s = Session::seeded(42);
        let active = set(&[2, 5, 11]);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..300 {
            let t = s.start_trial(&active).unwrap();
            assert!(active.contains(t.semitones));
            seen.insert(t.semitones);
        }
        assert_eq!(seen.len(), 3, "All members should eventually be drawn");
    }

    #[test]
    fn roots_cover_range() {
        let mut s = Session::seeded(3);
        let mut lo = u8::MAX;
        let mut hi = 0;
        for _ in 0..2000 {
            let t = s.start_trial(&IntervalSet::all()).unwrap();
            lo = lo.min(t.root_midi);
            hi = hi.max(t.root_midi);
        }
        assert_eq!((lo, hi), (ROOT_MIDI_MIN, ROOT_MIDI_MAX));
    }

    #[test]
    fn correct_answer_scores_once() {
        let mut s = Session::seeded(5);
        s.start_trial(&set(&[4])).unwrap();
        let v = s.submit_answer(4).unwrap();
        assert!(v.correct);
        assert_eq!(v.answer_name, "Major Third");
        assert_eq!(v.answer_symbol, "M3");
        assert_eq!(s.score(), Score { correct: 1, total: 1 });

        assert_eq!(s.submit_answer(4), Err(TrialError::NoActiveTrial));
        assert_eq!(s.score(), Score { correct: 1, total: 1 });
    }

    #[test]
    fn wrong_answer_counts_total_only() {
        let mut s = Session::seeded(5);
        s.start_trial(&set(&[12])).unwrap();
        let v = s.submit_answer(11).unwrap();
        assert!(!v.correct);
        assert_eq!(v.answer_semitones, 12);
        assert_eq!(v.answer_name, "Perfect Octave");
        assert_eq!(s.score(), Score { correct: 0, total: 1 });
        assert!(!s.is_awaiting_answer());
    }

    #[test]
    fn replay_requires_live_trial() {
        let mut s = Session::seeded(9);
        assert_eq!(s.replay(), None);
        let t = s.start_trial(&IntervalSet::all()).unwrap();
        assert_eq!(s.replay(), Some((t.root_frequency, t.target_frequency)));
        assert_eq!(s.replay(), s.replay());
        assert_eq!(s.score(), Score::default());
        s.submit_answer(t.semitones).unwrap();
        assert_eq!(s.replay(), None);
    }

    #[test]
    fn submit_without_trial_is_rejected() {
        let mut s = Session::seeded(0);
        assert_eq!(s.submit_answer(3), Err(TrialError::NoActiveTrial));
        assert_eq!(s.score().total, 0);
    }

    #[test]
    fn unknown_answer_leaves_state_untouched() {
        let mut s = Session::seeded(2);
        s.current = Some(Trial::new(60, 13));
        assert_eq!(s.submit_answer(13), Err(TrialError::InvalidInterval(13)));
        assert_eq!(s.score(), Score::default());
        assert!(s.is_awaiting_answer());
    }

    #[test]
    fn new_trial_replaces_unanswered_one() {
        let mut s = Session::seeded(11);
        s.pose(&IntervalSet::all(), 60, 3).unwrap();
        s.pose(&IntervalSet::all(), 60, 9).unwrap();
        let v = s.submit_answer(9).unwrap();
        assert!(v.correct);
        assert_eq!(s.score().total, 1);
    }

    #[test]
    fn middle_c_perfect_fifth_scenario() {
        let mut s = Session::seeded(0);
        let t = s.pose(&IntervalSet::all(), 60, 7).unwrap();
        assert!((t.root_frequency - 261.63).abs() < 0.01);
        assert!((t.target_frequency - 392.00).abs() < 0.1);

        let plan = t.plan(PlaybackMode::Ascending, &PlaybackTiming::default());
        let notes: Vec<(f64, f64)> = plan.notes().map(|n| (n.frequency, n.duration)).collect();
        assert_eq!(notes, vec![(t.root_frequency, 0.8), (t.target_frequency, 0.8)]);

        let chord = t.plan(PlaybackMode::Harmonic, &PlaybackTiming::default());
        assert_eq!(chord.steps.len(), 1);
        assert!(chord.notes().all(|n| n.duration == 1.0));
    }

    #[test]
    fn pose_validates_inputs() {
        let mut s = Session::seeded(0);
        assert_eq!(
            s.pose(&set(&[3]), 60, 4),
            Err(TrialError::InvalidInterval(4))
        );
        assert_eq!(
            s.pose(&set(&[3]), 47, 3),
            Err(TrialError::RootOutOfRange(47))
        );
        assert_eq!(
            s.pose(&IntervalSet::empty(), 60, 3),
            Err(TrialError::NoIntervalsSelected)
        );
        assert!(!s.is_awaiting_answer());
    }

    #[test]
    fn accuracy_rounds_down() {
        assert_eq!(Score::default().accuracy_percent(), None);
        assert_eq!(Score { correct: 2, total: 3 }.accuracy_percent(), Some(66));
        assert_eq!(Score { correct: 5, total: 5 }.accuracy_percent(), Some(100));
    }
}
