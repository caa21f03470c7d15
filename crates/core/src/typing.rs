//! Typing-speed drill: live WPM, accuracy and consistency over a countdown.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DrillError;
use crate::time::{ClockEvent, Countdown};

/// Input may run this many characters past the passage before it is refused.
pub const OVERTYPE_ALLOWANCE: usize = 10;

const CHARS_PER_WORD: f64 = 5.0;
const MIN_ELAPSED_MINUTES: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DrillPhase {
    Ready,
    Running,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DrillFinish {
    TimeUp,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DrillStats {
    pub typed_chars: usize,
    pub correct_chars: usize,
    pub errors: usize,
    pub accuracy: u32,
    pub gross_wpm: u32,
    pub net_wpm: u32,
    pub consistency: u32,
}

impl Default for DrillStats {
    fn default() -> Self {
        Self {
            typed_chars: 0,
            correct_chars: 0,
            errors: 0,
            accuracy: 100,
            gross_wpm: 0,
            net_wpm: 0,
            consistency: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    Accepted(DrillStats),
    TooLong,
    Finished(DrillStats),
}

#[derive(Debug, Clone)]
pub struct TypingDrill {
    passage: String,
    passage_len: usize,
    input: String,
    phase: DrillPhase,
    duration_secs: u32,
    countdown: Countdown,
    started_at: Option<DateTime<Utc>>,
    finished: Option<DrillFinish>,
    stats: DrillStats,
    wpm_samples: Vec<f64>,
    paste_attempts: u32,
}

impl TypingDrill {
    /// # Errors
    ///
    /// Returns `DrillError::EmptyPassage` when the passage has no visible text.
    pub fn new(passage: impl Into<String>, duration_secs: u32) -> Result<Self, DrillError> {
        let passage = passage.into();
        if passage.trim().is_empty() {
            return Err(DrillError::EmptyPassage);
        }
        Ok(Self {
            passage_len: passage.chars().count(),
            passage,
            input: String::new(),
            phase: DrillPhase::Ready,
            duration_secs,
            countdown: Countdown::new(duration_secs),
            started_at: None,
            finished: None,
            stats: DrillStats::default(),
            wpm_samples: Vec::new(),
            paste_attempts: 0,
        })
    }

    #[must_use]
    pub fn passage(&self) -> &str {
        &self.passage
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn phase(&self) -> DrillPhase {
        self.phase
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<DrillFinish> {
        self.finished
    }

    #[must_use]
    pub fn stats(&self) -> DrillStats {
        self.stats
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn paste_attempts(&self) -> u32 {
        self.paste_attempts
    }

    /// Fraction of the time budget used, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 1.0;
        }
        f64::from(self.duration_secs - self.countdown.remaining()) / f64::from(self.duration_secs)
    }

    /// # Errors
    ///
    /// Returns `DrillError::WrongPhase` unless the drill is `Ready`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), DrillError> {
        if self.phase != DrillPhase::Ready {
            return Err(DrillError::WrongPhase { actual: self.phase });
        }
        self.phase = DrillPhase::Running;
        self.started_at = Some(now);
        tracing::debug!(duration_secs = self.duration_secs, "typing drill started");
        Ok(())
    }

    /// Replace the typed text. The first input starts the drill.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::WrongPhase` once the drill has finished.
    pub fn input_changed(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<InputOutcome, DrillError> {
        match self.phase {
            DrillPhase::Finished => return Err(DrillError::WrongPhase { actual: self.phase }),
            DrillPhase::Ready => self.start(now)?,
            DrillPhase::Running => {}
        }

        if text.chars().count() > self.passage_len + OVERTYPE_ALLOWANCE {
            return Ok(InputOutcome::TooLong);
        }

        self.input.clear();
        self.input.push_str(text);
        self.stats = self.compute_stats(now);

        if self.input.trim_end().chars().count() >= self.passage.trim_end().chars().count() {
            self.finish(DrillFinish::Completed);
            return Ok(InputOutcome::Finished(self.stats));
        }
        Ok(InputOutcome::Accepted(self.stats))
    }

    /// Pasting is never accepted; the attempt is only counted.
    pub fn paste_attempted(&mut self) -> u32 {
        self.paste_attempts = self.paste_attempts.saturating_add(1);
        tracing::debug!(attempts = self.paste_attempts, "paste refused");
        self.paste_attempts
    }

    /// One elapsed second. Ignored unless running.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<ClockEvent> {
        if self.phase != DrillPhase::Running {
            return None;
        }
        let event = self.countdown.tick()?;
        let stats = self.compute_stats(now);
        self.wpm_samples.push(f64::from(stats.gross_wpm));
        self.stats = DrillStats {
            consistency: consistency(&self.wpm_samples),
            ..stats
        };
        if event == ClockEvent::Expired {
            self.finish(DrillFinish::TimeUp);
        }
        Some(event)
    }

    fn finish(&mut self, reason: DrillFinish) {
        self.phase = DrillPhase::Finished;
        self.finished = Some(reason);
        self.countdown.stop();
        tracing::info!(
            ?reason,
            wpm = self.stats.gross_wpm,
            accuracy = self.stats.accuracy,
            "typing drill finished"
        );
    }

    fn compute_stats(&self, now: DateTime<Utc>) -> DrillStats {
        let typed_chars = self.input.chars().count();
        let correct_chars = self
            .input
            .chars()
            .zip(self.passage.chars())
            .filter(|(typed, expected)| typed == expected)
            .count();
        let errors = typed_chars - correct_chars;

        let elapsed_ms = self
            .started_at
            .map_or(0, |started| (now - started).num_milliseconds().max(0));
        #[allow(clippy::cast_precision_loss)]
        let minutes = (elapsed_ms as f64 / 60_000.0).max(MIN_ELAPSED_MINUTES);

        #[allow(clippy::cast_precision_loss)]
        let (typed_f, errors_f) = (typed_chars as f64, errors as f64);
        let accuracy = if typed_chars == 0 {
            100
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ratio = correct_chars as f64 / typed_f;
            round_u32(ratio * 100.0)
        };

        DrillStats {
            typed_chars,
            correct_chars,
            errors,
            accuracy,
            gross_wpm: round_u32(typed_f / CHARS_PER_WORD / minutes),
            net_wpm: round_u32((typed_f / CHARS_PER_WORD - errors_f) / minutes),
            consistency: self.stats.consistency,
        }
    }
}

/// 100 minus the coefficient of variation of per-second WPM, as a percentage.
fn consistency(samples: &[f64]) -> u32 {
    if samples.len() < 2 {
        return 100;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    if mean <= f64::EPSILON {
        return 100;
    }
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let cv = variance.sqrt() / mean;
    round_u32((100.0 - cv * 100.0).clamp(0.0, 100.0))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_u32(value: f64) -> u32 {
    value.max(0.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn empty_passage_is_rejected() {
        assert_eq!(
            TypingDrill::new("   ", 60).unwrap_err(),
            DrillError::EmptyPassage
        );
    }

    #[test]
    fn first_input_starts_and_scores() {
        let mut drill = TypingDrill::new("hello world", 60).unwrap();
        let start = fixed_now();
        drill.input_changed("h", start).unwrap();
        assert_eq!(drill.phase(), DrillPhase::Running);

        let outcome = drill
            .input_changed("hellp", start + Duration::seconds(12))
            .unwrap();
        let InputOutcome::Accepted(stats) = outcome else {
            panic!("expected accepted input, got {outcome:?}");
        };
        assert_eq!(stats.typed_chars, 5);
        assert_eq!(stats.correct_chars, 4);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.accuracy, 80);
        // 5 chars = 1 word in 0.2 minutes.
        assert_eq!(stats.gross_wpm, 5);
        assert_eq!(stats.net_wpm, 0);
    }

    #[test]
    fn completing_the_passage_finishes_early() {
        let mut drill = TypingDrill::new("abc ", 60).unwrap();
        let outcome = drill.input_changed("abc", fixed_now()).unwrap();
        assert!(matches!(outcome, InputOutcome::Finished(_)));
        assert_eq!(drill.finish_reason(), Some(DrillFinish::Completed));
        assert!(drill.input_changed("abcd", fixed_now()).is_err());
        assert_eq!(drill.tick(fixed_now()), None);
    }

    #[test]
    fn overlong_input_is_refused() {
        let mut drill = TypingDrill::new("ab", 60).unwrap();
        drill.input_changed("a", fixed_now()).unwrap();
        let outcome = drill
            .input_changed(&"x".repeat(2 + OVERTYPE_ALLOWANCE + 1), fixed_now())
            .unwrap();
        assert_eq!(outcome, InputOutcome::TooLong);
        assert_eq!(drill.input(), "a");
    }

    #[test]
    fn countdown_expiry_finishes_drill() {
        let mut drill = TypingDrill::new("a long passage to type", 2).unwrap();
        let start = fixed_now();
        drill.start(start).unwrap();
        assert_eq!(
            drill.tick(start + Duration::seconds(1)),
            Some(ClockEvent::Tick { remaining: 1 })
        );
        assert_eq!(
            drill.tick(start + Duration::seconds(2)),
            Some(ClockEvent::Expired)
        );
        assert_eq!(drill.finish_reason(), Some(DrillFinish::TimeUp));
        assert!((drill.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_ascii_text_is_scored_per_character() {
        let mut drill = TypingDrill::new("अभ्यास से", 60).unwrap();
        let outcome = drill.input_changed("अभ्", fixed_now()).unwrap();
        let InputOutcome::Accepted(stats) = outcome else {
            panic!("expected accepted input, got {outcome:?}");
        };
        assert_eq!(stats.typed_chars, 3);
        assert_eq!(stats.accuracy, 100);
    }

    #[test]
    fn consistency_drops_with_uneven_pace() {
        assert_eq!(consistency(&[40.0]), 100);
        assert_eq!(consistency(&[40.0, 40.0, 40.0]), 100);
        assert!(consistency(&[10.0, 70.0, 10.0, 70.0]) < 50);
    }

    #[test]
    fn paste_is_counted() {
        let mut drill = TypingDrill::new("abc", 60).unwrap();
        drill.paste_attempted();
        assert_eq!(drill.paste_attempted(), 2);
        assert_eq!(drill.input(), "");
    }
}
