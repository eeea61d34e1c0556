//! Rep event sink and session aggregate
//!
//! The detectors only emit raw rep events. Everything that accumulates across
//! reps (counts, sets, form score) lives behind the `RepEventSink` trait.

use crate::session::SessionId;
use crate::types::{
    Exercise, ExerciseTally, FormQuality, RepAck, RepEvent, SetAck, WorkoutSummary,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Receiver for counted reps and set boundaries. Each method is called at most
/// once per frame.
pub trait RepEventSink {
    /// Take ownership of a completed rep and return the running aggregate
    fn record_rep(&mut self, event: RepEvent) -> RepAck;

    /// Declare that a new set of `exercise` begins with the next rep
    fn record_set_boundary(&mut self, exercise: Exercise) -> SetAck;
}

/// Default sink: running totals for one workout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    session_id: SessionId,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    total_reps: u32,
    good_reps: u32,
    /// Sum of per-rep quality weights, for the form score
    quality_sum: f64,
    sets: u32,
    /// Per-exercise tallies, in first-seen order
    tallies: Vec<ExerciseTally>,
    last_feedback: Option<String>,
}

impl Default for WorkoutSession {
    fn default() -> Self {
        Self::new(SessionId::new())
    }
}

impl WorkoutSession {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            started_at: Utc::now(),
            ended_at: None,
            total_reps: 0,
            good_reps: 0,
            quality_sum: 0.0,
            sets: 0,
            tallies: Vec::new(),
            last_feedback: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn total_reps(&self) -> u32 {
        self.total_reps
    }

    pub fn sets(&self) -> u32 {
        self.sets
    }

    pub fn last_feedback(&self) -> Option<&str> {
        self.last_feedback.as_deref()
    }

    /// Share of reps rated good (0-1)
    pub fn good_rep_ratio(&self) -> f64 {
        if self.total_reps == 0 {
            return 0.0;
        }
        self.good_reps as f64 / self.total_reps as f64
    }

    /// Weighted form score (0-100); zero before the first rep
    pub fn form_score(&self) -> u8 {
        if self.total_reps == 0 {
            return 0;
        }
        let score = self.quality_sum / self.total_reps as f64 * 100.0;
        score.round().clamp(0.0, 100.0) as u8
    }

    /// Mark the session finished
    pub fn finish(&mut self) {
        if self.ended_at.is_none() {
            self.ended_at = Some(Utc::now());
        }
    }

    /// Post-workout summary
    pub fn summary(&self) -> WorkoutSummary {
        WorkoutSummary {
            session_id: self.session_id.to_string(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            exercises_done: self
                .tallies
                .iter()
                .map(|t| t.exercise.display_name().to_string())
                .collect(),
            total_reps: self.total_reps,
            sets: self.sets,
            form_score: self.form_score(),
            good_rep_ratio: self.good_rep_ratio(),
            reps_by_exercise: self.tallies.clone(),
            top_tip: self.top_tip(),
        }
    }

    /// Tip for the exercise with the most reps below good form, falling back to
    /// the most performed exercise
    fn top_tip(&self) -> Option<String> {
        let weakest = self
            .tallies
            .iter()
            .filter(|t| t.reps > t.good_reps)
            .fold(None::<&ExerciseTally>, |best, t| match best {
                Some(b) if b.reps - b.good_reps >= t.reps - t.good_reps => Some(b),
                _ => Some(t),
            });

        let target = weakest.or_else(|| {
            self.tallies.iter().fold(None::<&ExerciseTally>, |best, t| match best {
                Some(b) if b.reps >= t.reps => Some(b),
                _ => Some(t),
            })
        })?;

        Some(coaching_tip(target.exercise).to_string())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl RepEventSink for WorkoutSession {
    fn record_rep(&mut self, event: RepEvent) -> RepAck {
        self.total_reps += 1;
        self.quality_sum += event.form_quality.weight();
        let is_good = event.form_quality == FormQuality::Good;
        if is_good {
            self.good_reps += 1;
        }

        match self.tallies.iter_mut().find(|t| t.exercise == event.exercise) {
            Some(tally) => {
                tally.reps += 1;
                tally.good_reps += u32::from(is_good);
            }
            None => self.tallies.push(ExerciseTally {
                exercise: event.exercise,
                reps: 1,
                good_reps: u32::from(is_good),
            }),
        }

        self.last_feedback = Some(event.feedback);

        RepAck {
            rep_number: self.total_reps,
            form_score: self.form_score(),
        }
    }

    fn record_set_boundary(&mut self, _exercise: Exercise) -> SetAck {
        self.sets += 1;
        SetAck {
            set_number: self.sets,
        }
    }
}

fn coaching_tip(exercise: Exercise) -> &'static str {
    match exercise {
        Exercise::Squats => "Focus on keeping knees tracking over toes during squats.",
        Exercise::JumpingJacks => "Reach fully overhead and land softly on every jumping jack.",
        Exercise::PushUps => "Keep your core braced so your hips stay level during push-ups.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rep(exercise: Exercise, quality: FormQuality) -> RepEvent {
        RepEvent {
            exercise,
            form_quality: quality,
            feedback: "ok".to_string(),
        }
    }

    #[test]
    fn test_rep_numbers_and_form_score() {
        let mut session = WorkoutSession::default();

        let ack = session.record_rep(rep(Exercise::Squats, FormQuality::Good));
        assert_eq!(ack, RepAck { rep_number: 1, form_score: 100 });

        let ack = session.record_rep(rep(Exercise::Squats, FormQuality::Okay));
        // (1.0 + 0.6) / 2 = 0.8
        assert_eq!(ack, RepAck { rep_number: 2, form_score: 80 });

        let ack = session.record_rep(rep(Exercise::Squats, FormQuality::Poor));
        // (1.0 + 0.6 + 0.2) / 3 = 0.6
        assert_eq!(ack.form_score, 60);
        assert!((session.good_rep_ratio() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_numbers() {
        let mut session = WorkoutSession::default();
        assert_eq!(session.record_set_boundary(Exercise::Squats).set_number, 1);
        assert_eq!(session.record_set_boundary(Exercise::PushUps).set_number, 2);
        assert_eq!(session.sets(), 2);
    }

    #[test]
    fn test_empty_summary() {
        let session = WorkoutSession::default();
        let summary = session.summary();
        assert_eq!(summary.total_reps, 0);
        assert_eq!(summary.form_score, 0);
        assert_eq!(summary.good_rep_ratio, 0.0);
        assert!(summary.exercises_done.is_empty());
        assert!(summary.top_tip.is_none());
        assert!(summary.ended_at.is_none());
    }

    #[test]
    fn test_summary_tallies_in_first_seen_order() {
        let mut session = WorkoutSession::default();
        session.record_set_boundary(Exercise::PushUps);
        session.record_rep(rep(Exercise::PushUps, FormQuality::Good));
        session.record_set_boundary(Exercise::Squats);
        session.record_rep(rep(Exercise::Squats, FormQuality::Good));
        session.record_rep(rep(Exercise::Squats, FormQuality::Good));
        session.finish();

        let summary = session.summary();
        assert_eq!(summary.exercises_done, vec!["Push-ups", "Squats"]);
        assert_eq!(summary.total_reps, 3);
        assert_eq!(summary.sets, 2);
        assert_eq!(
            summary.reps_by_exercise,
            vec![
                ExerciseTally { exercise: Exercise::PushUps, reps: 1, good_reps: 1 },
                ExerciseTally { exercise: Exercise::Squats, reps: 2, good_reps: 2 },
            ]
        );
        // All good: tip for the most performed exercise
        assert_eq!(
            summary.top_tip.as_deref(),
            Some("Focus on keeping knees tracking over toes during squats.")
        );
        assert!(summary.ended_at.is_some());
    }

    #[test]
    fn test_top_tip_targets_weakest_exercise() {
        let mut session = WorkoutSession::default();
        for _ in 0..5 {
            session.record_rep(rep(Exercise::Squats, FormQuality::Good));
        }
        session.record_rep(rep(Exercise::PushUps, FormQuality::Poor));

        let tip = session.summary().top_tip.unwrap();
        assert!(tip.contains("push-ups"));
    }

    #[test]
    fn test_feedback_is_kept() {
        let mut session = WorkoutSession::default();
        session.record_rep(RepEvent::good(Exercise::PushUps, "Perfect push-up!"));
        assert_eq!(session.last_feedback(), Some("Perfect push-up!"));
    }

    #[test]
    fn test_json_roundtrip_preserves_totals() {
        let mut session = WorkoutSession::default();
        session.record_set_boundary(Exercise::Squats);
        session.record_rep(rep(Exercise::Squats, FormQuality::Okay));

        let restored = WorkoutSession::from_json(&session.to_json().unwrap()).unwrap();
        assert_eq!(restored.total_reps(), 1);
        assert_eq!(restored.sets(), 1);
        assert_eq!(restored.form_score(), 60);
        assert_eq!(restored.session_id(), session.session_id());
    }
}
