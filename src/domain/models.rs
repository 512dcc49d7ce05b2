use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generates a fresh identifier such as `set-5f0c…`.
///
/// Identifiers are stable for the life of the entity they name; positions in
/// a collection are never used to address an entity.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// Truncates an instant to the millisecond precision timestamps are stored
/// with, so a value survives a save and reload unchanged.
pub fn stored_instant(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(3)
}

/// A single logged set within an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub id: String,
    pub weight: f64,
    pub reps: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl WorkoutSet {
    pub fn new(weight: f64, reps: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: new_id("set"),
            weight,
            reps,
            completed: false,
            timestamp,
        }
    }

    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

/// Planned repetitions, either an exact count or a range such as `8-12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepTarget {
    Count(u32),
    Range(String),
}

impl fmt::Display for RepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepTarget::Count(n) => write!(f, "{}", n),
            RepTarget::Range(r) => write!(f, "{}", r),
        }
    }
}

/// An exercise as performed inside one workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub id: String,
    pub exercise_id: String,
    pub exercise_name: String,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<RepTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WorkoutExercise {
    pub fn new(exercise_id: impl Into<String>, exercise_name: impl Into<String>) -> Self {
        Self {
            id: new_id("exercise"),
            exercise_id: exercise_id.into(),
            exercise_name: exercise_name.into(),
            sets: Vec::new(),
            target_sets: None,
            target_reps: None,
            rest_time: None,
            notes: None,
        }
    }

    pub fn set(&self, set_id: &str) -> Option<&WorkoutSet> {
        self.sets.iter().find(|s| s.id == set_id)
    }

    pub fn completed_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.completed).count()
    }

    /// Human readable target line, e.g. `3 sets x 8-12 reps`.
    pub fn target_label(&self) -> Option<String> {
        let sets = self.target_sets?;
        Some(match &self.target_reps {
            Some(reps) => format!("{} sets x {} reps", sets, reps),
            None => format!("{} sets", sets),
        })
    }
}

/// A workout, either in progress or completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds between start and end, set on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    pub user_id: String,
}

impl Workout {
    pub fn exercise(&self, exercise_id: &str) -> Option<&WorkoutExercise> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    pub fn exercise_mut(&mut self, exercise_id: &str) -> Option<&mut WorkoutExercise> {
        self.exercises.iter_mut().find(|e| e.id == exercise_id)
    }

    pub fn is_completed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Seconds elapsed between the start of the workout and `now`.
    ///
    /// Always recomputed from the wall clock, so a suspended process picks up
    /// the correct value on its next tick. Clamped at zero if the clock moved
    /// backwards.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        (now - self.start_time).num_seconds().max(0) as u64
    }

    /// Stamps `end_time` (keeping one already set) and derives `duration`.
    ///
    /// `end_time` never precedes `start_time`.
    pub fn finish(&mut self, now: DateTime<Utc>) {
        let end = self.end_time.unwrap_or(now).max(self.start_time);
        self.end_time = Some(end);
        self.duration = Some(self.elapsed_at(end));
    }

    /// Brings every timestamp in the workout down to stored precision.
    pub fn truncate_timestamps(&mut self) {
        self.start_time = stored_instant(self.start_time);
        self.end_time = self.end_time.map(stored_instant);
        for set in self.exercises.iter_mut().flat_map(|e| e.sets.iter_mut()) {
            set.timestamp = stored_instant(set.timestamp);
        }
    }

    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

/// Externally issued identity, mirrored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl User {
    /// Name to greet the user with, falling back to the email address.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// Which numeric field of a set an edit targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetField {
    Weight(f64),
    Reps(u32),
}

impl SetField {
    /// Parses user input for the weight column.
    pub fn parse_weight(input: &str) -> super::DomainResult<Self> {
        input
            .trim()
            .parse::<f64>()
            .map(SetField::Weight)
            .map_err(|_| super::DomainError::InvalidNumber(input.to_string()))
    }

    /// Parses user input for the reps column.
    pub fn parse_reps(input: &str) -> super::DomainResult<Self> {
        input
            .trim()
            .parse::<u32>()
            .map(SetField::Reps)
            .map_err(|_| super::DomainError::InvalidNumber(input.to_string()))
    }
}

/// Formats seconds as `HH:MM:SS`.
pub fn format_elapsed(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hrs, mins, secs)
}
