//! Read-only derivations over completed workouts.

use super::models::Workout;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorkoutSummary {
    pub exercises: usize,
    pub sets: usize,
    pub completed_sets: usize,
    /// Sum of weight x reps over completed sets.
    pub volume: f64,
}

impl WorkoutSummary {
    pub fn of(workout: &Workout) -> Self {
        let mut summary = Self {
            exercises: workout.exercises.len(),
            ..Self::default()
        };
        for set in workout.exercises.iter().flat_map(|e| &e.sets) {
            summary.sets += 1;
            if set.completed {
                summary.completed_sets += 1;
                summary.volume += set.volume();
            }
        }
        summary
    }
}

/// Heaviest completed set ever logged for one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub workout_id: String,
}

impl PersonalRecord {
    fn beats(&self, weight: f64, reps: u32) -> bool {
        weight > self.weight || (weight == self.weight && reps > self.reps)
    }
}

/// Best completed set per exercise, sorted by exercise name.
///
/// Heavier weight wins; equal weight is broken by more reps; a full tie keeps
/// the earliest set.
pub fn personal_records(history: &[Workout]) -> Vec<PersonalRecord> {
    let mut best: HashMap<&str, PersonalRecord> = HashMap::new();
    let mut chronological: Vec<&Workout> = history.iter().collect();
    chronological.sort_by_key(|w| w.start_time);

    for workout in chronological {
        for exercise in &workout.exercises {
            for set in exercise.sets.iter().filter(|s| s.completed && s.reps > 0) {
                let replace = best
                    .get(exercise.exercise_id.as_str())
                    .is_none_or(|current| current.beats(set.weight, set.reps));
                if replace {
                    best.insert(
                        exercise.exercise_id.as_str(),
                        PersonalRecord {
                            exercise_id: exercise.exercise_id.clone(),
                            exercise_name: exercise.exercise_name.clone(),
                            weight: set.weight,
                            reps: set.reps,
                            date: set.timestamp,
                            workout_id: workout.id.clone(),
                        },
                    );
                }
            }
        }
    }

    let mut records: Vec<PersonalRecord> = best.into_values().collect();
    records.sort_by(|a, b| a.exercise_name.cmp(&b.exercise_name));
    records
}

/// Workouts belonging to `program_id`, or all of them when `None`.
pub fn filter_by_program<'a>(history: &'a [Workout], program_id: Option<&str>) -> Vec<&'a Workout> {
    history
        .iter()
        .filter(|w| program_id.is_none() || w.program_id.as_deref() == program_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{WorkoutExercise, WorkoutSet};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn set(weight: f64, reps: u32, completed: bool, ts: i64) -> WorkoutSet {
        let mut s = WorkoutSet::new(weight, reps, at(ts));
        s.completed = completed;
        s
    }

    fn workout(id: &str, start: i64, program: Option<&str>, sets: Vec<(&str, &str, WorkoutSet)>) -> Workout {
        let mut exercises: Vec<WorkoutExercise> = Vec::new();
        for (exercise_id, name, s) in sets {
            match exercises.iter_mut().find(|e| e.exercise_id == exercise_id) {
                Some(e) => e.sets.push(s),
                None => {
                    let mut e = WorkoutExercise::new(exercise_id, name);
                    e.sets.push(s);
                    exercises.push(e);
                }
            }
        }
        Workout {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            exercises,
            start_time: at(start),
            end_time: Some(at(start + 3600)),
            duration: Some(3600),
            notes: String::new(),
            program_id: program.map(str::to_string),
            user_id: "u1".to_string(),
        }
    }

    #[test]
    fn test_summary_counts_completed_volume_only() {
        let w = workout("w1", 0, None, vec![
            ("ex2", "Squat", set(100.0, 5, true, 10)),
            ("ex2", "Squat", set(100.0, 5, false, 20)),
            ("ex1", "Bench Press", set(60.0, 8, true, 30)),
        ]);
        let summary = WorkoutSummary::of(&w);
        assert_eq!(summary.exercises, 2);
        assert_eq!(summary.sets, 3);
        assert_eq!(summary.completed_sets, 2);
        assert_eq!(summary.volume, 980.0);
    }

    #[test]
    fn test_personal_records() {
        // History is newest first, as kept by the session store.
        let history = vec![
            workout("w2", 7200, None, vec![
                ("ex2", "Squat", set(120.0, 3, true, 7300)),
                ("ex2", "Squat", set(140.0, 1, false, 7400)),
                ("ex1", "Bench Press", set(80.0, 5, true, 7500)),
            ]),
            workout("w1", 0, None, vec![
                ("ex2", "Squat", set(120.0, 3, true, 100)),
                ("ex1", "Bench Press", set(80.0, 3, true, 200)),
            ]),
        ];

        let records = personal_records(&history);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].exercise_name, "Bench Press");
        assert_eq!(records[0].reps, 5);
        assert_eq!(records[0].workout_id, "w2");

        // Uncompleted 140 is ignored; the tie at 120x3 keeps the earlier set.
        assert_eq!(records[1].exercise_name, "Squat");
        assert_eq!(records[1].weight, 120.0);
        assert_eq!(records[1].workout_id, "w1");
        assert_eq!(records[1].date, at(100));
    }

    #[test]
    fn test_filter_by_program() {
        let history = vec![
            workout("w1", 0, Some("template-1"), vec![]),
            workout("w2", 10, None, vec![]),
            workout("w3", 20, Some("template-2"), vec![]),
        ];
        assert_eq!(filter_by_program(&history, None).len(), 3);
        let filtered = filter_by_program(&history, Some("template-1"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "w1");
    }
}
