//! Builder for a workout that has not started yet.

use super::catalog::{Exercise, Program};
use super::errors::{DomainError, DomainResult};
use super::models::{new_id, Workout, WorkoutExercise};
use chrono::{DateTime, Utc};

/// User id recorded on workouts started without a signed-in user.
pub const ANONYMOUS_USER: &str = "anonymous";

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDraft {
    pub name: String,
    pub notes: String,
    pub exercises: Vec<WorkoutExercise>,
    pub program_id: Option<String>,
    pub program_workout_id: Option<String>,
}

impl WorkoutDraft {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            name: Self::default_name(now),
            notes: String::new(),
            exercises: Vec::new(),
            program_id: None,
            program_workout_id: None,
        }
    }

    pub fn default_name(now: DateTime<Utc>) -> String {
        format!("Workout - {}", now.format("%Y-%m-%d"))
    }

    pub fn add_exercise(&mut self, exercise: &Exercise) -> String {
        let entry = WorkoutExercise::new(exercise.id, exercise.name);
        let id = entry.id.clone();
        self.exercises.push(entry);
        id
    }

    pub fn remove_exercise(&mut self, entry_id: &str) -> DomainResult<()> {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.id != entry_id);
        if self.exercises.len() == before {
            return Err(DomainError::ExerciseNotFound(entry_id.to_string()));
        }
        Ok(())
    }

    /// Replaces the exercise list with one day of a program and takes its name.
    pub fn apply_program_workout(&mut self, program: &Program, workout_id: &str) -> DomainResult<()> {
        let day = program
            .workout(workout_id)
            .ok_or_else(|| DomainError::UnknownProgram(workout_id.to_string()))?;
        self.name = day.name.clone();
        self.exercises = day.to_workout_exercises();
        self.program_id = Some(program.id.clone());
        self.program_workout_id = Some(day.id.clone());
        Ok(())
    }

    pub fn clear_program(&mut self) {
        self.program_id = None;
        self.program_workout_id = None;
        self.exercises.clear();
    }

    /// Produces the workout to hand to the session store.
    pub fn into_workout(self, user_id: Option<&str>, now: DateTime<Utc>) -> DomainResult<Workout> {
        if self.exercises.is_empty() {
            return Err(DomainError::EmptyWorkout);
        }
        let name = if self.name.trim().is_empty() {
            Self::default_name(now)
        } else {
            self.name.trim().to_string()
        };
        Ok(Workout {
            id: new_id("workout"),
            name,
            description: None,
            exercises: self.exercises,
            start_time: now,
            end_time: None,
            duration: None,
            notes: self.notes,
            program_id: self.program_id,
            user_id: user_id.unwrap_or(ANONYMOUS_USER).to_string(),
        })
    }
}
