//! Set logging services for a workout in progress.
//!
//! Every operation addresses exercises and sets by their stable identifier.
//! An identifier that no longer exists (for example a set deleted by an
//! earlier action) yields an error instead of touching a neighbouring element.

use super::catalog::Exercise;
use super::errors::{DomainError, DomainResult};
use super::models::{SetField, Workout, WorkoutExercise, WorkoutSet};
use chrono::{DateTime, Utc};

/// Applies single-element edits to a workout's nested collections.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use gymrat::domain::{Workout, WorkoutEditor, WorkoutExercise};
///
/// let mut workout = Workout {
///     id: "w1".into(),
///     name: "Leg Day".into(),
///     description: None,
///     exercises: vec![WorkoutExercise::new("ex2", "Squat")],
///     start_time: Utc::now(),
///     end_time: None,
///     duration: None,
///     notes: String::new(),
///     program_id: None,
///     user_id: "u1".into(),
/// };
/// let squat = workout.exercises[0].id.clone();
///
/// let set_id = WorkoutEditor::new(&mut workout).add_set(&squat, Utc::now()).unwrap();
/// assert_eq!(workout.exercises[0].sets[0].id, set_id);
/// ```
pub struct WorkoutEditor<'a> {
    workout: &'a mut Workout,
}

impl<'a> WorkoutEditor<'a> {
    pub fn new(workout: &'a mut Workout) -> Self {
        Self { workout }
    }

    /// Appends a set to the exercise and returns its identifier.
    ///
    /// Weight and reps are seeded from the last set of the same exercise, or
    /// zero when the exercise has no sets yet.
    pub fn add_set(&mut self, exercise_id: &str, now: DateTime<Utc>) -> DomainResult<String> {
        let exercise = self.exercise_mut(exercise_id)?;
        let (weight, reps) = exercise
            .sets
            .last()
            .map(|s| (s.weight, s.reps))
            .unwrap_or((0.0, 0));
        let set = WorkoutSet::new(weight, reps, now);
        let id = set.id.clone();
        exercise.sets.push(set);
        Ok(id)
    }

    pub fn update_set(&mut self, exercise_id: &str, set_id: &str, field: SetField) -> DomainResult<()> {
        if let SetField::Weight(weight) = field {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DomainError::InvalidWeight(weight));
            }
        }
        let set = self.set_mut(exercise_id, set_id)?;
        match field {
            SetField::Weight(weight) => set.weight = weight,
            SetField::Reps(reps) => set.reps = reps,
        }
        Ok(())
    }

    /// Flips the completed flag and returns the new value.
    pub fn toggle_set_completed(&mut self, exercise_id: &str, set_id: &str) -> DomainResult<bool> {
        let set = self.set_mut(exercise_id, set_id)?;
        set.completed = !set.completed;
        Ok(set.completed)
    }

    pub fn delete_set(&mut self, exercise_id: &str, set_id: &str) -> DomainResult<WorkoutSet> {
        let exercise = self.exercise_mut(exercise_id)?;
        let position = exercise
            .sets
            .iter()
            .position(|s| s.id == set_id)
            .ok_or_else(|| DomainError::SetNotFound(set_id.to_string()))?;
        Ok(exercise.sets.remove(position))
    }

    /// Appends a library exercise with no sets and returns the new entry's id.
    pub fn add_exercise(&mut self, exercise: &Exercise) -> String {
        let entry = WorkoutExercise::new(exercise.id, exercise.name);
        let id = entry.id.clone();
        self.workout.exercises.push(entry);
        id
    }

    pub fn remove_exercise(&mut self, exercise_id: &str) -> DomainResult<WorkoutExercise> {
        let position = self
            .workout
            .exercises
            .iter()
            .position(|e| e.id == exercise_id)
            .ok_or_else(|| DomainError::ExerciseNotFound(exercise_id.to_string()))?;
        Ok(self.workout.exercises.remove(position))
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.workout.notes = notes.to_string();
    }

    fn exercise_mut(&mut self, exercise_id: &str) -> DomainResult<&mut WorkoutExercise> {
        self.workout
            .exercise_mut(exercise_id)
            .ok_or_else(|| DomainError::ExerciseNotFound(exercise_id.to_string()))
    }

    fn set_mut(&mut self, exercise_id: &str, set_id: &str) -> DomainResult<&mut WorkoutSet> {
        self.exercise_mut(exercise_id)?
            .sets
            .iter_mut()
            .find(|s| s.id == set_id)
            .ok_or_else(|| DomainError::SetNotFound(set_id.to_string()))
    }
}
