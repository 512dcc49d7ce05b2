use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Exercise not found in workout: {0}")]
    ExerciseNotFound(String),
    #[error("Set not found: {0}")]
    SetNotFound(String),
    #[error("Weight must be a non-negative number, got {0}")]
    InvalidWeight(f64),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Please add at least one exercise to your workout")]
    EmptyWorkout,
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),
    #[error("Unknown program or program day: {0}")]
    UnknownProgram(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
