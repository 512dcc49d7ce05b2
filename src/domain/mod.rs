pub mod models;
pub mod services;
pub mod errors;
pub mod catalog;
pub mod draft;
pub mod progress;

pub use models::*;
pub use services::*;
pub use errors::*;
pub use catalog::{Exercise, Program, ProgramExercise, ProgramWorkout, Difficulty};
pub use draft::*;
pub use progress::*;
