//! GymRat - terminal workout tracker
//!
//! Log workouts set by set against a running timer, seed sessions from
//! training programs, and review history and personal records. State is kept
//! in JSON partitions under the data directory.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

pub use application::*;
pub use domain::*;
