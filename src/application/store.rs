//! Persisted state containers.
//!
//! [`SessionStore`] owns the active workout and the completed history;
//! [`ProgramStore`] owns the user's programs. Each mutation writes the whole
//! partition first and only then replaces the in-memory state, so a failed
//! write leaves both the file and memory as they were.

use super::clock::Clock;
use crate::domain::catalog::program_templates;
use crate::domain::{stored_instant, DomainError, Program, Workout};
use crate::infrastructure::{load, save, KeyValueStore, Partition, PersistenceError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No workout in progress")]
    NoActiveWorkout,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Contents of the `workout` partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutState {
    #[serde(default)]
    pub active_workout: Option<Workout>,
    #[serde(default)]
    pub workout_history: Vec<Workout>,
}

/// Owner of the `workout` partition: the single active workout and the
/// completed history, most recent first.
///
/// Every mutation saves the whole partition before touching memory. Workout
/// timestamps are truncated to stored precision on the way in, so what is in
/// memory is exactly what a reload reads back.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use gymrat::application::{SessionStore, SystemClock};
/// use gymrat::infrastructure::MemoryStore;
///
/// let store = SessionStore::open(Rc::new(MemoryStore::new()), Rc::new(SystemClock)).unwrap();
/// assert!(store.active().is_none());
/// assert!(store.history().is_empty());
/// ```
pub struct SessionStore {
    storage: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    state: WorkoutState,
}

impl SessionStore {
    /// Loads the `workout` partition.
    ///
    /// # Arguments
    ///
    /// * `storage` - Backing store, shared with the other partitions
    /// * `clock` - Time source for starts, sets and completions
    ///
    /// # Errors
    ///
    /// A partition that exists but cannot be decoded is an error; it is never
    /// silently replaced.
    pub fn open(storage: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> StoreResult<Self> {
        let state: WorkoutState = load(storage.as_ref(), Partition::Workout)?.unwrap_or_default();
        tracing::debug!(
            active = state.active_workout.is_some(),
            history = state.workout_history.len(),
            "session store opened"
        );
        Ok(Self { storage, clock, state })
    }

    /// Current time at stored precision.
    pub fn now(&self) -> DateTime<Utc> {
        stored_instant(self.clock.now())
    }

    pub fn state(&self) -> &WorkoutState {
        &self.state
    }

    pub fn active(&self) -> Option<&Workout> {
        self.state.active_workout.as_ref()
    }

    /// Completed workouts, most recent first.
    pub fn history(&self) -> &[Workout] {
        &self.state.workout_history
    }

    /// The first `count` entries of [`history`](Self::history).
    pub fn recent(&self, count: usize) -> &[Workout] {
        let history = self.history();
        &history[..count.min(history.len())]
    }

    /// Makes `workout` the active workout, replacing any workout already in
    /// progress.
    ///
    /// # Arguments
    ///
    /// * `workout` - The workout to start, usually built from a draft
    ///
    /// # Returns
    ///
    /// The replaced workout, if there was one. A warning is logged for it.
    pub fn start(&mut self, mut workout: Workout) -> StoreResult<Option<Workout>> {
        workout.truncate_timestamps();
        let mut next = self.state.clone();
        let displaced = next.active_workout.replace(workout);
        self.commit(next)?;
        if let Some(old) = &displaced {
            tracing::warn!(workout_id = %old.id, name = %old.name, "active workout replaced by a new start");
        }
        if let Some(active) = self.active() {
            tracing::info!(workout_id = %active.id, name = %active.name, "workout started");
        }
        Ok(displaced)
    }

    /// Replaces the active workout wholesale.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoActiveWorkout`] when nothing is in progress.
    pub fn update(&mut self, mut workout: Workout) -> StoreResult<()> {
        if self.state.active_workout.is_none() {
            return Err(StoreError::NoActiveWorkout);
        }
        workout.truncate_timestamps();
        let mut next = self.state.clone();
        next.active_workout = Some(workout);
        self.commit(next)
    }

    /// Applies `edit` to a copy of the active workout and stores the result.
    ///
    /// Nothing is written when `edit` fails, so a stale id never leaves a
    /// half-applied change behind.
    ///
    /// # Arguments
    ///
    /// * `edit` - Change to apply; its output is handed back on success
    pub fn edit_active<T>(
        &mut self,
        edit: impl FnOnce(&mut Workout) -> Result<T, DomainError>,
    ) -> StoreResult<T> {
        let mut workout = self.active().cloned().ok_or(StoreError::NoActiveWorkout)?;
        let output = edit(&mut workout)?;
        self.update(workout)?;
        Ok(output)
    }

    /// Finishes `workout`, puts it at the head of history and clears the
    /// active slot.
    ///
    /// An `end_time` already set by the caller is kept. `duration` is always
    /// derived from the stored start and end, so the two agree after a
    /// reload.
    ///
    /// # Returns
    ///
    /// The copy that was stored.
    pub fn complete(&mut self, mut workout: Workout) -> StoreResult<Workout> {
        workout.truncate_timestamps();
        workout.finish(self.now());
        let mut next = self.state.clone();
        next.active_workout = None;
        next.workout_history.insert(0, workout.clone());
        self.commit(next)?;
        tracing::info!(
            workout_id = %workout.id,
            duration = workout.duration.unwrap_or_default(),
            sets = workout.total_sets(),
            "workout completed"
        );
        Ok(workout)
    }

    /// Discards the active workout. History is untouched.
    ///
    /// # Returns
    ///
    /// The discarded workout, or `None` if nothing was in progress.
    pub fn cancel(&mut self) -> StoreResult<Option<Workout>> {
        let mut next = self.state.clone();
        let discarded = next.active_workout.take();
        self.commit(next)?;
        if let Some(workout) = &discarded {
            tracing::info!(workout_id = %workout.id, "workout cancelled");
        }
        Ok(discarded)
    }

    fn commit(&mut self, next: WorkoutState) -> StoreResult<()> {
        save(self.storage.as_ref(), Partition::Workout, &next)?;
        self.state = next;
        Ok(())
    }
}

/// Contents of the `program` partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramState {
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub selected_program_id: Option<String>,
}

/// Owner of the `program` partition: the user's programs and which one is
/// selected.
pub struct ProgramStore {
    storage: Rc<dyn KeyValueStore>,
    state: ProgramState,
}

impl ProgramStore {
    /// Loads the `program` partition, seeding it from the built-in templates
    /// the first time.
    ///
    /// # Errors
    ///
    /// Fails if the partition cannot be decoded or the seeded copy cannot be
    /// written.
    pub fn open(storage: Rc<dyn KeyValueStore>) -> StoreResult<Self> {
        let state = match load::<ProgramState>(storage.as_ref(), Partition::Program)? {
            Some(state) => state,
            None => {
                let seeded = ProgramState {
                    programs: program_templates(),
                    selected_program_id: None,
                };
                save(storage.as_ref(), Partition::Program, &seeded)?;
                seeded
            }
        };
        Ok(Self { storage, state })
    }

    pub fn programs(&self) -> &[Program] {
        &self.state.programs
    }

    pub fn program(&self, program_id: &str) -> Option<&Program> {
        self.state.programs.iter().find(|p| p.id == program_id)
    }

    /// The selected program, if the selection still names one.
    pub fn selected(&self) -> Option<&Program> {
        self.state.selected_program_id.as_deref().and_then(|id| self.program(id))
    }

    /// Replaces the program list. A selection that no longer names a program
    /// is cleared.
    pub fn set_programs(&mut self, programs: Vec<Program>) -> StoreResult<()> {
        let mut next = self.state.clone();
        next.programs = programs;
        if next
            .selected_program_id
            .as_deref()
            .is_some_and(|id| !next.programs.iter().any(|p| p.id == id))
        {
            next.selected_program_id = None;
        }
        self.commit(next)
    }

    /// Selects a program by id, or clears the selection with `None`.
    ///
    /// # Errors
    ///
    /// [`DomainError::UnknownProgram`] for an id that is not in the list.
    pub fn select(&mut self, program_id: Option<&str>) -> StoreResult<()> {
        if let Some(id) = program_id {
            if self.program(id).is_none() {
                return Err(DomainError::UnknownProgram(id.to_string()).into());
            }
        }
        let mut next = self.state.clone();
        next.selected_program_id = program_id.map(str::to_string);
        self.commit(next)
    }

    fn commit(&mut self, next: ProgramState) -> StoreResult<()> {
        save(self.storage.as_ref(), Partition::Program, &next)?;
        self.state = next;
        Ok(())
    }
}
