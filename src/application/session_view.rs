//! The active workout screen's state: timer, notes draft and the commands
//! it issues against the [`SessionStore`].

use super::store::{SessionStore, StoreError, StoreResult};
use crate::domain::{format_elapsed, Exercise, SetField, User, WorkoutEditor};

/// Screens a view can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    NewWorkout,
    ActiveWorkout,
    History,
}

#[derive(Debug)]
pub enum MountOutcome {
    Ready(SessionView),
    Redirect(Route),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    workout_id: String,
    elapsed: u64,
    running: bool,
    last_tick: Option<chrono::DateTime<chrono::Utc>>,
    notes_draft: String,
    confirming_cancel: bool,
}

impl SessionView {
    /// Opens the view on the active workout. Without a signed-in user the
    /// outcome is a redirect to login; without an active workout it is a
    /// redirect to the new workout screen.
    pub fn mount(store: &SessionStore, user: Option<&User>) -> MountOutcome {
        if user.is_none() {
            return MountOutcome::Redirect(Route::Login);
        }
        let Some(workout) = store.active() else {
            return MountOutcome::Redirect(Route::NewWorkout);
        };
        let now = store.now();
        MountOutcome::Ready(SessionView {
            workout_id: workout.id.clone(),
            elapsed: workout.elapsed_at(now),
            running: true,
            last_tick: Some(now),
            notes_draft: workout.notes.clone(),
            confirming_cancel: false,
        })
    }

    pub fn workout_id(&self) -> &str {
        &self.workout_id
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.elapsed)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn notes_draft(&self) -> &str {
        &self.notes_draft
    }

    pub fn set_notes_draft(&mut self, notes: impl Into<String>) {
        self.notes_draft = notes.into();
    }

    pub fn is_confirming_cancel(&self) -> bool {
        self.confirming_cancel
    }

    /// Recomputes the elapsed time from the wall clock, at most once per
    /// second. Returns true when the displayed value changed.
    ///
    /// The timer stops for good once the mounted workout is no longer the
    /// active one.
    pub fn tick(&mut self, store: &SessionStore) -> bool {
        if !self.running {
            return false;
        }
        let Some(workout) = store.active().filter(|w| w.id == self.workout_id) else {
            tracing::debug!(workout_id = %self.workout_id, "active workout gone, timer stopped");
            self.running = false;
            return false;
        };
        let now = store.now();
        if let Some(last) = self.last_tick {
            let since = (now - last).num_milliseconds();
            // A clock that jumped backwards resets the gate.
            if (0..1000).contains(&since) {
                return false;
            }
        }
        self.last_tick = Some(now);
        let elapsed = workout.elapsed_at(now);
        let changed = elapsed != self.elapsed;
        self.elapsed = elapsed;
        changed
    }

    pub fn add_set(&self, store: &mut SessionStore, exercise_id: &str) -> StoreResult<String> {
        let now = store.now();
        store.edit_active(|w| WorkoutEditor::new(w).add_set(exercise_id, now))
    }

    pub fn update_set(
        &self,
        store: &mut SessionStore,
        exercise_id: &str,
        set_id: &str,
        field: SetField,
    ) -> StoreResult<()> {
        store.edit_active(|w| WorkoutEditor::new(w).update_set(exercise_id, set_id, field))
    }

    pub fn toggle_set(&self, store: &mut SessionStore, exercise_id: &str, set_id: &str) -> StoreResult<bool> {
        store.edit_active(|w| WorkoutEditor::new(w).toggle_set_completed(exercise_id, set_id))
    }

    pub fn delete_set(&self, store: &mut SessionStore, exercise_id: &str, set_id: &str) -> StoreResult<()> {
        store.edit_active(|w| WorkoutEditor::new(w).delete_set(exercise_id, set_id).map(|_| ()))
    }

    pub fn add_exercise(&self, store: &mut SessionStore, exercise: &Exercise) -> StoreResult<String> {
        store.edit_active(|w| Ok(WorkoutEditor::new(w).add_exercise(exercise)))
    }

    pub fn remove_exercise(&self, store: &mut SessionStore, exercise_id: &str) -> StoreResult<()> {
        store.edit_active(|w| WorkoutEditor::new(w).remove_exercise(exercise_id).map(|_| ()))
    }

    pub fn save_notes(&self, store: &mut SessionStore) -> StoreResult<()> {
        store.edit_active(|w| {
            WorkoutEditor::new(w).set_notes(&self.notes_draft);
            Ok(())
        })
    }

    /// Finishes the workout with `endTime = now` and the timer's elapsed
    /// seconds, merging the notes draft.
    pub fn complete(&mut self, store: &mut SessionStore) -> StoreResult<Route> {
        let mut workout = store.active().cloned().ok_or(StoreError::NoActiveWorkout)?;
        let now = store.now();
        self.elapsed = workout.elapsed_at(now);
        workout.end_time = Some(now.max(workout.start_time));
        workout.duration = Some(self.elapsed);
        workout.notes = self.notes_draft.clone();
        store.complete(workout)?;
        self.running = false;
        Ok(Route::History)
    }

    pub fn request_cancel(&mut self) {
        self.confirming_cancel = true;
    }

    pub fn dismiss_cancel(&mut self) {
        self.confirming_cancel = false;
    }

    /// Discards the workout if a cancel was requested. `Ok(None)` means there
    /// was nothing to confirm.
    pub fn confirm_cancel(&mut self, store: &mut SessionStore) -> StoreResult<Option<Route>> {
        if !self.confirming_cancel {
            return Ok(None);
        }
        store.cancel()?;
        self.confirming_cancel = false;
        self.running = false;
        Ok(Some(Route::Dashboard))
    }

    pub fn unmount(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::{Clock, ManualClock};
    use crate::domain::catalog::find_exercise;
    use crate::domain::{DomainError, Workout, WorkoutExercise};
    use crate::infrastructure::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use std::rc::Rc;

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 2, 17, 45, 0).unwrap()
    }

    fn user() -> User {
        User {
            uid: "u1".to_string(),
            display_name: Some("Sam".to_string()),
            email: None,
            photo_url: None,
        }
    }

    fn setup() -> (SessionStore, Rc<ManualClock>, String) {
        let clock = Rc::new(ManualClock::new(start_time()));
        let mut store = SessionStore::open(Rc::new(MemoryStore::new()), clock.clone()).unwrap();
        let squat = WorkoutExercise::new("ex2", "Squat");
        let squat_id = squat.id.clone();
        store
            .start(Workout {
                id: "w1".to_string(),
                name: "Leg Day".to_string(),
                description: None,
                exercises: vec![squat],
                start_time: start_time(),
                end_time: None,
                duration: None,
                notes: "knees ok".to_string(),
                program_id: None,
                user_id: "u1".to_string(),
            })
            .unwrap();
        (store, clock, squat_id)
    }

    fn mounted(store: &SessionStore) -> SessionView {
        match SessionView::mount(store, Some(&user())) {
            MountOutcome::Ready(view) => view,
            MountOutcome::Redirect(route) => panic!("unexpected redirect to {:?}", route),
        }
    }

    #[test]
    fn test_mount_redirects() {
        let clock = Rc::new(ManualClock::new(start_time()));
        let store = SessionStore::open(Rc::new(MemoryStore::new()), clock).unwrap();
        assert!(matches!(
            SessionView::mount(&store, Some(&user())),
            MountOutcome::Redirect(Route::NewWorkout)
        ));
        assert!(matches!(SessionView::mount(&store, None), MountOutcome::Redirect(Route::Login)));
    }

    #[test]
    fn test_mount_takes_notes_and_elapsed() {
        let (store, clock, _) = setup();
        clock.advance(75);
        let view = mounted(&store);
        assert_eq!(view.notes_draft(), "knees ok");
        assert_eq!(view.elapsed(), 75);
        assert!(view.is_running());
    }

    #[test]
    fn test_tick_recomputes_from_wall_clock() {
        let (store, clock, _) = setup();
        let mut view = mounted(&store);

        clock.advance(1);
        assert!(view.tick(&store));
        assert_eq!(view.elapsed(), 1);

        // A long suspension is picked up on the next tick, not counted in steps.
        clock.advance(3600);
        assert!(view.tick(&store));
        assert_eq!(view.elapsed_label(), "01:00:01");
    }

    #[test]
    fn test_tick_at_most_once_per_second() {
        let (store, clock, _) = setup();
        let mut view = mounted(&store);
        clock.set(start_time() + chrono::Duration::milliseconds(400));
        assert!(!view.tick(&store));
        clock.set(start_time() + chrono::Duration::milliseconds(1200));
        assert!(view.tick(&store));
        assert_eq!(view.elapsed(), 1);
    }

    #[test]
    fn test_timer_stops_when_workout_disappears() {
        let (mut store, clock, _) = setup();
        let mut view = mounted(&store);
        store.cancel().unwrap();
        clock.advance(5);
        assert!(!view.tick(&store));
        assert!(!view.is_running());
    }

    #[test]
    fn test_unmount_stops_timer() {
        let (store, clock, _) = setup();
        let mut view = mounted(&store);
        view.unmount();
        clock.advance(5);
        assert!(!view.tick(&store));
        assert_eq!(view.elapsed(), 0);
    }

    #[test]
    fn test_set_commands_address_by_id() {
        let (mut store, _, squat) = setup();
        let view = mounted(&store);

        let first = view.add_set(&mut store, &squat).unwrap();
        view.update_set(&mut store, &squat, &first, SetField::Weight(100.0)).unwrap();
        view.update_set(&mut store, &squat, &first, SetField::Reps(5)).unwrap();
        let second = view.add_set(&mut store, &squat).unwrap();
        assert!(view.toggle_set(&mut store, &squat, &second).unwrap());

        let sets = &store.active().unwrap().exercises[0].sets;
        assert_eq!(sets.len(), 2);
        assert_eq!((sets[1].weight, sets[1].reps), (100.0, 5));
        assert!(sets[1].completed);
        assert!(!sets[0].completed);

        view.delete_set(&mut store, &squat, &first).unwrap();
        let err = view.toggle_set(&mut store, &squat, &first).unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::SetNotFound(_))));
        assert_eq!(store.active().unwrap().exercises[0].sets[0].id, second);
    }

    #[test]
    fn test_exercise_commands() {
        let (mut store, _, squat) = setup();
        let view = mounted(&store);
        let bench = find_exercise("ex1").unwrap();

        let added = view.add_exercise(&mut store, bench).unwrap();
        assert_eq!(store.active().unwrap().exercises.len(), 2);
        view.remove_exercise(&mut store, &squat).unwrap();
        let remaining = &store.active().unwrap().exercises;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, added);
        assert!(view.add_set(&mut store, &squat).is_err());
    }

    #[test]
    fn test_save_notes() {
        let (mut store, _, _) = setup();
        let mut view = mounted(&store);
        view.set_notes_draft("felt strong");
        view.save_notes(&mut store).unwrap();
        assert_eq!(store.active().unwrap().notes, "felt strong");
    }

    #[test]
    fn test_complete_uses_timer_and_notes() {
        let (mut store, clock, squat) = setup();
        let mut view = mounted(&store);
        view.add_set(&mut store, &squat).unwrap();
        view.set_notes_draft("done");
        clock.advance(3);

        assert_eq!(view.complete(&mut store).unwrap(), Route::History);
        assert!(store.active().is_none());
        let done = &store.history()[0];
        assert_eq!(done.duration, Some(3));
        assert_eq!(done.end_time, Some(start_time() + chrono::Duration::seconds(3)));
        assert_eq!(done.notes, "done");
        assert_eq!(done.total_sets(), 1);
        assert!(!view.is_running());
    }

    #[test]
    fn test_complete_with_sub_second_times_reloads_consistently() {
        let memory = MemoryStore::new();
        let clock = Rc::new(ManualClock::new(
            start_time() + chrono::Duration::nanoseconds(10_999_600_000),
        ));
        let mut store = SessionStore::open(Rc::new(memory.clone()), clock.clone()).unwrap();
        store
            .start(Workout {
                id: "w2".to_string(),
                name: "Leg Day".to_string(),
                description: None,
                exercises: vec![WorkoutExercise::new("ex2", "Squat")],
                start_time: store.now(),
                end_time: None,
                duration: None,
                notes: String::new(),
                program_id: None,
                user_id: "u1".to_string(),
            })
            .unwrap();
        let mut view = mounted(&store);

        clock.set(clock.now() + chrono::Duration::nanoseconds(2_999_900_000));
        view.complete(&mut store).unwrap();

        let reopened = SessionStore::open(Rc::new(memory), clock).unwrap();
        let done = &reopened.history()[0];
        assert_eq!(done, &store.history()[0]);
        let stored = (done.end_time.unwrap() - done.start_time).num_seconds() as u64;
        assert_eq!(done.duration, Some(stored));
        assert_eq!(done.duration, Some(3));
    }

    #[test]
    fn test_cancel_needs_confirmation() {
        let (mut store, _, _) = setup();
        let mut view = mounted(&store);

        assert_eq!(view.confirm_cancel(&mut store).unwrap(), None);
        assert!(store.active().is_some());

        view.request_cancel();
        view.dismiss_cancel();
        assert_eq!(view.confirm_cancel(&mut store).unwrap(), None);

        view.request_cancel();
        assert!(view.is_confirming_cancel());
        assert_eq!(view.confirm_cancel(&mut store).unwrap(), Some(Route::Dashboard));
        assert!(store.active().is_none());
        assert!(store.history().is_empty());
    }
}
