//! Application state for the terminal front end.
//!
//! [`App`] owns the stores and the identity adapter and tracks which screen
//! is showing, what the user is typing, and which row is highlighted. Rows
//! on the active workout screen are resolved to exercise and set ids at the
//! moment a key is handled; only ids are handed to the stores.

use super::identity::{AuthState, IdentityAdapter};
use super::session_view::{MountOutcome, Route, SessionView};
use super::store::{ProgramStore, SessionStore};
use crate::domain::catalog::search_exercises;
use crate::domain::{
    filter_by_program, personal_records, Exercise, PersonalRecord, SetField, Workout, WorkoutDraft,
};
use crate::infrastructure::CsvExporter;
use std::fmt::Display;
use std::path::PathBuf;

/// Number of completed workouts listed on the dashboard.
pub const RECENT_WORKOUTS: usize = 5;

/// What a line of input is being typed for.
#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    Email,
    Password,
    WorkoutName,
    DraftNotes,
    SessionNotes,
    Weight { exercise_id: String, set_id: String },
    Reps { exercise_id: String, set_id: String },
    ExportPath,
}

impl EditTarget {
    pub fn label(&self) -> &'static str {
        match self {
            EditTarget::Email => "Email",
            EditTarget::Password => "Password",
            EditTarget::WorkoutName => "Workout name",
            EditTarget::DraftNotes | EditTarget::SessionNotes => "Notes",
            EditTarget::Weight { .. } => "Weight",
            EditTarget::Reps { .. } => "Reps",
            EditTarget::ExportPath => "Export CSV to",
        }
    }
}

/// How keys are interpreted on the current screen.
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    Editing(EditTarget),
    /// Choosing a library exercise, filtered by `search_query`.
    PickExercise,
    /// Waiting for the user to confirm discarding the active workout.
    ConfirmCancel,
    Help,
}

/// A line on the active workout screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRow {
    Exercise { exercise_id: String },
    Set { exercise_id: String, set_id: String },
}

impl SessionRow {
    pub fn exercise_id(&self) -> &str {
        match self {
            SessionRow::Exercise { exercise_id } | SessionRow::Set { exercise_id, .. } => exercise_id,
        }
    }
}

/// One day of one program that a new workout can be seeded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSeed {
    pub program_id: String,
    pub workout_id: String,
    pub label: String,
}

/// Main application state behind the terminal front end.
///
/// Holds the stores and the identity adapter together with everything the
/// renderer needs: the current screen, the key mode, the highlighted row and
/// the line being typed. Operations never fail outward; problems land in
/// `status_message` for the status bar.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use std::rc::Rc;
/// use gymrat::application::{App, IdentityAdapter, ProgramStore, Route, SessionStore, SystemClock};
/// use gymrat::infrastructure::MemoryStore;
///
/// let memory = MemoryStore::new();
/// let mut identity = IdentityAdapter::offline(Rc::new(memory.clone()));
/// identity.initialize().unwrap();
/// let sessions = SessionStore::open(Rc::new(memory.clone()), Rc::new(SystemClock)).unwrap();
/// let programs = ProgramStore::open(Rc::new(memory)).unwrap();
///
/// let app = App::new(sessions, programs, identity, PathBuf::from("history.csv"));
/// assert_eq!(app.screen, Route::Login);
/// assert!(app.status_message.is_none());
/// ```
pub struct App {
    /// Screen currently shown
    pub screen: Route,
    /// How key presses are interpreted
    pub mode: AppMode,
    /// Active workout and history
    pub sessions: SessionStore,
    /// Programs and the selected program
    pub programs: ProgramStore,
    /// Signed-in user and sign-in operations
    pub identity: IdentityAdapter,
    /// Present while the active workout screen is mounted.
    pub view: Option<SessionView>,
    pub draft: WorkoutDraft,
    /// Index into [`App::program_seeds`] the draft was seeded from.
    pub program_seed: Option<usize>,
    /// Highlighted row on the current screen.
    pub selected: usize,
    /// Line being typed in editing mode
    pub input: String,
    /// Cursor position within `input`, in characters.
    pub cursor_position: usize,
    /// Email entered on the login screen
    pub login_email: String,
    /// Password entered on the login screen; cleared after a sign-in
    pub login_password: String,
    /// Filter typed into the exercise picker
    pub search_query: String,
    /// Highlighted entry in the picker results
    pub picker_selected: usize,
    /// Program id the history list is limited to
    pub history_filter: Option<String>,
    /// Where the history CSV is written
    pub export_path: PathBuf,
    /// Message for the status bar, cleared on the next normal-mode key
    pub status_message: Option<String>,
    /// Set when the event loop should exit
    pub should_quit: bool,
}

impl App {
    /// Builds the app around an initialised identity adapter and opens the
    /// first screen.
    ///
    /// A signed-in user lands on the dashboard, anyone else on login. An
    /// identity adapter in the error state is reported in the status bar.
    ///
    /// # Arguments
    ///
    /// * `sessions` - Opened workout store
    /// * `programs` - Opened program store
    /// * `identity` - Identity adapter after `initialize`
    /// * `export_path` - Default target for the history CSV
    pub fn new(
        sessions: SessionStore,
        programs: ProgramStore,
        identity: IdentityAdapter,
        export_path: PathBuf,
    ) -> Self {
        let draft = WorkoutDraft::new(sessions.now());
        let mut app = Self {
            screen: Route::Login,
            mode: AppMode::Normal,
            sessions,
            programs,
            identity,
            view: None,
            draft,
            program_seed: None,
            selected: 0,
            input: String::new(),
            cursor_position: 0,
            login_email: String::new(),
            login_password: String::new(),
            search_query: String::new(),
            picker_selected: 0,
            history_filter: None,
            export_path,
            status_message: None,
            should_quit: false,
        };
        if let AuthState::Error(message) = app.identity.state() {
            app.status_message = Some(format!("Sign-in unavailable: {}", message));
        }
        app.navigate(Route::Dashboard);
        app
    }

    /// Switches screens. Screens other than login require a signed-in user;
    /// the new workout screen hands over to the active workout when one is
    /// already in progress.
    pub fn navigate(&mut self, route: Route) {
        if route != Route::ActiveWorkout {
            if let Some(mut view) = self.view.take() {
                view.unmount();
            }
        }
        self.mode = AppMode::Normal;
        self.selected = 0;

        if route != Route::Login && self.identity.current_user().is_none() {
            self.screen = Route::Login;
            return;
        }

        match route {
            Route::ActiveWorkout => {
                match SessionView::mount(&self.sessions, self.identity.current_user()) {
                    MountOutcome::Ready(view) => {
                        self.view = Some(view);
                        self.screen = Route::ActiveWorkout;
                    }
                    MountOutcome::Redirect(to) => self.navigate(to),
                }
            }
            Route::NewWorkout => {
                if self.sessions.active().is_some() {
                    self.status_message = Some("Resuming the workout in progress".to_string());
                    self.navigate(Route::ActiveWorkout);
                } else {
                    self.draft = WorkoutDraft::new(self.sessions.now());
                    self.program_seed = None;
                    self.screen = Route::NewWorkout;
                }
            }
            other => self.screen = other,
        }
    }

    /// Advances the workout timer. Called from the event loop on every poll.
    pub fn tick(&mut self) -> bool {
        match self.view.as_mut() {
            Some(view) => view.tick(&self.sessions),
            None => false,
        }
    }

    fn report<T, E: Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.status_message = Some(err.to_string());
                None
            }
        }
    }

    // ----- line editing -----

    /// Enters editing mode with the current value of `target` in the buffer.
    pub fn start_editing(&mut self, target: EditTarget) {
        self.input = self.current_value(&target);
        self.cursor_position = self.input.chars().count();
        self.status_message = None;
        self.mode = AppMode::Editing(target);
    }

    fn current_value(&self, target: &EditTarget) -> String {
        match target {
            EditTarget::Email => self.login_email.clone(),
            EditTarget::Password => self.login_password.clone(),
            EditTarget::WorkoutName => self.draft.name.clone(),
            EditTarget::DraftNotes => self.draft.notes.clone(),
            EditTarget::SessionNotes => self
                .view
                .as_ref()
                .map(|v| v.notes_draft().to_string())
                .unwrap_or_default(),
            EditTarget::Weight { exercise_id, set_id } | EditTarget::Reps { exercise_id, set_id } => {
                let set = self
                    .sessions
                    .active()
                    .and_then(|w| w.exercise(exercise_id))
                    .and_then(|e| e.set(set_id));
                match (target, set) {
                    (EditTarget::Weight { .. }, Some(set)) => set.weight.to_string(),
                    (_, Some(set)) => set.reps.to_string(),
                    (_, None) => String::new(),
                }
            }
            EditTarget::ExportPath => self.export_path.display().to_string(),
        }
    }

    /// Applies the buffer to the field being edited. Input that does not
    /// parse keeps the editor open with the problem in the status line.
    pub fn finish_editing(&mut self) {
        let AppMode::Editing(target) = self.mode.clone() else {
            return;
        };
        let input = self.input.clone();
        let applied = match target {
            EditTarget::Email => {
                self.login_email = input.trim().to_string();
                true
            }
            EditTarget::Password => {
                self.login_password = input;
                true
            }
            EditTarget::WorkoutName => {
                self.draft.name = input;
                true
            }
            EditTarget::DraftNotes => {
                self.draft.notes = input;
                true
            }
            EditTarget::SessionNotes => self.save_session_notes(input),
            EditTarget::Weight { exercise_id, set_id } => {
                self.update_set_field(&exercise_id, &set_id, SetField::parse_weight(&input))
            }
            EditTarget::Reps { exercise_id, set_id } => {
                self.update_set_field(&exercise_id, &set_id, SetField::parse_reps(&input))
            }
            EditTarget::ExportPath => {
                self.export_path = PathBuf::from(input.trim());
                self.export_history();
                true
            }
        };
        if applied {
            self.mode = AppMode::Normal;
            self.input.clear();
            self.cursor_position = 0;
        }
    }

    /// Leaves editing mode without applying the buffer.
    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    /// Inserts a character at the cursor and moves the cursor past it.
    ///
    /// # Arguments
    ///
    /// * `c` - Character to insert
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.input.insert(at, c);
        self.cursor_position += 1;
    }

    /// Removes the character before the cursor, like Backspace.
    pub fn delete_char_before_cursor(&mut self) {
        if self.cursor_position > 0 {
            let at = self.byte_index(self.cursor_position - 1);
            self.input.remove(at);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor_position = (self.cursor_position + 1).min(self.input.chars().count());
    }

    // ----- login -----

    fn credentials(&mut self) -> Option<(String, String)> {
        if self.login_email.trim().is_empty() {
            self.status_message = Some("Please enter your email".to_string());
            return None;
        }
        Some((self.login_email.trim().to_string(), self.login_password.clone()))
    }

    fn welcome(&mut self, name: String) {
        self.login_password.clear();
        self.status_message = Some(format!("Welcome, {}", name));
        self.navigate(Route::Dashboard);
    }

    /// Signs in with the email and password typed on the login screen.
    ///
    /// On success the password is cleared and the dashboard opens with a
    /// welcome message. Failures stay on login with the error shown.
    pub fn sign_in(&mut self) {
        let Some((email, password)) = self.credentials() else {
            return;
        };
        let result = self.identity.sign_in(&email, &password);
        if let Some(user) = self.report(result) {
            self.welcome(user.label().to_string());
        }
    }

    /// Creates an account from the login fields, then behaves like
    /// [`sign_in`](Self::sign_in).
    pub fn sign_up(&mut self) {
        let Some((email, password)) = self.credentials() else {
            return;
        };
        let result = self.identity.sign_up(&email, &password);
        if let Some(user) = self.report(result) {
            self.welcome(user.label().to_string());
        }
    }

    pub fn sign_in_with_federated(&mut self) {
        let result = self.identity.sign_in_with_federated();
        if let Some(user) = self.report(result) {
            self.welcome(user.label().to_string());
        }
    }

    /// Requests a password reset email for the typed address.
    pub fn send_password_reset(&mut self) {
        let email = self.login_email.trim().to_string();
        let result = self.identity.send_password_reset(&email);
        if self.report(result).is_some() {
            self.status_message = Some(format!("Password reset email sent to {}", email));
        }
    }

    /// Signs out and returns to the login screen.
    pub fn sign_out(&mut self) {
        let result = self.identity.sign_out();
        if self.report(result).is_some() {
            self.status_message = Some("Signed out".to_string());
            self.navigate(Route::Login);
        }
    }

    // ----- new workout -----

    /// Every day of every program, in program order.
    pub fn program_seeds(&self) -> Vec<ProgramSeed> {
        self.programs
            .programs()
            .iter()
            .flat_map(|program| {
                program.workouts.iter().map(move |day| ProgramSeed {
                    program_id: program.id.clone(),
                    workout_id: day.id.clone(),
                    label: format!("{}: {}", program.name, day.name),
                })
            })
            .collect()
    }

    /// Seeds the draft from the next program day, wrapping back to an empty
    /// draft after the last one.
    pub fn cycle_program_seed(&mut self) {
        let seeds = self.program_seeds();
        let next = match self.program_seed {
            None if !seeds.is_empty() => Some(0),
            Some(i) if i + 1 < seeds.len() => Some(i + 1),
            _ => None,
        };
        match next.and_then(|i| seeds.get(i).map(|s| (i, s))) {
            Some((i, seed)) => {
                let applied = match self.programs.program(&seed.program_id) {
                    Some(program) => self.draft.apply_program_workout(program, &seed.workout_id),
                    None => Ok(()),
                };
                if self.report(applied).is_some() {
                    self.program_seed = Some(i);
                    self.status_message = Some(format!("Seeded from {}", seed.label));
                }
            }
            None => {
                self.draft.clear_program();
                self.program_seed = None;
            }
        }
        self.selected = 0;
    }

    /// Drops the highlighted exercise from the draft.
    pub fn remove_draft_exercise(&mut self) {
        if let Some(entry_id) = self.draft.exercises.get(self.selected).map(|e| e.id.clone()) {
            let result = self.draft.remove_exercise(&entry_id);
            self.report(result);
            self.clamp_selection(self.draft.exercises.len());
        }
    }

    /// Turns the draft into the active workout and opens it.
    ///
    /// A draft without exercises is refused with a status message and the
    /// new workout screen stays open.
    pub fn start_workout(&mut self) {
        let now = self.sessions.now();
        let user_id = self.identity.current_user().map(|u| u.uid.clone());
        let draft = self.draft.clone();
        let Some(workout) = self.report(draft.into_workout(user_id.as_deref(), now)) else {
            return;
        };
        let result = self.sessions.start(workout);
        if let Some(displaced) = self.report(result) {
            if let Some(old) = displaced {
                self.status_message = Some(format!("Replaced unfinished workout \"{}\"", old.name));
            }
            self.navigate(Route::ActiveWorkout);
        }
    }

    // ----- exercise picker -----

    /// Opens the exercise picker with an empty search.
    pub fn open_picker(&mut self) {
        self.search_query.clear();
        self.picker_selected = 0;
        self.mode = AppMode::PickExercise;
    }

    /// Library exercises whose name or muscle groups match the search.
    pub fn picker_results(&self) -> Vec<&'static Exercise> {
        search_exercises(&self.search_query)
    }

    pub fn picker_type(&mut self, c: char) {
        self.search_query.push(c);
        self.picker_selected = 0;
    }

    pub fn picker_backspace(&mut self) {
        self.search_query.pop();
        self.picker_selected = 0;
    }

    pub fn picker_move(&mut self, down: bool) {
        let count = self.picker_results().len();
        if down {
            if self.picker_selected + 1 < count {
                self.picker_selected += 1;
            }
        } else {
            self.picker_selected = self.picker_selected.saturating_sub(1);
        }
    }

    /// Adds the highlighted exercise to the draft or the active workout,
    /// depending on the screen.
    pub fn pick_exercise(&mut self) {
        let Some(exercise) = self.picker_results().get(self.picker_selected).copied() else {
            return;
        };
        match self.screen {
            Route::NewWorkout => {
                self.draft.add_exercise(exercise);
            }
            Route::ActiveWorkout => {
                let Some(view) = &self.view else {
                    return;
                };
                let result = view.add_exercise(&mut self.sessions, exercise);
                // The picker stays open with the error when nothing was stored.
                if self.report(result).is_none() {
                    return;
                }
            }
            _ => return,
        }
        self.status_message = Some(format!("Added {}", exercise.name));
        self.mode = AppMode::Normal;
    }

    // ----- active workout -----

    /// Exercises followed by their sets, in display order.
    pub fn session_rows(&self) -> Vec<SessionRow> {
        let Some(workout) = self.sessions.active() else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        for exercise in &workout.exercises {
            rows.push(SessionRow::Exercise {
                exercise_id: exercise.id.clone(),
            });
            rows.extend(exercise.sets.iter().map(|set| SessionRow::Set {
                exercise_id: exercise.id.clone(),
                set_id: set.id.clone(),
            }));
        }
        rows
    }

    pub fn selected_session_row(&self) -> Option<SessionRow> {
        self.session_rows().into_iter().nth(self.selected)
    }

    /// Moves the highlight one row, staying within the current screen's
    /// rows.
    ///
    /// # Arguments
    ///
    /// * `down` - `true` moves down, `false` moves up
    pub fn move_selection(&mut self, down: bool) {
        let count = self.row_count();
        if down {
            if self.selected + 1 < count {
                self.selected += 1;
            }
        } else {
            self.selected = self.selected.saturating_sub(1);
        }
    }

    fn row_count(&self) -> usize {
        match self.screen {
            Route::NewWorkout => self.draft.exercises.len(),
            Route::ActiveWorkout => self.session_rows().len(),
            Route::History => self.history_view().len(),
            Route::Dashboard => self.sessions.recent(RECENT_WORKOUTS).len(),
            Route::Login => 0,
        }
    }

    fn clamp_selection(&mut self, count: usize) {
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    /// Adds a set to the exercise of the highlighted row and highlights the
    /// new set.
    pub fn add_set(&mut self) {
        let (Some(view), Some(row)) = (&self.view, self.selected_session_row()) else {
            return;
        };
        let result = view.add_set(&mut self.sessions, row.exercise_id());
        if let Some(set_id) = self.report(result) {
            let target = SessionRow::Set {
                exercise_id: row.exercise_id().to_string(),
                set_id,
            };
            if let Some(position) = self.session_rows().iter().position(|r| *r == target) {
                self.selected = position;
            }
        }
    }

    /// Opens the weight or reps editor for the highlighted set.
    pub fn edit_selected_set(&mut self, weight: bool) {
        if let Some(SessionRow::Set { exercise_id, set_id }) = self.selected_session_row() {
            self.start_editing(if weight {
                EditTarget::Weight { exercise_id, set_id }
            } else {
                EditTarget::Reps { exercise_id, set_id }
            });
        }
    }

    fn update_set_field(
        &mut self,
        exercise_id: &str,
        set_id: &str,
        field: crate::domain::DomainResult<SetField>,
    ) -> bool {
        let Some(field) = self.report(field) else {
            return false;
        };
        let Some(view) = &self.view else {
            return true;
        };
        let result = view.update_set(&mut self.sessions, exercise_id, set_id, field);
        self.report(result).is_some()
    }

    /// Flips the completed flag of the highlighted set.
    pub fn toggle_selected_set(&mut self) {
        let (Some(view), Some(SessionRow::Set { exercise_id, set_id })) =
            (&self.view, self.selected_session_row())
        else {
            return;
        };
        let result = view.toggle_set(&mut self.sessions, &exercise_id, &set_id);
        self.report(result);
    }

    /// Deletes the highlighted set. The highlight stays in range.
    pub fn delete_selected_set(&mut self) {
        let (Some(view), Some(SessionRow::Set { exercise_id, set_id })) =
            (&self.view, self.selected_session_row())
        else {
            return;
        };
        let result = view.delete_set(&mut self.sessions, &exercise_id, &set_id);
        self.report(result);
        self.clamp_selection(self.session_rows().len());
    }

    /// Removes the exercise of the highlighted row with all its sets.
    pub fn remove_selected_exercise(&mut self) {
        let (Some(view), Some(row)) = (&self.view, self.selected_session_row()) else {
            return;
        };
        let result = view.remove_exercise(&mut self.sessions, row.exercise_id());
        self.report(result);
        self.clamp_selection(self.session_rows().len());
    }

    fn save_session_notes(&mut self, notes: String) -> bool {
        let Some(view) = self.view.as_mut() else {
            return true;
        };
        view.set_notes_draft(notes);
        let result = view.save_notes(&mut self.sessions);
        self.report(result).is_some()
    }

    /// Completes the active workout and shows it at the top of history.
    pub fn complete_workout(&mut self) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let result = view.complete(&mut self.sessions);
        if let Some(route) = self.report(result) {
            if let Some(done) = self.sessions.history().first() {
                self.status_message = Some(format!("Workout complete: {}", done.name));
            }
            self.navigate(route);
        }
    }

    /// Asks for confirmation before discarding the active workout.
    pub fn request_cancel(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.request_cancel();
            self.mode = AppMode::ConfirmCancel;
        }
    }

    pub fn dismiss_cancel(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.dismiss_cancel();
        }
        self.mode = AppMode::Normal;
    }

    /// Discards the active workout after [`request_cancel`](Self::request_cancel)
    /// and returns to the dashboard.
    pub fn confirm_cancel(&mut self) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let result = view.confirm_cancel(&mut self.sessions);
        self.mode = AppMode::Normal;
        if let Some(Some(route)) = self.report(result) {
            self.status_message = Some("Workout cancelled".to_string());
            self.navigate(route);
        }
    }

    // ----- history -----

    /// Completed workouts under the current program filter, newest first.
    pub fn history_view(&self) -> Vec<&Workout> {
        filter_by_program(self.sessions.history(), self.history_filter.as_deref())
    }

    pub fn selected_history_workout(&self) -> Option<&Workout> {
        self.history_view().get(self.selected).copied()
    }

    /// Best completed set per exercise over the whole history.
    pub fn personal_records(&self) -> Vec<PersonalRecord> {
        personal_records(self.sessions.history())
    }

    pub fn history_filter_label(&self) -> String {
        match self.history_filter.as_deref() {
            None => "All workouts".to_string(),
            Some(id) => self
                .programs
                .program(id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| id.to_string()),
        }
    }

    /// Steps the program filter through every program and back to none.
    pub fn cycle_history_filter(&mut self) {
        let ids: Vec<&str> = self.programs.programs().iter().map(|p| p.id.as_str()).collect();
        let next = match self.history_filter.as_deref() {
            None => ids.first().copied(),
            Some(current) => ids
                .iter()
                .position(|id| *id == current)
                .and_then(|i| ids.get(i + 1))
                .copied(),
        };
        self.history_filter = next.map(str::to_string);
        self.selected = 0;
    }

    /// Writes the filtered history to `export_path` as CSV, one row per set.
    pub fn export_history(&mut self) {
        let workouts: Vec<Workout> = self.history_view().into_iter().cloned().collect();
        let result = CsvExporter::export_history_to_file(&workouts, &self.export_path);
        if let Some(rows) = self.report(result) {
            self.status_message = Some(format!(
                "Exported {} sets to {}",
                rows,
                self.export_path.display()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::ManualClock;
    use crate::config::Environment;
    use crate::infrastructure::{
        KeyValueStore, MemoryStore, Partition, PersistenceError, PersistenceResult, UnavailableIdentity,
    };
    use chrono::{TimeZone, Utc};
    use std::cell::Cell;
    use std::rc::Rc;

    fn app_with(identity: IdentityAdapter, memory: MemoryStore, clock: Rc<ManualClock>) -> App {
        let sessions = SessionStore::open(Rc::new(memory.clone()), clock).unwrap();
        let programs = ProgramStore::open(Rc::new(memory)).unwrap();
        App::new(sessions, programs, identity, PathBuf::from("history.csv"))
    }

    fn clock() -> Rc<ManualClock> {
        Rc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()))
    }

    fn signed_in_app() -> (App, Rc<ManualClock>) {
        let memory = MemoryStore::new();
        let mut identity = IdentityAdapter::offline(Rc::new(memory.clone()));
        identity.initialize().unwrap();
        identity.sign_in("demo@gymrat.com", "demo123").unwrap();
        let clock = clock();
        (app_with(identity, memory, clock.clone()), clock)
    }

    fn type_text(app: &mut App, text: &str) {
        app.input.clear();
        app.cursor_position = 0;
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    fn start_squat_workout(app: &mut App) {
        app.navigate(Route::NewWorkout);
        app.open_picker();
        for c in "squat".chars() {
            app.picker_type(c);
        }
        app.pick_exercise();
        app.start_workout();
    }

    #[test]
    fn test_anonymous_start_lands_on_login() {
        let memory = MemoryStore::new();
        let mut identity = IdentityAdapter::offline(Rc::new(memory.clone()));
        identity.initialize().unwrap();
        let mut app = app_with(identity, memory, clock());

        assert_eq!(app.screen, Route::Login);
        app.navigate(Route::History);
        assert_eq!(app.screen, Route::Login);
    }

    #[test]
    fn test_signed_in_start_lands_on_dashboard() {
        let (app, _) = signed_in_app();
        assert_eq!(app.screen, Route::Dashboard);
        assert!(matches!(app.mode, AppMode::Normal));
        assert!(app.view.is_none());
    }

    #[test]
    fn test_login_flow() {
        let memory = MemoryStore::new();
        let mut identity = IdentityAdapter::offline(Rc::new(memory.clone()));
        identity.initialize().unwrap();
        let mut app = app_with(identity, memory, clock());

        app.sign_in();
        assert_eq!(app.status_message.as_deref(), Some("Please enter your email"));

        app.start_editing(EditTarget::Email);
        type_text(&mut app, "admin@gymrat.com");
        app.finish_editing();
        app.start_editing(EditTarget::Password);
        type_text(&mut app, "demo123");
        app.finish_editing();
        app.sign_in();

        assert_eq!(app.screen, Route::Dashboard);
        assert_eq!(app.status_message.as_deref(), Some("Welcome, Demo Admin"));
        assert!(app.login_password.is_empty());
    }

    #[test]
    fn test_login_error_stays_on_login() {
        let memory = MemoryStore::new();
        let mut identity = IdentityAdapter::new(
            Box::new(UnavailableIdentity::new("down")),
            Environment::Production,
            Rc::new(memory.clone()),
        );
        identity.initialize().unwrap();
        let mut app = app_with(identity, memory, clock());
        assert!(app.status_message.as_deref().unwrap().contains("down"));

        app.login_email = "demo@gymrat.com".to_string();
        app.login_password = "demo123".to_string();
        app.sign_in();
        assert_eq!(app.screen, Route::Login);
        assert!(app.status_message.as_deref().unwrap().contains("unavailable"));
    }

    #[test]
    fn test_new_workout_requires_exercises() {
        let (mut app, _) = signed_in_app();
        app.navigate(Route::NewWorkout);
        assert_eq!(app.screen, Route::NewWorkout);
        assert_eq!(app.draft.name, "Workout - 2026-05-01");

        app.start_workout();
        assert_eq!(app.screen, Route::NewWorkout);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Please add at least one exercise to your workout")
        );
    }

    #[test]
    fn test_start_workout_mounts_session() {
        let (mut app, _) = signed_in_app();
        start_squat_workout(&mut app);

        assert_eq!(app.screen, Route::ActiveWorkout);
        assert!(app.view.is_some());
        let workout = app.sessions.active().unwrap();
        assert_eq!(workout.exercises[0].exercise_name, "Squat");
        assert_eq!(workout.user_id, crate::infrastructure::MOCK_USER_ID);
    }

    #[test]
    fn test_new_workout_resumes_active() {
        let (mut app, _) = signed_in_app();
        start_squat_workout(&mut app);
        app.navigate(Route::Dashboard);
        assert!(app.view.is_none());

        app.navigate(Route::NewWorkout);
        assert_eq!(app.screen, Route::ActiveWorkout);
        assert_eq!(app.sessions.history().len(), 0);
        assert_eq!(app.status_message.as_deref(), Some("Resuming the workout in progress"));
    }

    #[test]
    fn test_active_screen_without_workout_redirects() {
        let (mut app, _) = signed_in_app();
        app.navigate(Route::ActiveWorkout);
        assert_eq!(app.screen, Route::NewWorkout);
    }

    /// Reads pass through; writes fail once `fail` is set.
    struct ReadOnlyAfter {
        inner: MemoryStore,
        fail: Cell<bool>,
    }

    impl KeyValueStore for ReadOnlyAfter {
        fn read(&self, partition: Partition) -> PersistenceResult<Option<String>> {
            self.inner.read(partition)
        }

        fn write(&self, partition: Partition, contents: &str) -> PersistenceResult<()> {
            if self.fail.get() {
                return Err(PersistenceError::Io {
                    partition,
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.write(partition, contents)
        }

        fn remove(&self, partition: Partition) -> PersistenceResult<()> {
            self.inner.remove(partition)
        }
    }

    #[test]
    fn test_failed_pick_reports_error_and_keeps_picker_open() {
        let memory = MemoryStore::new();
        let mut identity = IdentityAdapter::offline(Rc::new(memory.clone()));
        identity.initialize().unwrap();
        identity.sign_in("demo@gymrat.com", "demo123").unwrap();
        let storage = Rc::new(ReadOnlyAfter {
            inner: memory.clone(),
            fail: Cell::new(false),
        });
        let sessions = SessionStore::open(storage.clone(), clock()).unwrap();
        let programs = ProgramStore::open(Rc::new(memory)).unwrap();
        let mut app = App::new(sessions, programs, identity, PathBuf::from("history.csv"));
        start_squat_workout(&mut app);
        assert_eq!(app.screen, Route::ActiveWorkout);

        storage.fail.set(true);
        app.open_picker();
        for c in "bench".chars() {
            app.picker_type(c);
        }
        app.pick_exercise();

        let status = app.status_message.clone().unwrap();
        assert!(status.contains("disk full"), "{}", status);
        assert!(!status.starts_with("Added"));
        assert!(matches!(app.mode, AppMode::PickExercise));
        assert_eq!(app.sessions.active().unwrap().exercises.len(), 1);

        storage.fail.set(false);
        app.pick_exercise();
        assert_eq!(app.status_message.as_deref(), Some("Added Bench Press"));
        assert!(matches!(app.mode, AppMode::Normal));
        assert_eq!(app.sessions.active().unwrap().exercises.len(), 2);
    }

    #[test]
    fn test_set_logging_through_rows() {
        let (mut app, _) = signed_in_app();
        start_squat_workout(&mut app);

        app.add_set();
        assert_eq!(app.selected, 1);
        assert!(matches!(app.selected_session_row(), Some(SessionRow::Set { .. })));

        app.edit_selected_set(true);
        type_text(&mut app, "100");
        app.finish_editing();
        app.edit_selected_set(false);
        type_text(&mut app, "5");
        app.finish_editing();
        app.toggle_selected_set();

        let set = &app.sessions.active().unwrap().exercises[0].sets[0];
        assert_eq!((set.weight, set.reps, set.completed), (100.0, 5, true));
    }

    #[test]
    fn test_invalid_number_keeps_editor_open() {
        let (mut app, _) = signed_in_app();
        start_squat_workout(&mut app);
        app.add_set();

        app.edit_selected_set(false);
        type_text(&mut app, "five");
        app.finish_editing();

        assert!(matches!(app.mode, AppMode::Editing(EditTarget::Reps { .. })));
        assert_eq!(app.status_message.as_deref(), Some("Invalid number: five"));
        assert_eq!(app.sessions.active().unwrap().exercises[0].sets[0].reps, 0);
    }

    #[test]
    fn test_delete_set_clamps_selection() {
        let (mut app, _) = signed_in_app();
        start_squat_workout(&mut app);
        app.add_set();
        app.add_set();
        assert_eq!(app.selected, 2);

        app.delete_selected_set();
        assert_eq!(app.selected, 1);
        assert_eq!(app.session_rows().len(), 2);
    }

    #[test]
    fn test_complete_goes_to_history() {
        let (mut app, clock) = signed_in_app();
        start_squat_workout(&mut app);
        app.add_set();
        clock.advance(3);
        assert!(app.tick());

        app.complete_workout();
        assert_eq!(app.screen, Route::History);
        assert!(app.view.is_none());
        assert_eq!(app.sessions.history()[0].duration, Some(3));
        assert_eq!(app.history_view().len(), 1);
    }

    #[test]
    fn test_cancel_requires_confirmation() {
        let (mut app, _) = signed_in_app();
        start_squat_workout(&mut app);

        app.request_cancel();
        assert!(matches!(app.mode, AppMode::ConfirmCancel));
        app.dismiss_cancel();
        assert!(app.sessions.active().is_some());

        app.request_cancel();
        app.confirm_cancel();
        assert_eq!(app.screen, Route::Dashboard);
        assert!(app.sessions.active().is_none());
        assert!(app.sessions.history().is_empty());
    }

    #[test]
    fn test_program_seed_cycle() {
        let (mut app, _) = signed_in_app();
        app.navigate(Route::NewWorkout);

        app.cycle_program_seed();
        assert_eq!(app.program_seed, Some(0));
        assert_eq!(app.draft.program_id.as_deref(), Some("template-1"));
        assert!(!app.draft.exercises.is_empty());

        let total = app.program_seeds().len();
        for _ in 1..total {
            app.cycle_program_seed();
        }
        assert_eq!(app.program_seed, Some(total - 1));
        app.cycle_program_seed();
        assert_eq!(app.program_seed, None);
        assert!(app.draft.exercises.is_empty());
    }

    #[test]
    fn test_history_filter_cycle() {
        let (mut app, _) = signed_in_app();
        assert_eq!(app.history_filter_label(), "All workouts");
        app.cycle_history_filter();
        assert_eq!(app.history_filter.as_deref(), Some("template-1"));
        assert_eq!(app.history_filter_label(), "Beginner Strength");

        for _ in 0..app.programs.programs().len() {
            app.cycle_history_filter();
        }
        assert_eq!(app.history_filter, None);
    }

    #[test]
    fn test_export_history() {
        let dir = tempfile::TempDir::new().unwrap();
        let (mut app, _) = signed_in_app();
        start_squat_workout(&mut app);
        app.add_set();
        app.complete_workout();

        app.start_editing(EditTarget::ExportPath);
        let path = dir.path().join("out.csv");
        type_text(&mut app, &path.display().to_string());
        app.finish_editing();

        assert_eq!(app.export_path, path);
        assert!(app.status_message.as_deref().unwrap().starts_with("Exported 1 sets"));
        assert!(path.exists());
    }

    #[test]
    fn test_cursor_editing_handles_multibyte() {
        let (mut app, _) = signed_in_app();
        app.start_editing(EditTarget::WorkoutName);
        type_text(&mut app, "Bein");
        app.move_cursor_left();
        app.insert_char('ü');
        assert_eq!(app.input, "Beiün");
        app.move_cursor_right();
        app.delete_char_before_cursor();
        assert_eq!(app.input, "Beiü");
    }

    #[test]
    fn test_sign_out_returns_to_login() {
        let (mut app, _) = signed_in_app();
        app.sign_out();
        assert_eq!(app.screen, Route::Login);
        assert!(app.identity.current_user().is_none());
    }
}
