use crate::application::{App, AppMode, EditTarget, Route};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            app.should_quit = true;
            return;
        }
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key),
            AppMode::Editing(_) => Self::handle_editing_mode(app, key),
            AppMode::PickExercise => Self::handle_picker_mode(app, key),
            AppMode::ConfirmCancel => Self::handle_confirm_cancel_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode) {
        app.status_message = None;
        match key {
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                return;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.move_selection(false);
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.move_selection(true);
                return;
            }
            _ => {}
        }
        match app.screen {
            Route::Login => Self::handle_login(app, key),
            Route::Dashboard => Self::handle_dashboard(app, key),
            Route::NewWorkout => Self::handle_new_workout(app, key),
            Route::ActiveWorkout => Self::handle_active_workout(app, key),
            Route::History => Self::handle_history(app, key),
        }
    }

    fn handle_login(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('e') => app.start_editing(EditTarget::Email),
            KeyCode::Char('p') => app.start_editing(EditTarget::Password),
            KeyCode::Enter => app.sign_in(),
            KeyCode::Char('u') => app.sign_up(),
            KeyCode::Char('g') => app.sign_in_with_federated(),
            KeyCode::Char('r') => app.send_password_reset(),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        }
    }

    fn handle_dashboard(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('n') => app.navigate(Route::NewWorkout),
            KeyCode::Char('a') | KeyCode::Enter => app.navigate(Route::ActiveWorkout),
            KeyCode::Char('h') => app.navigate(Route::History),
            KeyCode::Char('o') => app.sign_out(),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        }
    }

    fn handle_new_workout(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('t') => app.start_editing(EditTarget::WorkoutName),
            KeyCode::Char('n') => app.start_editing(EditTarget::DraftNotes),
            KeyCode::Char('a') => app.open_picker(),
            KeyCode::Char('d') | KeyCode::Delete => app.remove_draft_exercise(),
            KeyCode::Char('p') => app.cycle_program_seed(),
            KeyCode::Char('c') => {
                app.draft.clear_program();
                app.program_seed = None;
                app.selected = 0;
            }
            KeyCode::Enter | KeyCode::Char('s') => app.start_workout(),
            KeyCode::Esc => app.navigate(Route::Dashboard),
            _ => {}
        }
    }

    fn handle_active_workout(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('s') => app.add_set(),
            KeyCode::Char('w') => app.edit_selected_set(true),
            KeyCode::Char('r') => app.edit_selected_set(false),
            KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected_set(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_set(),
            KeyCode::Char('D') => app.remove_selected_exercise(),
            KeyCode::Char('a') => app.open_picker(),
            KeyCode::Char('n') => app.start_editing(EditTarget::SessionNotes),
            KeyCode::Char('c') => app.complete_workout(),
            KeyCode::Char('X') => app.request_cancel(),
            KeyCode::Esc => app.navigate(Route::Dashboard),
            _ => {}
        }
    }

    fn handle_history(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('f') => app.cycle_history_filter(),
            KeyCode::Char('e') => app.start_editing(EditTarget::ExportPath),
            KeyCode::Esc => app.navigate(Route::Dashboard),
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            KeyCode::Backspace => app.delete_char_before_cursor(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.cursor_position = 0,
            KeyCode::End => app.cursor_position = app.input.chars().count(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_picker_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.pick_exercise(),
            KeyCode::Esc => app.mode = AppMode::Normal,
            KeyCode::Up => app.picker_move(false),
            KeyCode::Down => app.picker_move(true),
            KeyCode::Backspace => app.picker_backspace(),
            KeyCode::Char(c) => app.picker_type(c),
            _ => {}
        }
    }

    fn handle_confirm_cancel_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_cancel(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.dismiss_cancel(),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        if matches!(
            key,
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            app.mode = AppMode::Normal;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{IdentityAdapter, ManualClock, ProgramStore, SessionStore};
    use crate::infrastructure::MemoryStore;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;
    use std::rc::Rc;

    fn app() -> App {
        let memory = MemoryStore::new();
        let clock = Rc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()));
        let mut identity = IdentityAdapter::offline(Rc::new(memory.clone()));
        identity.initialize().unwrap();
        let sessions = SessionStore::open(Rc::new(memory.clone()), clock).unwrap();
        let programs = ProgramStore::open(Rc::new(memory)).unwrap();
        App::new(sessions, programs, identity, PathBuf::from("history.csv"))
    }

    fn press(app: &mut App, key: KeyCode) {
        InputHandler::handle_key_event(app, key, KeyModifiers::NONE);
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn log_in(app: &mut App) {
        press(app, KeyCode::Char('e'));
        type_str(app, "demo@gymrat.com");
        press(app, KeyCode::Enter);
        press(app, KeyCode::Char('p'));
        type_str(app, "demo123");
        press(app, KeyCode::Enter);
        press(app, KeyCode::Enter);
    }

    #[test]
    fn test_login_keys() {
        let mut app = app();
        assert_eq!(app.screen, Route::Login);
        log_in(&mut app);
        assert_eq!(app.screen, Route::Dashboard);
        assert_eq!(
            app.identity.current_user().and_then(|u| u.display_name.as_deref()),
            Some("Demo Client")
        );
    }

    #[test]
    fn test_escape_cancels_editing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        assert!(matches!(app.mode, AppMode::Editing(EditTarget::Email)));
        type_str(&mut app, "abc");
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, AppMode::Normal));
        assert!(app.login_email.is_empty());
    }

    #[test]
    fn test_workout_session_keys() {
        let mut app = app();
        log_in(&mut app);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Route::NewWorkout);
        press(&mut app, KeyCode::Char('a'));
        assert!(matches!(app.mode, AppMode::PickExercise));
        type_str(&mut app, "bench");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.screen, Route::ActiveWorkout);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "60");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));

        let set = &app.sessions.active().unwrap().exercises[0].sets[0];
        assert_eq!(set.weight, 60.0);
        assert!(set.completed);

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.screen, Route::History);
        assert_eq!(app.sessions.history().len(), 1);
    }

    #[test]
    fn test_cancel_confirmation_keys() {
        let mut app = app();
        log_in(&mut app);
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Route::ActiveWorkout);

        press(&mut app, KeyCode::Char('X'));
        assert!(matches!(app.mode, AppMode::ConfirmCancel));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.sessions.active().is_some());

        press(&mut app, KeyCode::Char('X'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.screen, Route::Dashboard);
        assert!(app.sessions.active().is_none());
    }

    #[test]
    fn test_quit_keys() {
        let mut on_login = app();
        press(&mut on_login, KeyCode::Char('q'));
        assert!(on_login.should_quit);

        let mut editing = app();
        press(&mut editing, KeyCode::Char('e'));
        InputHandler::handle_key_event(&mut editing, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(editing.should_quit);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(matches!(app.mode, AppMode::Help));
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, AppMode::Normal));
    }
}
