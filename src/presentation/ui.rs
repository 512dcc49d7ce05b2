use crate::application::{App, AppMode, EditTarget, Route, SessionRow, RECENT_WORKOUTS};
use crate::domain::{format_elapsed, Workout, WorkoutSummary};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    match app.screen {
        Route::Login => render_login(f, app, chunks[1]),
        Route::Dashboard => render_dashboard(f, app, chunks[1]),
        Route::NewWorkout => render_new_workout(f, app, chunks[1]),
        Route::ActiveWorkout => render_active_workout(f, app, chunks[1]),
        Route::History => render_history(f, app, chunks[1]),
    }
    render_status_bar(f, app, chunks[2]);

    match app.mode {
        AppMode::PickExercise => render_picker_popup(f, app),
        AppMode::ConfirmCancel => render_confirm_popup(f),
        AppMode::Help => render_help_popup(f, app.screen),
        _ => {}
    }
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().bg(Color::Blue).fg(Color::White)
    } else {
        Style::default()
    }
}

/// Centered rectangle covering the given percentages of `area`.
fn popup_area(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let scale = |len: u16, pct: u16| {
        let scaled = u32::from(len) * u32::from(pct.min(100)) / 100;
        u16::try_from(scaled).unwrap_or(len)
    };
    let width = scale(area.width, width_pct);
    let height = scale(area.height, height_pct);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let screen = match app.screen {
        Route::Login => "Sign in",
        Route::Dashboard => "Dashboard",
        Route::NewWorkout => "New workout",
        Route::ActiveWorkout => "Active workout",
        Route::History => "History",
    };
    let user = app
        .identity
        .current_user()
        .map(|u| u.label().to_string())
        .unwrap_or_else(|| "not signed in".to_string());
    let provider = if app.identity.is_using_fallback() {
        " (local)"
    } else {
        ""
    };
    let header = Paragraph::new(format!("GymRat | {} | {}{}", screen, user, provider))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_login(f: &mut Frame, app: &App, area: Rect) {
    let masked = "*".repeat(app.login_password.chars().count());
    let lines = vec![
        format!("Email:    {}", app.login_email),
        format!("Password: {}", masked),
        String::new(),
        "Demo account: demo@gymrat.com / demo123".to_string(),
    ];
    let login = Paragraph::new(lines.join("\n"))
        .block(Block::default().borders(Borders::ALL).title("Sign in to GymRat"));
    f.render_widget(login, popup_area(area, 60, 50));
}

fn workout_line(workout: &Workout) -> String {
    let summary = WorkoutSummary::of(workout);
    format!(
        "{}  {}  {}  {} exercises, {}/{} sets, {:.1} volume",
        workout.start_time.format("%Y-%m-%d"),
        workout.name,
        format_elapsed(workout.duration.unwrap_or_default()),
        summary.exercises,
        summary.completed_sets,
        summary.sets,
        summary.volume
    )
}

fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let banner = match app.sessions.active() {
        Some(workout) => Paragraph::new(format!(
            "In progress: {} ({} elapsed), press a to resume",
            workout.name,
            format_elapsed(workout.elapsed_at(app.sessions.now()))
        ))
        .style(Style::default().fg(Color::Green)),
        None => Paragraph::new("No workout in progress, press n to start one"),
    };
    f.render_widget(
        banner.block(Block::default().borders(Borders::ALL).title("Active workout")),
        chunks[0],
    );

    let items: Vec<ListItem> = app
        .sessions
        .recent(RECENT_WORKOUTS)
        .iter()
        .enumerate()
        .map(|(i, w)| ListItem::new(workout_line(w)).style(selected_style(i == app.selected)))
        .collect();
    let recent = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Recent workouts"),
    );
    f.render_widget(recent, chunks[1]);
}

fn render_new_workout(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let program = match app.program_seed.and_then(|i| app.program_seeds().get(i).cloned()) {
        Some(seed) => seed.label,
        None => "none".to_string(),
    };
    let details = Paragraph::new(format!(
        "Name:    {}\nNotes:   {}\nProgram: {}",
        app.draft.name, app.draft.notes, program
    ))
    .block(Block::default().borders(Borders::ALL).title("Workout"));
    f.render_widget(details, chunks[0]);

    let rows: Vec<Row> = app
        .draft
        .exercises
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Row::new(vec![
                Cell::from(e.exercise_name.clone()),
                Cell::from(e.target_label().unwrap_or_default()),
            ])
            .style(selected_style(i == app.selected))
        })
        .collect();
    let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
        .header(Row::new(vec!["Exercise", "Target"]).style(Style::default().fg(Color::Yellow)))
        .block(Block::default().borders(Borders::ALL).title("Exercises"));
    f.render_widget(table, chunks[1]);
}

fn render_active_workout(f: &mut Frame, app: &App, area: Rect) {
    let Some(workout) = app.sessions.active() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(4)])
        .split(area);

    let elapsed = app
        .view
        .as_ref()
        .map(|v| v.elapsed_label())
        .unwrap_or_else(|| format_elapsed(0));
    let timer = Paragraph::new(format!("{}   {}", workout.name, elapsed))
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title("Workout"));
    f.render_widget(timer, chunks[0]);

    let mut set_number = 0;
    let rows: Vec<Row> = app
        .session_rows()
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let exercise = workout.exercise(row.exercise_id())?;
            let cells = match row {
                SessionRow::Exercise { .. } => {
                    set_number = 0;
                    vec![
                        Cell::from(exercise.exercise_name.clone())
                            .style(Style::default().add_modifier(Modifier::BOLD)),
                        Cell::from(exercise.target_label().unwrap_or_default()),
                        Cell::from(format!(
                            "{}/{} done",
                            exercise.completed_sets(),
                            exercise.sets.len()
                        )),
                        Cell::from(""),
                    ]
                }
                SessionRow::Set { set_id, .. } => {
                    let set = exercise.set(set_id)?;
                    set_number += 1;
                    vec![
                        Cell::from(format!("  Set {}", set_number)),
                        Cell::from(format!("{} kg", set.weight)),
                        Cell::from(format!("{} reps", set.reps)),
                        Cell::from(if set.completed { "[x]" } else { "[ ]" }),
                    ]
                }
            };
            Some(Row::new(cells).style(selected_style(i == app.selected)))
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(10),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title("Exercises"));
    f.render_widget(table, chunks[1]);

    let notes = app.view.as_ref().map(|v| v.notes_draft()).unwrap_or("");
    let notes = Paragraph::new(notes.to_string())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Notes"));
    f.render_widget(notes, chunks[2]);
}

fn render_history(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let items: Vec<ListItem> = app
        .history_view()
        .iter()
        .enumerate()
        .map(|(i, w)| ListItem::new(workout_line(w)).style(selected_style(i == app.selected)))
        .collect();
    let history = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("History: {}", app.history_filter_label())),
    );
    f.render_widget(history, chunks[0]);

    let rows: Vec<Row> = app
        .personal_records()
        .into_iter()
        .map(|pr| {
            Row::new(vec![
                Cell::from(pr.exercise_name),
                Cell::from(format!("{} kg x {}", pr.weight, pr.reps)),
                Cell::from(pr.date.format("%Y-%m-%d").to_string()),
            ])
        })
        .collect();
    let records = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title("Personal records"));
    f.render_widget(records, chunks[1]);
}

fn key_hints(app: &App) -> &'static str {
    match app.screen {
        Route::Login => "e: email | p: password | Enter: sign in | u: sign up | g: Google | r: reset password | q: quit",
        Route::Dashboard => "n: new workout | a: resume | h: history | o: sign out | ?: help | q: quit",
        Route::NewWorkout => "t: name | n: notes | a: add exercise | d: remove | p: program day | Enter: start | Esc: back",
        Route::ActiveWorkout => "s: add set | w/r: weight/reps | space: done | d: delete set | a: add exercise | n: notes | c: complete | X: cancel",
        Route::History => "f: filter by program | e: export CSV | Esc: back",
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match &app.mode {
        AppMode::Editing(target) => {
            let shown = if *target == EditTarget::Password {
                "*".repeat(app.input.chars().count())
            } else {
                app.input.clone()
            };
            let problem = app
                .status_message
                .as_ref()
                .map(|m| format!("  ({})", m))
                .unwrap_or_default();
            format!("{}: {}{} (Enter to save, Esc to cancel)", target.label(), shown, problem)
        }
        AppMode::PickExercise => format!("Search: {} (Enter to add, Esc to close)", app.search_query),
        AppMode::ConfirmCancel => "Discard this workout? y: yes | n: no".to_string(),
        AppMode::Help => "Esc/?: close help".to_string(),
        AppMode::Normal => app
            .status_message
            .clone()
            .unwrap_or_else(|| key_hints(app).to_string()),
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing(_) => Style::default().fg(Color::Green),
            AppMode::PickExercise => Style::default().fg(Color::Yellow),
            AppMode::ConfirmCancel => Style::default().fg(Color::Red),
            AppMode::Help => Style::default().fg(Color::Cyan),
        });
    f.render_widget(status, area);

    if matches!(app.mode, AppMode::Editing(_)) {
        let offset = app.input.chars().take(app.cursor_position).count() as u16;
        let label = match &app.mode {
            AppMode::Editing(target) => target.label().chars().count() as u16 + 2,
            _ => 0,
        };
        f.set_cursor_position((area.x + 1 + label + offset, area.y + 1));
    }
}

fn render_picker_popup(f: &mut Frame, app: &App) {
    let area = popup_area(f.area(), 60, 60);
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = app
        .picker_results()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            ListItem::new(format!("{}  ({}, {})", e.name, e.muscle_groups.join(", "), e.difficulty))
                .style(selected_style(i == app.picker_selected))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Add exercise: {}", app.search_query))
            .style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(list, area);
}

fn render_confirm_popup(f: &mut Frame) {
    let area = popup_area(f.area(), 50, 20);
    f.render_widget(Clear, area);
    let confirm = Paragraph::new("Cancel this workout? Logged sets will be lost.\n\ny: discard | n: keep going")
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Cancel workout")
                .style(Style::default().fg(Color::Red)),
        );
    f.render_widget(confirm, area);
}

fn render_help_popup(f: &mut Frame, screen: Route) {
    let area = popup_area(f.area(), 80, 80);
    f.render_widget(Clear, area);
    let help = Paragraph::new(help_text(screen))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("GymRat help")
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));
    f.render_widget(help, area);
}

fn help_text(screen: Route) -> String {
    let screen_keys = match screen {
        Route::Login => {
            "e / p          Edit email / password\n\
             Enter          Sign in\n\
             u              Create an account\n\
             g              Sign in with Google\n\
             r              Send a password reset email"
        }
        Route::Dashboard => {
            "n              Start a new workout\n\
             a / Enter      Resume the workout in progress\n\
             h              Workout history\n\
             o              Sign out"
        }
        Route::NewWorkout => {
            "t / n          Edit name / notes\n\
             a              Add an exercise from the library\n\
             d              Remove the highlighted exercise\n\
             p / c          Seed from the next program day / clear the program\n\
             Enter / s      Start the workout"
        }
        Route::ActiveWorkout => {
            "s              Add a set to the highlighted exercise\n\
             w / r          Edit weight / reps of the highlighted set\n\
             space / x      Mark the set done or not done\n\
             d              Delete the highlighted set\n\
             D              Remove the highlighted exercise\n\
             a              Add an exercise\n\
             n              Edit workout notes\n\
             c              Complete the workout\n\
             X              Cancel the workout (asks first)"
        }
        Route::History => {
            "f              Cycle the program filter\n\
             e              Export the listed workouts as CSV"
        }
    };
    format!(
        "{}\n\nEverywhere\n\
         j / k, arrows  Move the highlight\n\
         Esc            Back to the dashboard\n\
         ? / F1         Toggle this help\n\
         Ctrl+C         Quit",
        screen_keys
    )
}
