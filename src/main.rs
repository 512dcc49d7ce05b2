//! GymRat - terminal workout tracker
//!
//! Loads configuration, opens the persisted stores and the identity adapter,
//! then hands the terminal to the ratatui front end until the user quits.

use std::io;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use gymrat::application::{App, IdentityAdapter, ProgramStore, SessionStore, SystemClock};
use gymrat::config::{AppConfig, Cli};
use gymrat::infrastructure::{
    FileStore, FirebaseIdentity, IdentityProvider, KeyValueStore, UnavailableIdentity,
};
use gymrat::logging;
use gymrat::presentation::{render_ui, InputHandler};

const TICK_RATE: Duration = Duration::from_millis(250);

fn identity_adapter(config: &AppConfig, storage: Rc<dyn KeyValueStore>) -> IdentityAdapter {
    if config.offline {
        tracing::info!("offline mode, using the local identity provider");
        return IdentityAdapter::offline(storage);
    }
    let primary: Box<dyn IdentityProvider> = match &config.firebase {
        Some(firebase) => match FirebaseIdentity::new(firebase.clone()) {
            Ok(provider) => Box::new(provider),
            Err(err) => {
                tracing::warn!(error = %err, "could not build the hosted identity client");
                Box::new(UnavailableIdentity::new(err.to_string()))
            }
        },
        None => Box::new(UnavailableIdentity::new("no API key configured")),
    };
    IdentityAdapter::new(primary, config.environment, storage)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?.with_cli(&cli);
    logging::init(&config.log_path(), &config.log_filter)?;
    tracing::info!(
        environment = %config.environment,
        data_dir = %config.data_dir.display(),
        "starting gymrat"
    );

    // Stores are opened before the terminal is taken over so a corrupt
    // partition is reported on a normal screen.
    let storage: Rc<dyn KeyValueStore> = Rc::new(FileStore::new(config.data_dir.clone()));
    let mut identity = identity_adapter(&config, storage.clone());
    identity.initialize()?;
    let sessions = SessionStore::open(storage.clone(), Rc::new(SystemClock))?;
    let programs = ProgramStore::open(storage)?;
    let export_path = config.data_dir.join("gymrat-history.csv");
    let mut app = App::new(sessions, programs, identity, export_path);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        println!("{err:?}");
    }
    tracing::info!("exiting");

    Ok(())
}

/// Redraws, then waits up to one tick for a key. The session timer is
/// advanced on every pass so it keeps moving without input.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    InputHandler::handle_key_event(app, key.code, key.modifiers);
                }
            }
        }
        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}
