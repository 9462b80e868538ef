pub mod ansi;
pub mod app;
pub mod border;
pub mod database;
pub mod focus;
pub mod grid;
pub mod keys;
pub mod layout;
pub mod pane;
pub mod query_editor;
pub mod session;
pub mod tables;
pub mod theme;

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use paneql_core::connection::ConnectionProvider;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::app::{App, Msg};
use crate::keys::Key;
use crate::session::{Inbound, Session};

pub use crate::session::DatabaseSelection;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

pub fn run<P>(provider: P, selection: DatabaseSelection) -> Result<(), TuiError>
where
    P: ConnectionProvider + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("paneql-worker")
        .build()?;
    let (mut session, inbox) = Session::new(runtime.handle().clone(), provider);
    let mut app = App::default();

    let mut terminal = setup_terminal()?;
    let run_result = run_loop(&mut terminal, &mut app, &mut session, inbox, selection);
    let restore_result = restore_terminal(&mut terminal);

    // A running query keeps its pooled connection busy, so closing is bounded
    // and anything still in flight is abandoned.
    if runtime
        .block_on(tokio::time::timeout(SHUTDOWN_GRACE, session.close()))
        .is_err()
    {
        warn!("connection did not close in time");
    }
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    if let Err(error) = run_result {
        restore_result?;
        return Err(error);
    }

    restore_result?;
    info!("session closed");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), TuiError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop<P>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    session: &mut Session<P>,
    mut inbox: UnboundedReceiver<Inbound<P::Handle>>,
    selection: DatabaseSelection,
) -> Result<(), TuiError>
where
    P: ConnectionProvider + 'static,
{
    let size = terminal.size()?;
    dispatch(
        app,
        session,
        Msg::Resize {
            width: size.width,
            height: size.height,
        },
    );
    let connecting = session.connect(selection);
    dispatch(app, session, connecting);

    loop {
        terminal.draw(|frame| render(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(key) = Key::from_event(key) {
                        dispatch(app, session, Msg::Key(key));
                    }
                }
                Event::Resize(width, height) => {
                    dispatch(app, session, Msg::Resize { width, height });
                }
                _ => {}
            }
        }

        while let Ok(inbound) = inbox.try_recv() {
            let msg = session.receive(inbound);
            dispatch(app, session, msg);
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

fn dispatch<P>(app: &mut App, session: &Session<P>, msg: Msg)
where
    P: ConnectionProvider + 'static,
{
    for command in app.update(msg) {
        session.execute(command);
    }
}

fn render(frame: &mut Frame<'_>, app: &App) {
    frame.render_widget(Paragraph::new(ansi::to_text(&app.view())), frame.area());
}
