//! Interactive dashboard
//!
//! Terminal interface over the current snapshot using ratatui: a card list
//! with a detail pane, and a dependency tree. Every toggle, undo and redo
//! goes through the history store and is followed by a fresh resolve.

mod app;
mod event;
mod ui;
mod utils;
mod views;

use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};

use super::Output;
use app::App;
use event::EventHandler;

/// View mode for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Cards,
    Graph,
}

/// Launch the dashboard
pub fn run(output: &Output) -> Result<()> {
    output.verbose_ctx("dashboard", "Initializing dashboard");

    // Load before touching the terminal so errors print normally
    let mut app = App::new()?;

    let mut terminal = ui::init_terminal()?;
    let event_handler = EventHandler::new(250);

    // Restore the terminal even if the app panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        app.run(&mut terminal, event_handler)
    }));

    let restore_result = ui::restore_terminal();

    match result {
        Ok(inner_result) => {
            restore_result?;
            inner_result
        }
        Err(panic_payload) => {
            let _ = restore_result;
            if let Some(s) = panic_payload.downcast_ref::<&str>() {
                Err(anyhow!("Dashboard panicked: {}", s))
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                Err(anyhow!("Dashboard panicked: {}", s))
            } else {
                Err(anyhow!("Dashboard panicked with unknown error"))
            }
        }
    }
}
