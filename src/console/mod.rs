//! # Console Adapter
//!
//! A line-oriented consumer of the directory. Reads commands from stdin,
//! turns them into `Directory` operations, and prints the view whenever
//! the directory publishes a new one.
//!
//! Operations are spawned so a slow request never blocks the prompt;
//! typing while a search is in flight is exactly the situation the
//! stale-response guard exists for.

mod command;
mod render;

pub use command::{Command, CommandError, HELP};
pub use render::{country_row, render_view};

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::catalog::Region;
use crate::core::Directory;
use crate::core::state::DirectoryView;

/// What the loop should do after a command has been handled.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Continue,
    Print(String),
    Quit,
}

/// Runs until `quit` or end of input. `start` picks the first region
/// explicitly; otherwise the directory's own startup sequence decides.
pub async fn run(directory: Directory, start: Option<Region>) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut updates = directory.subscribe();
    let mut last_rendered: Option<DirectoryView> = None;

    stdout.write_all(format!("{HELP}\n").as_bytes()).await?;

    let startup = directory.clone();
    tokio::spawn(async move {
        match start {
            Some(region) => startup.choose_region(region).await,
            None => startup.initialize().await,
        }
    });

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed, leaving console");
                    break;
                };
                match handle_line(&directory, &line) {
                    Outcome::Continue => {}
                    Outcome::Print(text) => stdout.write_all(format!("{text}\n").as_bytes()).await?,
                    Outcome::Quit => break,
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                if last_rendered.as_ref() != Some(&view) {
                    stdout.write_all(render_view(&view).as_bytes()).await?;
                    last_rendered = Some(view);
                }
            }
        }
        stdout.flush().await?;
    }
    Ok(())
}

fn handle_line(directory: &Directory, line: &str) -> Outcome {
    if line.trim().is_empty() {
        return Outcome::Continue;
    }
    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(e) => return Outcome::Print(e.to_string()),
    };
    debug!("Console command: {:?}", command);

    match command {
        Command::Quit => Outcome::Quit,
        Command::Help => Outcome::Print(HELP.to_string()),
        Command::Show => Outcome::Print(render_view(&directory.view())),
        Command::Borders(code) => {
            let view = directory.view();
            let Some(country) = view.country(&code) else {
                warn!("Border lookup for {} which is not in the current list", code);
                return Outcome::Print(format!("{code} is not in the current list"));
            };
            let borders = country.borders.clone();
            let directory = directory.clone();
            tokio::spawn(async move { directory.find_border_countries(borders.as_slice()).await });
            Outcome::Continue
        }
        other => {
            let directory = directory.clone();
            tokio::spawn(async move { execute(&directory, other).await });
            Outcome::Continue
        }
    }
}

async fn execute(directory: &Directory, command: Command) {
    match command {
        Command::All => directory.choose_region(Region::All).await,
        Command::Region(region) => directory.choose_region(region).await,
        Command::Type(text) => directory.input_changed(text).await,
        Command::Search(text) => {
            directory.set_input_value(text.clone()).await;
            directory.search_for_countries(text).await;
        }
        Command::Borders(_) | Command::Show | Command::Help | Command::Quit => {}
    }
}
