//! Live map view
//!
//! Redraws the pin table every second. Line commands come in on stdin from
//! a dedicated thread, since blocking reads do not mix with the runtime.

use std::io::{BufRead, IsTerminal, Stdout, Write};

use log::debug;
use tokio::sync::mpsc;

use crate::cli::{CommandContext, GlobalOptions};
use crate::controller::{ViewCommand, ViewSink, ViewSnapshot};
use crate::error::{Error, Result};
use crate::output::table::format_frame;

/// Clears the screen and draws each frame from the top.
struct TerminalSink {
    out: Stdout,
}

impl ViewSink for TerminalSink {
    fn render(&mut self, snapshot: &ViewSnapshot) -> Result<()> {
        writeln!(self.out, "\x1B[2J\x1B[H{}", format_frame(snapshot))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Map one input line to a command.
pub fn parse_command(line: &str) -> Option<ViewCommand> {
    let mut words = line.split_whitespace();
    let command = match (words.next()?, words.next()) {
        ("r", None) => ViewCommand::Refresh,
        ("q", None) => ViewCommand::Quit,
        ("y", None) => ViewCommand::Confirm,
        ("n", None) => ViewCommand::CloseModal,
        ("d", Some(id)) => ViewCommand::RequestDelete(id.to_string()),
        _ => return None,
    };
    Some(command)
}

fn spawn_stdin_reader(tx: mpsc::Sender<ViewCommand>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let Some(command) = parse_command(&line) else {
                debug!("Ignoring input {:?}", line);
                continue;
            };
            let quit = command == ViewCommand::Quit;
            if tx.blocking_send(command).is_err() || quit {
                break;
            }
        }
        // Dropping the sender on EOF ends the view
    });
}

/// Run the live view until `q`, end of input, or Ctrl-C
pub async fn run(opts: &GlobalOptions, all: bool) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        return Err(Error::Other(
            "watch needs an interactive terminal; use 'eator pin list' instead".to_string(),
        ));
    }

    let ctx = CommandContext::new(opts)?;
    let controller = ctx.controller.include_expired(all);

    let (tx, rx) = mpsc::channel(16);
    let interrupt = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = interrupt.send(ViewCommand::Quit).await;
        }
    });
    spawn_stdin_reader(tx);

    let mut sink = TerminalSink {
        out: std::io::stdout(),
    };
    controller.run(rx, &mut sink).await
}
