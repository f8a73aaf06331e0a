//! Line-oriented stand-in for the server screen.

use crate::HostResult;
use crate::StatusView;

use hs_supervisor::{ServerAction, ServerService};

use std::io::Write;
use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::debug;

pub const HELP: &str = "\
Commands:
  start [port]  start (or restart) the server, default port if omitted
  stop          stop the server
  status        show the current state
  url           show the server URL
  watch         print every status update as it happens
  unwatch       stop printing status updates
  help          show this help
  quit          stop the server and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start { port: u16 },
    Stop,
    Status,
    Url,
    Watch,
    Unwatch,
    Help,
    Quit,
    Unknown(String),
}

impl ConsoleCommand {
    /// Parse one input line. Blank lines yield `None`.
    ///
    /// An unparsable port falls back to `default_port`, like a start
    /// request without one.
    pub fn parse(line: &str, default_port: u16) -> Option<Self> {
        let mut words = line.split_whitespace();
        let name = words.next()?.to_lowercase();

        let command = match name.as_str() {
            "start" => Self::Start {
                port: words
                    .next()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(default_port),
            },
            "stop" => Self::Stop,
            "status" => Self::Status,
            "url" => Self::Url,
            "watch" => Self::Watch,
            "unwatch" => Self::Unwatch,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => Self::Unknown(name),
        };

        Some(command)
    }

    /// The service action behind this command, if it is a start/stop request.
    pub fn action(&self) -> Option<ServerAction> {
        match self {
            Self::Start { port } => Some(ServerAction::Start { port: *port }),
            Self::Stop => Some(ServerAction::Stop),
            _ => None,
        }
    }
}

/// Executes console commands against the server service.
///
/// Holds only the service and an optional [`StatusView`]; dropping the
/// console leaves the server as it is.
pub struct Console<W: Write> {
    service: Arc<ServerService>,
    view: StatusView,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(service: Arc<ServerService>, out: W) -> Self {
        Self {
            service,
            view: StatusView::new(),
            out,
        }
    }

    #[cfg(test)]
    pub(crate) fn view(&self) -> &StatusView {
        &self.view
    }

    #[cfg(test)]
    pub(crate) fn out(&self) -> &W {
        &self.out
    }

    pub async fn execute(&mut self, command: ConsoleCommand) -> HostResult<ControlFlow<()>> {
        debug!("Console command {command:?}");

        if let Some(action) = command.action() {
            if self.service.dispatch(action).settled().await {
                let status = self.service.supervisor().latest_status();
                writeln!(self.out, "{}", status.message)?;
            } else {
                writeln!(self.out, "Server service is shut down")?;
            }
            return Ok(ControlFlow::Continue(()));
        }

        match command {
            ConsoleCommand::Status => {
                let supervisor = self.service.supervisor();
                let status = supervisor.latest_status();
                writeln!(
                    self.out,
                    "{}: {} ({} observers)",
                    status.state,
                    status.message,
                    supervisor.observer_count()
                )?;
            }
            ConsoleCommand::Url => match self.service.supervisor().server_url() {
                Some(url) => writeln!(self.out, "{url}")?,
                None => writeln!(self.out, "Server is not running")?,
            },
            ConsoleCommand::Watch => match self.view.watch(self.service.subscribe()) {
                Some(id) => writeln!(self.out, "Watching status updates (observer {id})")?,
                None => writeln!(self.out, "Already watching")?,
            },
            ConsoleCommand::Unwatch => match self.view.unwatch() {
                Some(id) => writeln!(self.out, "Stopped watching (observer {id})")?,
                None => writeln!(self.out, "Not watching")?,
            },
            ConsoleCommand::Help => writeln!(self.out, "{HELP}")?,
            ConsoleCommand::Quit => return Ok(ControlFlow::Break(())),
            ConsoleCommand::Unknown(name) => {
                writeln!(self.out, "Unknown command '{name}'. Type 'help'.")?
            }
            ConsoleCommand::Start { .. } | ConsoleCommand::Stop => {}
        }

        self.out.flush()?;
        Ok(ControlFlow::Continue(()))
    }
}
