//! Wiring of config, logging, supervisor, presenter and console.

use crate::logging::{current_log_path, setup_logging};
use crate::{Cli, Console, ConsoleCommand, HostResult, TerminalNotifier};

use hs_config::Config;
use hs_server::AxumServerFactory;
use hs_supervisor::{
    LifecycleSupervisor, LocalAddressResolver, ServerService, StatusPresenter, StopPolicy,
};

use std::io::Write;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const PRESENTER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Run the host until `quit`, end of input plus a signal, or SIGINT/SIGTERM.
pub async fn run(cli: Cli) -> HostResult<()> {
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => Config::config_dir()?,
    };

    let mut config = Config::load_from(&config_dir)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    // Initialize logging (before any other logging)
    let logs_dir = config.log_dir(&config_dir);
    setup_logging(&config.logging, &logs_dir)?;

    info!("Starting hs-host v{}", env!("CARGO_PKG_VERSION"));
    info!("Config directory: {}", config_dir.display());
    info!("Log file: {}", current_log_path(&logs_dir).display());
    config.log_summary();

    let supervisor = Arc::new(LifecycleSupervisor::new(
        Arc::new(AxumServerFactory::new(config.server.host_addr()?)),
        Arc::new(LocalAddressResolver),
        StopPolicy::new(
            config.shutdown.grace_period(),
            config.shutdown.force_timeout(),
        ),
    ));
    let service = Arc::new(ServerService::spawn(supervisor.clone()));

    let notifier = Arc::new(TerminalNotifier::stdout(
        config.notification.title.clone(),
        &config_dir,
    ));
    let presenter = Arc::new(StatusPresenter::new(
        notifier,
        config.notification.foreground,
    ));
    let presenter_task = presenter.attach(supervisor.subscribe());

    let (quit_tx, mut quit_rx) = mpsc::unbounded_channel();
    spawn_signal_listener(quit_tx.clone())?;

    let default_port = config.server.port;
    if cli.start || config.server.auto_start {
        info!("Auto-starting server on port {default_port}");
        let _ = service.start_server(default_port);
    }

    let mut console = Console::new(service.clone(), std::io::stdout());
    println!("{}", crate::console::HELP);
    read_commands(&mut console, default_port, &mut quit_rx).await;

    info!("Shutting down");
    service.shutdown().await;

    // Dropping the last supervisor reference ends the presenter's stream
    drop(console);
    drop(service);
    drop(supervisor);
    drop(quit_tx);
    if tokio::time::timeout(PRESENTER_DRAIN_TIMEOUT, presenter_task)
        .await
        .is_err()
    {
        warn!("Status presenter did not finish within {PRESENTER_DRAIN_TIMEOUT:?}");
    }

    info!("hs-host stopped");
    Ok(())
}

async fn read_commands<W: Write>(
    console: &mut Console<W>,
    default_port: u16,
    quit_rx: &mut mpsc::UnboundedReceiver<()>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => {
                    let Some(command) = ConsoleCommand::parse(&line, default_port) else {
                        continue;
                    };
                    match console.execute(command).await {
                        Ok(ControlFlow::Break(())) => break,
                        Ok(ControlFlow::Continue(())) => {}
                        Err(e) => warn!("Console output failed: {e}"),
                    }
                }
                Ok(None) => {
                    info!("Console input closed; server keeps running until a signal arrives");
                    input_open = false;
                }
                Err(e) => {
                    error!("Failed to read console input: {e}");
                    input_open = false;
                }
            },
            Some(()) = quit_rx.recv() => {
                info!("Quit requested by signal");
                break;
            }
            else => break,
        }
    }
}

/// First SIGINT/SIGTERM requests a graceful quit; a second one exits at once.
#[cfg(unix)]
fn spawn_signal_listener(quit_tx: mpsc::UnboundedSender<()>) -> HostResult<()> {
    use crate::HostError;
    use error_location::ErrorLocation;
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::panic::Location;

    let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(|e| HostError::Signal {
        source: e,
        location: ErrorLocation::from(Location::caller()),
    })?;

    std::thread::spawn(move || {
        let mut requested = false;
        for sig in signals.forever() {
            if requested {
                warn!("Received signal {sig} during shutdown, exiting immediately");
                std::process::exit(130);
            }
            info!("Received signal {sig}, shutting down...");
            requested = true;
            if quit_tx.send(()).is_err() {
                std::process::exit(0);
            }
        }
    });

    Ok(())
}

#[cfg(not(unix))]
fn spawn_signal_listener(quit_tx: mpsc::UnboundedSender<()>) -> HostResult<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down...");
                let _ = quit_tx.send(());
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {e}"),
        }
    });

    Ok(())
}
