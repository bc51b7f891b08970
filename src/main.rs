use std::{process::ExitCode, time::Duration};

use anyhow::Context;
use clap::Parser;
use mcn_forwarder::{
    model::{ForwarderConfig, MachineName, ShutdownReason},
    rt::{
        LifecycleController, MachineContainerObserver, MachineSsh, MachineSshTunnel,
        ProcessTunnelSupervisor, Reconciler,
    },
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Forwards the ports published by a Docker Machine's containers to
/// localhost over SSH.
#[derive(Parser, Debug)]
#[command(name = "mcnforwarder", version)]
struct Cli {
    /// Name of the Docker Machine to forward ports from.
    machine: MachineName,

    /// Program used to reach the machine.
    #[arg(long, default_value = ForwarderConfig::MACHINE_BINARY_DEFAULT)]
    machine_binary: String,

    /// Docker daemon port on the machine, which is always forwarded.
    #[arg(long, default_value_t = ForwarderConfig::MANAGEMENT_PORT_DEFAULT)]
    management_port: u16,

    /// Milliseconds to wait between polls of the machine's containers.
    #[arg(long, default_value_t = ForwarderConfig::POLL_INTERVAL_DEFAULT.as_millis() as u64)]
    poll_interval_ms: u64,

    /// Pass `-vvv` to the SSH forwarding process.
    #[arg(long)]
    ssh_verbose: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn forwarder_config(&self) -> ForwarderConfig {
        ForwarderConfig {
            machine_binary: self.machine_binary.clone(),
            management_port: self.management_port,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            ssh_verbose: self.ssh_verbose,
        }
    }
}

fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .context("Failed to build log filter.")?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .context("Failed to install log subscriber.")?;

    Ok(())
}

/// Completes when the operator asks the forwarder to stop.
async fn stop_requested() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(error) => error!(%error, "Failed to listen for SIGTERM."),
        }
    }

    if let Err(error) = tokio::signal::ctrl_c().await {
        // Without a signal handler the forwarder can only stop on failure.
        error!(%error, "Failed to listen for Ctrl+C.");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = setup_logging(cli.verbose) {
        eprintln!("{:#}", error);
        return ExitCode::FAILURE;
    }

    let config = cli.forwarder_config();
    info!(
        machine = %cli.machine,
        binary = %config.machine_binary,
        "Starting Docker Machine SSH auto-forwarder..."
    );

    let observer = MachineContainerObserver::new(MachineSsh::new(
        config.machine_binary.clone(),
        cli.machine.clone(),
    ));
    let supervisor = ProcessTunnelSupervisor::new(
        MachineSshTunnel::new(
            config.machine_binary.clone(),
            cli.machine.clone(),
            config.ssh_verbose,
        ),
        config.management_port,
    );
    let reconciler = Reconciler::new(observer, supervisor, config.poll_interval);

    let shutdown = LifecycleController::new()
        .run(reconciler, stop_requested())
        .await;

    if let ShutdownReason::Fault(error) = &shutdown.reason {
        error!(%error, "Forwarding stopped because of an error.");
    }

    if shutdown.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
