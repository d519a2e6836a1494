use anyhow::{Context, Result};
use nix::sys::signal::{SigSet, Signal};
use std::env;
use std::path::PathBuf;
use zbus::blocking::Connection;

use dde::config::{BusKind, DaemonConfig};
use dde::logging;
use dde::systeminfo::{SessionBus, SystemInfoDaemon, UDisks2};

fn main() -> Result<()> {
    // Block before any bus thread exists so they all inherit the mask
    let mut signals = SigSet::empty();
    signals.add(Signal::SIGINT);
    signals.add(Signal::SIGTERM);
    signals
        .thread_block()
        .context("Failed to block termination signals")?;

    logging::init();

    let args: Vec<String> = env::args().collect();
    let config_path = match args.get(1).map(|s| s.as_str()) {
        None => None,
        Some("--config") => Some(PathBuf::from(
            args.get(2).context("--config requires a path")?,
        )),
        Some("help" | "--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown argument: {}", other);
            print_usage();
            std::process::exit(1);
        }
    };

    let config = DaemonConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    let info = config.system_info;

    let session = Connection::session().context("Failed to connect to the session bus")?;
    let udisks_conn = match info.udisks_bus {
        BusKind::System => Connection::system().context("Failed to connect to the system bus")?,
        BusKind::Session => session.clone(),
    };

    let topology = UDisks2::new(
        udisks_conn,
        info.udisks_destination.as_str(),
        info.udisks_path.as_str(),
    );
    let bus = SessionBus::new(session, info.bus_name.as_str(), info.object_path.as_str());

    let mut daemon = SystemInfoDaemon::new(info, topology, bus);
    daemon.start();
    if !daemon.is_started() {
        anyhow::bail!("System info was not published");
    }

    let signal = signals.wait().context("Failed to wait for signals")?;
    tracing::info!("Received {:?}, shutting down", signal);

    daemon.stop();
    Ok(())
}

fn print_usage() {
    println!(
        r#"dde-system-info - publish com.deepin.daemon.SystemInfo on the session bus

Usage:
    dde-system-info                   Use $DDE_DAEMON_CONFIG or built-in paths
    dde-system-info --config <file>   Read paths from a TOML file
    dde-system-info help              Show this help message
"#
    );
}
