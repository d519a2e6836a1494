use anyhow::{Context, Result};
use std::env;

use dde::accounts::{Provisioner, SystemUserDatabase};
use dde::config::DaemonConfig;
use dde::logging;

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    if matches!(args[1].as_str(), "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    if !nix::unistd::Uid::effective().is_root() {
        eprintln!("Error: dde-user-data must be run as root");
        std::process::exit(1);
    }

    let config = DaemonConfig::load(None).context("Failed to load configuration")?;
    let provisioner = Provisioner::new(SystemUserDatabase, config.accounts);

    // Provisioning is best-effort: failures are logged, never fatal
    let target = args[1].as_str();
    match target.parse::<u32>() {
        Ok(uid) => provisioner.provision(uid),
        Err(_) => provisioner.provision_user_path(target),
    }

    Ok(())
}

fn print_usage() {
    println!(
        r#"dde-user-data - copy default settings into a new user's home

Usage:
    dde-user-data <uid>          Provision the account with this uid
    dde-user-data <user-path>    Provision an accounts object, e.g.
                                 /com/deepin/daemon/Accounts/User1001
"#
    );
}
