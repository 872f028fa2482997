//! Multi-table blackjack server.
//!
//! Players connect over TCP, pick a unique username, and then create or
//! join a table. Each table plays its rounds on its own thread.

mod config;
mod logging;

use std::net::SocketAddr;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use private_blackjack::server;

use config::ServerConfig;

const HELP: &str = "\
Run a multi-table blackjack server

USAGE:
  pb_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 0.0.0.0:1243]
  --decks      N           Decks per table shoe        [default: env TABLE_NUM_DECKS or 4]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:1243)
  TABLE_NUM_DECKS          Decks per table shoe (1-8)
  TABLE_STARTING_BALANCE   Chips each player is seated with
  DISPLAY_WAIT_SECS        Pause between round phases
  SCHEDULER_INTERVAL_SECS  Pause between table start checks
  RUST_LOG                 Log filter (default: info)
  (A .env file in the working directory is read too)
";

struct Args {
    bind: Option<SocketAddr>,
    num_decks: Option<usize>,
}

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        num_decks: pargs.opt_value_from_str("--decks")?,
    };
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("unexpected arguments: {remaining:?}");
    }

    let config = ServerConfig::from_env(args.bind, args.num_decks)?;
    config.validate()?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();
    info!(
        "Starting blackjack server at {} ({} decks, ${} starting balance)",
        config.bind, config.table.num_decks, config.table.starting_balance
    );

    server::run(config.bind, config.blackjack())?;

    Ok(())
}
