//! RAX FTP Client - Entry Point
//!
//! An interactive active-mode FTP client.

use clap::{Arg, ArgAction, Command, value_parser};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::BufReader;

use rax_ftp_client::cli::Dispatcher;
use rax_ftp_client::utils::logging::{setup_logging, setup_verbose_logging};
use rax_ftp_client::{ClientConfig, ControlSession};

const ARGS_CONFIG_FILE: &str = "config";
const ARGS_VERBOSE: &str = "verbose";
const ARGS_HOST: &str = "host";
const ARGS_PORT: &str = "port";

fn build_cli_args() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interactive active-mode FTP client")
        .arg(
            Arg::new(ARGS_CONFIG_FILE)
                .help("Config file (default: ./ftp-client.*)")
                .num_args(1)
                .value_name("CONFIG FILE")
                .value_parser(value_parser!(PathBuf))
                .short('c')
                .long("config"),
        )
        .arg(
            Arg::new(ARGS_VERBOSE)
                .help("Log debug output from the client")
                .action(ArgAction::SetTrue)
                .short('v')
                .long("verbose"),
        )
        .arg(
            Arg::new(ARGS_HOST)
                .help("Server to open on start")
                .value_name("HOST"),
        )
        .arg(
            Arg::new(ARGS_PORT)
                .help("Control port of HOST")
                .value_name("PORT")
                .requires(ARGS_HOST),
        )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = build_cli_args().get_matches();

    if args.get_flag(ARGS_VERBOSE) {
        setup_verbose_logging();
    } else {
        setup_logging();
    }

    let config_file = args.get_one::<PathBuf>(ARGS_CONFIG_FILE);
    let config = match ClientConfig::load_from(config_file.map(PathBuf::as_path)) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("ftp: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Starting FTP client");

    let session = ControlSession::new(config);
    let input = BufReader::new(tokio::io::stdin());
    let mut dispatcher = Dispatcher::new(session, input, std::io::stdout());

    let host = args.get_one::<String>(ARGS_HOST).cloned();
    if host.is_some() {
        let port = args.get_one::<String>(ARGS_PORT).cloned();
        if let Err(e) = dispatcher.open(host, port).await {
            error!("Terminal output failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match dispatcher.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Terminal I/O failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
