//! Mapforge command line.
//!
//! Usage:
//!   mapforge static <REQUEST>   Render a static map image
//!   mapforge web <REQUEST>      Render an interactive HTML map
//!
//! `REQUEST` is a JSON file with the map request, `-` reads it from stdin. The result is printed
//! to stdout as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use mapforge::mapforge_types::MapOutput;
use mapforge::tools::{create_map_from_json, create_web_map_from_json};

#[derive(Parser)]
#[command(name = "mapforge")]
#[command(about = "Static and interactive map rendering from geospatial inputs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a static map image (png, jpg or svg)
    Static {
        /// Request file, `-` for stdin
        request: PathBuf,
    },
    /// Render an interactive HTML map
    Web {
        /// Request file, `-` for stdin
        request: PathBuf,
    },
}

fn read_request(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
    }
}

fn run(request: &Path, create: impl Fn(&str) -> MapOutput) -> MapOutput {
    match read_request(request) {
        Ok(json) => create(&json),
        Err(err) => MapOutput::error(format!(
            "failed to read request {}: {err}",
            request.display()
        )),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let output = match &cli.command {
        Command::Static { request } => run(request, create_map_from_json),
        Command::Web { request } => run(request, create_web_map_from_json),
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    }

    if output.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
