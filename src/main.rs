use std::path::PathBuf;

use clap::{Parser, Subcommand};

use career_compare::api::{self, AppState};
use career_compare::dataset::Catalog;
use career_compare::logging;

#[derive(Parser, Debug)]
#[command(
    name = "career-compare",
    about = "Career comparison guide: net worth, scorecard, stress test and timeline series"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level; RUST_LOG overrides it"
    )]
    log_level: String,
    #[arg(
        long,
        global = true,
        default_value = "data",
        help = "Directory of <family>.json datasets"
    )]
    data_dir: PathBuf,
    #[arg(
        long,
        global = true,
        default_value = "healthcare",
        help = "Family used when a request does not name one"
    )]
    family: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print the comparison series for the given track keys.
    Compare {
        #[arg(long, help = "Named category weight profile from the dataset")]
        profile: Option<String>,
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init_logging(&cli.log_level) {
        eprintln!("Logging error: {e}");
    }

    let catalog = match Catalog::load_dir(&cli.data_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Dataset error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Serve { port } => {
            let state = AppState {
                catalog,
                default_family: cli.family,
            };
            if let Err(e) = api::run_http_server(port, state).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Compare { profile, keys } => {
            let response = api::compare_request(None, keys, profile, &cli.family)
                .and_then(|request| api::build_compare_response(&catalog, request));
            match response {
                Ok(response) => match serde_json::to_string_pretty(&response) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Serialization error: {e}");
                        std::process::exit(1);
                    }
                },
                Err(e) => {
                    eprintln!("Compare error: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
