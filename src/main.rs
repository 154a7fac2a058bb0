use chi_network_ops::cli::{execute, Cli};
use chi_network_ops::logging;
use clap::Parser;
use colored::Colorize;

#[tokio::main]
async fn main() {
    // Do as little as possible in main.rs as it can't contain any tests
    // .env first, clap reads CHI_SNAPSHOT from the environment
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(&cli.log_config, cli.verbose);
    log::info!("#Start main()");

    match execute(&cli).await {
        Ok(report) => print!("{report}"),
        Err(e) => {
            log::debug!("{e:?}");
            eprintln!("{} {e}", "ERROR".on_red());
            std::process::exit(1);
        }
    }
}
