use clap::Parser;
use todoister::cli::commands::Cli;
use todoister::cli::handlers;
use todoister::io::config_io::{self, Overrides};
use todoister::io::logging;

fn main() {
    let cli = Cli::parse();

    let overrides = Overrides::from_env(cli.config.clone(), cli.token.clone());
    let config = match config_io::load_config(&overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(cli.verbose, config.log.name.as_deref());

    if let Err(e) = handlers::dispatch(cli, &config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
