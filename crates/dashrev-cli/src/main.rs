// dashrev CLI entry point

use clap::Parser;
use dashrev_cli::{logging, output, Cli, CliSettings, CommandRouter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match CliSettings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            output::print_error(&e.user_message());
            std::process::exit(2);
        }
    };
    logging::init_logging(&settings.log_level, cli.verbose);

    if let Err(e) = CommandRouter::route(cli, settings).await {
        if !e.already_reported() {
            output::print_error(&e.user_message());
        }
        std::process::exit(1);
    }
}
