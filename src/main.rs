//! Sound board CLI entry point

use std::process::ExitCode;

use clap::Parser;

use soundboard::cli::{
    app::{board_options, cli_config, init_tracing, load_merged_config, run_history},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    run_board, EXIT_ERROR, EXIT_USAGE_ERROR,
};
use soundboard::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();

    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    let config = load_merged_config(cli_config(&cli)).await;

    if let Some(Commands::History { limit, json }) = cli.command {
        return run_history(&config, limit, json).await;
    }

    match board_options(&config) {
        Ok(options) => run_board(options).await,
        Err(e) => {
            presenter.error(&e);
            ExitCode::from(EXIT_USAGE_ERROR)
        }
    }
}
