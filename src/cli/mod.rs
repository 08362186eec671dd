//! CLI layer - Command-line interface
//!
//! Argument parsing, output formatting, signal handling and the
//! interactive board runner.

pub mod app;
pub mod args;
pub mod board_app;
pub mod config_cmd;
pub mod console;
pub mod history_cmd;
pub mod presenter;
pub mod signals;

pub use app::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{BoardOptions, Cli, Commands, ConfigAction};
pub use board_app::run_board;
pub use console::BoardCommand;
pub use presenter::Presenter;
