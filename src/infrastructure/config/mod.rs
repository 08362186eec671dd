//! Configuration adapters

mod paths;
mod xdg;

pub use paths::DataPaths;
pub use xdg::{XdgConfigStore, XdgDirs};
