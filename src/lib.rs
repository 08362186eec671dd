//! Sound board - bundled effects plus a three-slot clip recorder
//!
//! Plays three bundled effects and records microphone clips into a
//! round-robin ring of three slots. Every sound toggles between playing and
//! stopped independently, and each recording is indexed in SQLite.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Slot ring, effect catalog, playback and recorder state
//! - **Application**: Port traits, the slot manager, the playback
//!   coordinator and the `Soundboard` facade
//! - **Infrastructure**: rodio/cpal audio, SQLite, XDG config, notifications
//! - **CLI**: Argument parsing, the interactive board and subcommands

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
