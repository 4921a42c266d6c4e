//! # CLI Module
//!
//! Command implementations for the relay binary. There is one real
//! command: [`serve`], which restores persisted sessions, starts the
//! background sweep and persistence loops, and runs the HTTP server until
//! the process is stopped. Shell completion generation lives in `main.rs`
//! next to the clap definitions.

mod serve;

pub use serve::serve;
