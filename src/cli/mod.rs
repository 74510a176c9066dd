//! # CLI Module
//!
//! Command-line front-end for the `burrow` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Run the demo application:
//!
//! ```bash
//! burrow serve --addr 127.0.0.1:8080 --config burrow.yaml
//! ```
//!
//! ### `routes`
//!
//! Print the demo application's route table, sorted by pattern:
//!
//! ```bash
//! burrow routes
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{build_demo_router, run_cli, Cli, Commands};
