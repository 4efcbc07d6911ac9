//! molsplit CLI - stratified dataset splitting
//!
//! Command-line interface for molsplit operations.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    molsplit::cli::run()
}
