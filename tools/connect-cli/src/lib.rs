//! XDI Connect command line.
//!
//! Parsing lives in [`cli`], execution in [`commands`]; `main.rs` only wires
//! logging and the exit code.

pub mod cli;
pub mod commands;
