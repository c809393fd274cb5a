//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! Status messages go through this module so `--quiet` is honoured in one
//! place. Data a command was asked for (values, keys, dumps) is printed
//! directly by the handler and is never suppressed.

pub mod output;
