//! Prism Harness: build and drive an external PRISM model generator
//!
//! Compiles the generator and the importance-sampling scaffold once, then runs
//! the generator for a requested number of states and captures its output as
//! `prismFileTmp_{n}_states.sm`. External processes are launched with argument
//! lists, their exit status is always checked, and every wait is bounded.

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod harness;
pub mod logging;
pub mod model;
pub mod process;
