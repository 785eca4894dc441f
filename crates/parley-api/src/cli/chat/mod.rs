//! Interactive chat session.

pub mod commands;
pub mod input;
pub mod loop_runner;
