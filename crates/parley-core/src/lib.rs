//! Chat orchestration and port traits for Parley.
//!
//! This crate defines the "ports" (generator and transcript traits) that the
//! infrastructure layer implements, plus the `ChatService` that drives one
//! exchange. It depends only on `parley-types` -- never on `parley-infra`
//! or any model/IO crate.

pub mod chat;
pub mod generation;
pub mod transcript;
