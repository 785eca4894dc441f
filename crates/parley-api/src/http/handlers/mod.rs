//! HTTP request handlers.

pub mod chatbot;
