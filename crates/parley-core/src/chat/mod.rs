//! Chat orchestration: running context handling and the exchange service.

pub mod context;
pub mod service;
