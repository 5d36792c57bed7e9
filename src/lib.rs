//! Hindi to English translation backend.
//!
//! The server binary (`main.rs`) and the evaluation binary (`bin/evaluate.rs`)
//! share these modules.

pub mod config;
pub mod evaluation;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod state;
pub mod translate;
pub mod utils;
