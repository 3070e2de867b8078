// Industry Insights - weekly refresh worker
//
// This crate regenerates labor-market insights for every industry in the
// database by prompting a Gemini model and writing the parsed result back.
// Architecture follows the kernel/domains split: kernel holds infrastructure
// (clients, retry, scheduler), domains/insights holds the business logic.

pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
