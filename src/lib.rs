pub mod args;
pub mod backup;
pub mod commands;
mod config;
pub mod display;
mod error;
pub mod ledger;
pub mod model;
pub mod storage;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::{EntryError, Error, PersistenceError, Result, SubmitError};
