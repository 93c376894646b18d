//! Zoho Books modules
//!
//! Idempotent management and query of Zoho Books accounts, items and vendors,
//! invoked the way Ansible runs a module: arguments in, one JSON result out.

pub mod config;
pub mod error;
pub mod module;
pub mod params;
pub mod reconcile;
pub mod resource;
pub mod zoho;

pub use error::{Error, Result};
