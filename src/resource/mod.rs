//! Resource abstraction layer
//!
//! This module provides a data-driven approach to managing Zoho Books
//! resources. Resource descriptors are loaded from JSON files at compile
//! time; the client below works for any of them.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource descriptors from embedded JSON
//! - [`fetcher`] - Lists, finds and fetches objects, with pagination
//! - [`dispatch`] - Create, update, delete and status changes
//!
//! # Resource Definitions
//!
//! Resources are defined in JSON files under `src/resources/`:
//! - `account.json` - Chart of accounts
//! - `item.json` - Items (goods and services)
//! - `vendor.json` - Vendor contacts
//!
//! # Example
//!
//! ```ignore
//! use zohobooks::resource::{get_resource, ResourceClient};
//!
//! async fn find_widget(client: &ZohoClient) -> zohobooks::Result<Option<serde_json::Value>> {
//!     let items = ResourceClient::new(client, get_resource("item").unwrap());
//!     items.find_by_name("Widget").await
//! }
//! ```

mod dispatch;
mod fetcher;
mod registry;

pub use dispatch::StatusChange;
pub use fetcher::{PaginatedResult, ResourceClient, ResourceFilter};
pub use registry::*;
