//! Duo log search API client.
//!
//! This crate translates the search UI's four backend operations into
//! HTTP requests and normalizes their responses:
//!
//! - [`LogApiClient::get_services`]: service catalogue, sorted
//! - [`LogApiClient::get_schema`]: log schema, passed through
//! - [`LogApiClient::search_logs`]: filtered log records
//! - [`LogApiClient::get_field_stats`]: best-effort per-field value counts
//!
//! The base URL is resolved once by bootstrap code through
//! [`ClientConfig`] and never re-evaluated.
//!
//! # Example
//!
//! ```ignore
//! use duo_search_api::{ClientConfig, LogApiClient, load_search_page};
//! use duo_search_types::LogQuery;
//!
//! async fn run() -> anyhow::Result<()> {
//!     let client = LogApiClient::new(&ClientConfig::from_env()?)?;
//!     let page = load_search_page(&client).await?;
//!     let params = LogQuery::new(&page.services[0]).limit(50).to_search_params();
//!     let logs = client.search_logs(&params).await?;
//!     println!("{} records", logs.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod page;
pub mod response;

pub use client::LogApiClient;
pub use config::{ClientConfig, Environment};
pub use error::ApiError;
pub use page::{SearchPageData, load_field_stats, load_search_page};
