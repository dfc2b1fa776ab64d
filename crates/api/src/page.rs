//! Page-load composition of client calls.
//!
//! The search page needs the service catalogue and the schema before it
//! can render filters; both are fetched once per load, concurrently.

use duo_search_types::{FieldStat, Schema, SearchParams, ServiceName};
use futures_util::future::{try_join, try_join_all};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::{ApiError, LogApiClient};

/// Data the search page loads up front.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPageData {
    pub services: Vec<ServiceName>,
    pub schema: Schema,
}

/// Fetch services and schema in parallel. Fails if either request fails.
pub async fn load_search_page(client: &LogApiClient) -> Result<SearchPageData, ApiError> {
    let (services, schema) = try_join(client.get_services(), client.get_schema()).await?;
    debug!(services = services.len(), fields = schema.field_names().len(), "search page loaded");
    Ok(SearchPageData { services, schema })
}

/// Fetch statistics for several fields in parallel, keyed by field in
/// request order.
///
/// Repeated fields are requested once, at their first position. Fields
/// the backend rejects map to empty statistics.
pub async fn load_field_stats<I, S>(
    client: &LogApiClient,
    fields: I,
    params: &SearchParams,
) -> Result<IndexMap<String, Vec<FieldStat>>, ApiError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let fields: IndexSet<String> = fields.into_iter().map(Into::into).collect();
    let stats = try_join_all(fields.iter().map(|field| client.get_field_stats(field, params))).await?;
    Ok(fields.into_iter().zip(stats).collect())
}
