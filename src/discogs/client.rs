//! Discogs API client

use super::models::{Label, Release, ReleaseQuery, ReleaseTarget, ReleasesResponse};
use crate::collection::PageSource;
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::{Page, PageRequest, Pagination};
use async_trait::async_trait;
use tracing::debug;

/// Public Discogs API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.discogs.com";

/// Typed access to the Discogs database endpoints this crate needs
#[derive(Debug)]
pub struct DiscogsClient {
    http: HttpClient,
}

impl DiscogsClient {
    /// Wrap an HTTP client whose base URL points at the Discogs API
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// The underlying HTTP client
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Fetch label details
    pub async fn label(&self, id: u64) -> Result<Label> {
        self.http.get_json(&format!("/labels/{id}"), &[]).await
    }

    /// Fetch one page of a release listing
    pub async fn releases(
        &self,
        query: &ReleaseQuery,
        request: PageRequest,
    ) -> Result<Page<Release>> {
        request.validate()?;

        let mut params = vec![
            ("page", request.page.to_string()),
            ("per_page", request.per_page.to_string()),
        ];
        if let ReleaseTarget::Artist {
            sort: Some(sort),
            order,
            ..
        } = &query.target
        {
            params.push(("sort", sort.as_str().to_string()));
            params.push(("sort_order", order.as_str().to_string()));
        }

        let response: ReleasesResponse = self.http.get_json(&query.path(), &params).await?;
        let pagination = response
            .pagination
            .unwrap_or_else(|| Pagination::from_request(request));

        debug!(
            path = %query.path(),
            page = pagination.page,
            pages = ?pagination.pages,
            count = response.releases.len(),
            "Fetched releases"
        );
        Ok(Page::new(response.releases, pagination))
    }
}

#[async_trait]
impl PageSource for DiscogsClient {
    type Query = ReleaseQuery;
    type Item = Release;

    async fn fetch_page(&self, query: &ReleaseQuery, request: PageRequest) -> Result<Page<Release>> {
        self.releases(query, request).await
    }
}
