use std::sync::Arc;

use reqwest::{multipart::Form, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::client::error::{ClientError, ClientResult};
use crate::client::scope::ClinicScopeStore;
use crate::client::session::SessionStore;
use crate::shared::constants::CLINIC_SCOPE_HEADER;
use crate::shared::types::ApiResponse;

/// One page of a list endpoint plus the unpaginated total
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Query string for list endpoints
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Resource specific filter such as `patient_id` or `status`
    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((key.into(), value.to_string()));
        self
    }

    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("page_size".to_string(), page_size.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                pairs.push(("search".to_string(), search.to_string()));
            }
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

/// HTTP client for the DentOS API.
///
/// Every request carries the stored bearer token and the selected clinic
/// scope. Calls are attempted once. A 401 clears the session.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    scope: Arc<ClinicScopeStore>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
        scope: Arc<ClinicScopeStore>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            scope,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn clinic_scope(&self) -> &ClinicScopeStore {
        &self.scope
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the scope header and, when signed in, the bearer token.
    /// The flag reports whether a token went out with the request.
    async fn authorize(&self, request: RequestBuilder) -> (RequestBuilder, bool) {
        let request = request.header(CLINIC_SCOPE_HEADER, self.scope.current().to_string());
        match self.session.token().await {
            Some(token) => (request.bearer_auth(token), true),
            None => (request, false),
        }
    }

    /// Send once and turn every non-2xx status into a [`ClientError`]
    ///
    /// A 401 only ends the session when a token was sent. Anonymous calls
    /// such as login keep the server's message.
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let (request, sent_token) = self.authorize(request).await;
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request failed: {}", e);
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED && sent_token {
            tracing::info!("Server rejected the session, signing out");
            self.session.expire().await;
            return Err(ClientError::unauthorized());
        }

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let (message, errors) = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&body)
                .map(|envelope| (envelope.message, envelope.errors))
                .unwrap_or((None, None));
            tracing::debug!("API error: HTTP {} - {:?}", status, message);
            return Err(ClientError::api(status, message, errors));
        }

        Ok(response)
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ClientResult<ApiResponse<T>> {
        let body = self.send(request).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("Failed to parse API response: {}", e);
            ClientError::Decode(e.to_string())
        })
    }

    async fn data<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        self.envelope(request)
            .await?
            .data
            .ok_or_else(|| ClientError::Decode("Response has no data".to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.data(self.http.get(self.url(path))).await
    }

    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> ClientResult<Page<T>> {
        let envelope = self
            .envelope::<Vec<T>>(self.http.get(self.url(path)).query(&query.pairs()))
            .await?;
        let items = envelope.data.unwrap_or_default();
        let total = envelope
            .meta
            .map(|meta| meta.total)
            .unwrap_or(items.len() as i64);
        Ok(Page { items, total })
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.data(self.http.post(self.url(path)).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.data(self.http.put(self.url(path)).json(body)).await
    }

    /// PUT without a body, for state changes such as marking read
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.data(self.http.put(self.url(path))).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.data(self.http.post(self.url(path))).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> ClientResult<T> {
        self.data(self.http.post(self.url(path)).multipart(form))
            .await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.envelope::<serde_json::Value>(self.http.delete(self.url(path)))
            .await
            .map(|_| ())
    }

    pub async fn delete_returning<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.data(self.http.delete(self.url(path))).await
    }

    /// Raw body of a file endpoint (PDF, CSV, HTML)
    pub async fn download(&self, path: &str) -> ClientResult<Vec<u8>> {
        let body = self.send(self.http.get(self.url(path))).await?.bytes().await?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_pairs() {
        let query = ListQuery::new()
            .page(2)
            .page_size(25)
            .search("  ")
            .filter("patient_id", "p-1");
        assert_eq!(
            query.pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("page_size".to_string(), "25".to_string()),
                ("patient_id".to_string(), "p-1".to_string()),
            ]
        );
    }
}
