use std::marker::PhantomData;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::{
    Client, RequestBuilder, StatusCode,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::de::DeserializeOwned;

use crate::domain::{Adapter, AttributeFilter, Record, RepositoryError};

/// Header identifying this client to the API
pub const CLIENT_TOKEN_HEADER: &str = "webclienttoken";

/// Build the HTTP client shared by every collection.
///
/// Every request carries the client token header and JSON content type.
pub fn build_http_client(client_token: &str) -> Result<Client, RepositoryError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(CLIENT_TOKEN_HEADER),
        HeaderValue::from_str(client_token)
            .map_err(|e| RepositoryError::Transport(format!("invalid client token: {e}")))?,
    );
    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| RepositoryError::Transport(e.to_string()))
}

/// Collection of one entity type under a base URL
pub struct RestAdapter<T> {
    client: Client,
    base_url: String,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RestAdapter<T> {
    /// Create an adapter for the collection at `base_url` (e.g. `http://host/users`)
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            _record: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(super) fn client(&self) -> &Client {
        &self.client
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/{}", self.base_url, id)
    }

    fn not_found(id: u64) -> impl FnOnce(RepositoryError) -> RepositoryError {
        move |e| match e {
            RepositoryError::Status { status: 404, .. } => RepositoryError::NotFound {
                collection: T::COLLECTION,
                id,
            },
            other => other,
        }
    }
}

pub(super) fn transport_error(e: reqwest::Error) -> RepositoryError {
    RepositoryError::Transport(e.to_string())
}

/// Send a request and fail on any non-success status
pub(super) async fn send(request: RequestBuilder) -> Result<reqwest::Response, RepositoryError> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    if !status.is_success() {
        tracing::warn!("{} responded with {}", response.url(), status);
        return Err(RepositoryError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Send a request and decode the JSON response body
pub(super) async fn send_json<R: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<R, RepositoryError> {
    let response = send(request).await?;
    response
        .json::<R>()
        .await
        .map_err(|e| RepositoryError::Serialization(e.to_string()))
}

#[async_trait]
impl<T: Record> Adapter<T> for RestAdapter<T> {
    async fn add(&self, entities: Vec<T>) -> Result<Vec<T>, RepositoryError> {
        try_join_all(
            entities
                .iter()
                .map(|entity| send_json::<T>(self.client.post(&self.base_url).json(entity))),
        )
        .await
    }

    async fn update(&self, entities: Vec<T>) -> Result<Vec<T>, RepositoryError> {
        try_join_all(
            entities
                .iter()
                .map(|entity| send_json::<T>(self.client.put(&self.base_url).json(entity))),
        )
        .await
    }

    async fn get(&self, id: u64) -> Result<T, RepositoryError> {
        send_json(self.client.get(self.item_url(id)))
            .await
            .map_err(Self::not_found(id))
    }

    async fn get_all(&self) -> Result<Vec<T>, RepositoryError> {
        send_json(self.client.get(&self.base_url)).await
    }

    async fn get_by_attributes(&self, filter: &AttributeFilter) -> Result<Vec<T>, RepositoryError> {
        let url = format!("{}/", self.base_url);
        send_json(self.client.get(url).query(filter)).await
    }

    async fn remove(&self, id: u64) -> Result<(), RepositoryError> {
        send(self.client.delete(self.item_url(id)))
            .await
            .map_err(Self::not_found(id))?;
        Ok(())
    }
}

/// Status codes an auth endpoint uses to reject credentials
pub(super) fn is_rejection(status: u16) -> bool {
    [
        StatusCode::UNAUTHORIZED,
        StatusCode::FORBIDDEN,
        StatusCode::NOT_FOUND,
    ]
    .iter()
    .any(|code| code.as_u16() == status)
}
