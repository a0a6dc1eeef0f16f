//! Resource clients
//!
//! Each REST resource maps its CRUD operations onto one [`ApiClient`] call
//! with a fixed path template. No logic beyond path formatting lives here.

pub mod comments;
pub mod posts;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use crate::error::{E2eError, E2eResult};
use crate::http::{ApiClient, ApiResponse};

pub use comments::{Comment, CommentPayload, Comments, CommentsApi};
pub use posts::{Post, PostPayload, Posts, PostsApi};

/// Request body for a resource: its typed shape, or arbitrary JSON for tests
/// that deliberately send malformed data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Typed(T),
    Raw(serde_json::Value),
}

impl<T> From<T> for Payload<T> {
    fn from(value: T) -> Self {
        Payload::Typed(value)
    }
}

/// Static description of one REST resource.
pub trait Resource {
    /// Collection path, e.g. `/posts`
    const PATH: &'static str;

    /// Body sent on create/update
    type Payload: Serialize + Clone + Send + Sync;

    /// Shape returned by the API
    type Model: DeserializeOwned;
}

/// A created resource together with the response it came from.
#[derive(Debug, Clone)]
pub struct Created<T> {
    pub response: ApiResponse,
    pub resource: T,
}

/// CRUD client for one resource type.
pub struct ResourceApi<R: Resource> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<R: Resource> ResourceApi<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn item_path(id: u64) -> String {
        format!("{}/{}", R::PATH, id)
    }

    /// `GET /<resource>/{id}`
    pub async fn get(&self, id: u64) -> E2eResult<ApiResponse> {
        self.client.get(&Self::item_path(id)).await
    }

    /// `POST /<resource>` and decode the created resource.
    ///
    /// A non-2xx status is an [`E2eError::UnexpectedStatus`].
    pub async fn create(&self, payload: impl Into<Payload<R::Payload>>) -> E2eResult<Created<R::Model>> {
        let response = self.create_response(payload).await?;
        if !response.is_success() {
            return Err(E2eError::UnexpectedStatus {
                method: response.method,
                endpoint: response.endpoint,
                status: response.status,
                body: response.body,
            });
        }
        let resource = response.json()?;
        Ok(Created { response, resource })
    }

    /// `POST /<resource>` returning the raw response.
    pub async fn create_response(&self, payload: impl Into<Payload<R::Payload>>) -> E2eResult<ApiResponse> {
        let payload = payload.into();
        self.client.post(R::PATH, &payload).await
    }

    /// `PUT /<resource>/{id}`
    pub async fn update(&self, id: u64, payload: impl Into<Payload<R::Payload>>) -> E2eResult<ApiResponse> {
        let payload = payload.into();
        self.client.put(&Self::item_path(id), &payload).await
    }

    /// `DELETE /<resource>/{id}`
    pub async fn delete(&self, id: u64) -> E2eResult<ApiResponse> {
        self.client.delete(&Self::item_path(id)).await
    }
}
