use std::future::Future;
use std::marker::PhantomData;

use crate::client::{ApiClient, ApiError};

use super::Resource;

/// Query string parameters forwarded to `list`
pub type ListParams = Vec<(String, String)>;

/// Access to one backend collection.
///
/// Implemented over HTTP by [`ResourceService`]; tests swap in an
/// in-memory double.
pub trait ResourceApi<R: Resource>: Send + Sync {
    fn list(&self, params: &ListParams) -> impl Future<Output = Result<Vec<R>, ApiError>> + Send;

    fn get_by_id(&self, id: i64) -> impl Future<Output = Result<R, ApiError>> + Send;

    fn create(&self, payload: &R::Payload) -> impl Future<Output = Result<R, ApiError>> + Send;

    fn update(
        &self,
        id: i64,
        payload: &R::Payload,
    ) -> impl Future<Output = Result<R, ApiError>> + Send;

    fn remove(&self, id: i64) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// REST facade over a fixed collection path
#[derive(Debug, Clone)]
pub struct ResourceService<R> {
    client: ApiClient,
    path: String,
    token: Option<String>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourceService<R> {
    pub fn new(client: ApiClient, path: impl Into<String>, token: Option<String>) -> Self {
        ResourceService {
            client,
            path: path.into(),
            token,
            _resource: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}/{}", self.path, id)
    }
}

impl<R: Resource> ResourceApi<R> for ResourceService<R> {
    async fn list(&self, params: &ListParams) -> Result<Vec<R>, ApiError> {
        self.client
            .get(&self.path, params, self.token.as_deref())
            .await
    }

    async fn get_by_id(&self, id: i64) -> Result<R, ApiError> {
        self.client
            .get(&self.item_path(id), &[], self.token.as_deref())
            .await
    }

    async fn create(&self, payload: &R::Payload) -> Result<R, ApiError> {
        self.client
            .post(&self.path, payload, self.token.as_deref())
            .await
    }

    async fn update(&self, id: i64, payload: &R::Payload) -> Result<R, ApiError> {
        self.client
            .put(&self.item_path(id), payload, self.token.as_deref())
            .await
    }

    async fn remove(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete(&self.item_path(id), self.token.as_deref())
            .await
    }
}
