use crate::error::ClientError;
use crate::transaction::transaction_hook;
use crate::transport::{Request, Response, Transport};
use rand::rngs::SmallRng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
#[allow(unused)]
use tracing::{debug, trace};

/// Per virtual user request state.
///
/// Holds the fixed headers and base path set by the profile's start hook, the
/// user's own RNG, and the ceiling used for generated dates. Nothing else
/// survives from one task to the next.
pub struct Session {
    transport: Arc<dyn Transport>,
    headers: HeaderMap,
    base_path: String,
    rng: SmallRng,
    clock: OffsetDateTime,
}

impl Session {
    pub fn new(transport: Arc<dyn Transport>, rng: SmallRng) -> Self {
        Self {
            transport,
            headers: HeaderMap::new(),
            base_path: String::new(),
            rng,
            clock: OffsetDateTime::now_utc(),
        }
    }

    /// Pin the upper bound of generated dates.
    pub fn with_clock(mut self, clock: OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn set_base_path(&mut self, base_path: &str) {
        self.base_path = base_path.trim_end_matches('/').to_string();
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    pub fn clock(&self) -> OffsetDateTime {
        self.clock
    }

    pub async fn get(&self, path: &str, name: &str) -> Result<Response, ClientError> {
        self.send(Method::GET, path, name, None).await
    }

    pub async fn delete(&self, path: &str, name: &str) -> Result<Response, ClientError> {
        self.send(Method::DELETE, path, name, None).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        name: &str,
        body: &T,
    ) -> Result<Response, ClientError> {
        let body = serde_json::to_vec(body).map_err(ClientError::Encode)?;
        self.send(Method::POST, path, name, Some(body)).await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        name: &str,
        body: &T,
    ) -> Result<Response, ClientError> {
        let body = serde_json::to_vec(body).map_err(ClientError::Encode)?;
        self.send(Method::PUT, path, name, Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        name: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response, ClientError> {
        let request = Request {
            name: format!("{method} {name}"),
            path: format!("{}{}", self.base_path, path),
            method,
            headers: self.headers.clone(),
            body,
        };
        trace!("{} {}", request.method, request.path);

        let name = request.name.clone();
        transaction_hook(&name, self.transport.send(request)).await
    }
}
