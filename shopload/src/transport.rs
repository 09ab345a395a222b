//! The seam between workloads and the network.
use crate::error::ClientError;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fully prepared request. `path` already carries the session's base path.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub path: String,
    /// Statistics key, e.g. `GET /payments/{id}`.
    pub name: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn json<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.body.as_deref().map(serde_json::from_slice)
    }
}

#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn from_json(status: StatusCode, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Client and server errors count as failed requests.
    pub fn is_failure(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }

    /// Identifier assigned by a create call.
    ///
    /// `Ok(None)` unless the status is `201 Created` and `field` holds a
    /// non-zero number or a non-empty string. A 201 whose body is not JSON
    /// is an error.
    pub fn created_id(&self, field: &str) -> Result<Option<String>, serde_json::Error> {
        if self.status != StatusCode::CREATED {
            return Ok(None);
        }

        let body: Value = self.json()?;
        Ok(match body.get(field) {
            Some(Value::Number(n)) if n.as_f64() != Some(0.) => Some(n.to_string()),
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
    }
}

/// Sends requests on behalf of virtual users.
///
/// Object safe so that every user of a run can share one `Arc<dyn Transport>`.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> BoxFuture<'_, Result<Response, ClientError>>;
}

/// [`Transport`] backed by a shared `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
    host: String,
}

impl HttpTransport {
    pub fn new(host: &Url, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            host: host.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> BoxFuture<'_, Result<Response, ClientError>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.method, self.url(&request.path))
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let res = builder.send().await?;
            let status = res.status();
            let body = res.bytes().await?;
            Ok(Response::new(status, body.to_vec()))
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Responder = dyn Fn(&Request) -> Result<Response, ClientError> + Send + Sync;

    /// Records every request and answers from a closure.
    pub(crate) struct RecordingTransport {
        requests: Mutex<Vec<Request>>,
        responder: Box<Responder>,
    }

    impl RecordingTransport {
        pub fn new<F>(responder: F) -> Arc<Self>
        where
            F: Fn(&Request) -> Result<Response, ClientError> + Send + Sync + 'static,
        {
            Arc::new(Self {
                requests: Mutex::new(vec![]),
                responder: Box::new(responder),
            })
        }

        /// Answers everything with `200 []`.
        pub fn ok() -> Arc<Self> {
            Self::new(|_| Ok(Response::from_json(StatusCode::OK, &json!([]))))
        }

        pub fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, request: Request) -> BoxFuture<'_, Result<Response, ClientError>> {
            let res = (self.responder)(&request);
            self.requests.lock().unwrap().push(request);
            Box::pin(async move { res })
        }
    }

    #[test]
    fn created_id_requires_201() {
        let body = json!({"paymentId": 42});
        let created = Response::from_json(StatusCode::CREATED, &body);
        assert_eq!(created.created_id("paymentId").unwrap(), Some("42".into()));

        let ok = Response::from_json(StatusCode::OK, &body);
        assert_eq!(ok.created_id("paymentId").unwrap(), None);

        let failed = Response::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(failed.created_id("paymentId").unwrap(), None);
        assert!(failed.is_failure());
    }

    #[test]
    fn created_id_ignores_falsy_values() {
        for body in [
            json!({}),
            json!({"orderId": null}),
            json!({"orderId": 0}),
            json!({"orderId": ""}),
        ] {
            let res = Response::from_json(StatusCode::CREATED, &body);
            assert_eq!(res.created_id("orderId").unwrap(), None, "{body}");
        }

        let res = Response::from_json(StatusCode::CREATED, &json!({"orderId": "a-7"}));
        assert_eq!(res.created_id("orderId").unwrap(), Some("a-7".into()));
    }

    #[test]
    fn created_id_rejects_malformed_body() {
        let res = Response::new(StatusCode::CREATED, "<html>");
        assert!(res.created_id("favouriteId").is_err());
    }

    #[test]
    fn http_transport_joins_host_and_path() {
        let host = Url::parse("http://localhost:8500/").unwrap();
        let transport = HttpTransport::new(&host, Some(Duration::from_secs(1))).unwrap();
        assert_eq!(
            transport.url("/payment-service/api/payments"),
            "http://localhost:8500/payment-service/api/payments"
        );
    }
}
