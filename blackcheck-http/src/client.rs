use crate::builders::{self, QueryOptions};
use crate::error::{Result, TransportError};
use crate::request::{Body, Method, Request, Response, ResponseFormat};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;

/// Header carrying a fresh correlation id on every call.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Basic-auth credentials passed through to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// HTTP client bound to one service base URL.
///
/// Each call is sent once; there are no retries. A response with a non-2xx
/// status is returned as `Ok` with `ok == false`; only failures to get any
/// response at all are errors.
#[derive(Debug, Clone)]
pub struct BlackLabClient {
    base_url: String,
    credentials: Credentials,
    http_client: reqwest::Client,
}

impl BlackLabClient {
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(TransportError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            base_url: trimmed.to_string(),
            credentials,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Transmit a request and collect status and body text.
    pub async fn send(&self, request: Request) -> Result<Response> {
        let url = self.url_for(&request.path);
        let request_id = new_request_id();

        let mut builder = match request.method {
            Method::Get => self.http_client.get(&url),
            Method::Post => self.http_client.post(&url),
            Method::Delete => self.http_client.delete(&url),
        };
        builder = builder
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(REQUEST_ID_HEADER, &request_id)
            .header(ACCEPT, request.accept.mime());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Body::Multipart(upload) = request.body {
            let part = reqwest::multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
            builder = builder.multipart(reqwest::multipart::Form::new().part(upload.field, part));
        }

        let network_error = |source| TransportError::Network {
            method: request.method.to_string(),
            path: request.path.clone(),
            source,
        };

        let response = builder.send().await.map_err(network_error)?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_text = response.text().await.map_err(network_error)?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            request_id = %request_id,
            "service call finished"
        );

        Ok(Response {
            ok: status.is_success(),
            status: status.as_u16(),
            content_type,
            body_text,
            request_id,
        })
    }

    /// Like [`send`](Self::send), but a non-2xx status becomes
    /// [`TransportError::Status`].
    pub async fn send_ok(&self, request: Request) -> Result<Response> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.send(request).await?;
        if response.ok {
            Ok(response)
        } else {
            Err(TransportError::Status {
                method: method.to_string(),
                path,
                status: response.status,
                body: response.body_text,
            })
        }
    }

    pub async fn server_info(&self) -> Result<Response> {
        self.send(builders::server_info()).await
    }

    pub async fn register_format(&self, format_bytes: Vec<u8>, file_name: &str) -> Result<Response> {
        self.send(builders::register_format(format_bytes, file_name))
            .await
    }

    pub async fn create_index(
        &self,
        owner: &str,
        name: &str,
        display_name: &str,
        format_id: &str,
    ) -> Result<Response> {
        self.send(builders::create_index(owner, name, display_name, format_id))
            .await
    }

    pub async fn fetch_index_status(&self, index_id: &str) -> Result<Response> {
        self.send(builders::fetch_index_status(index_id)).await
    }

    pub async fn fetch_index_metadata(&self, index_id: &str) -> Result<Response> {
        self.send(builders::fetch_index_metadata(index_id)).await
    }

    pub async fn fetch_index_content(&self, index_id: &str) -> Result<Response> {
        self.send(builders::fetch_index_content(index_id)).await
    }

    pub async fn ingest_documents(&self, index_id: &str, payload: Vec<u8>) -> Result<Response> {
        self.send(builders::ingest_documents(index_id, payload))
            .await
    }

    pub async fn delete_index(&self, index_id: &str) -> Result<Response> {
        self.send(builders::delete_index(index_id)).await
    }

    pub async fn run_query(
        &self,
        index_id: &str,
        pattern: &str,
        filter: Option<&str>,
        accept: ResponseFormat,
        options: QueryOptions,
    ) -> Result<Response> {
        self.send(builders::run_query(index_id, pattern, filter, accept, options))
            .await
    }
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
