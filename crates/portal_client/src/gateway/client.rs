use std::error::Error as _;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};
use portal_core::Config;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Proxy, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::request::{ApiRequest, FilePart, MultipartPayload, RequestBody};
use super::response::{error_message, is_json_content, notification_text};
use crate::error::{ClientError, Result};
use crate::notify::Notifier;
use crate::storage::CredentialStore;

const CLIENT_USER_AGENT: &str = concat!("insuredocs-client/", env!("CARGO_PKG_VERSION"));

/// Single chokepoint for every call to the backend.
///
/// Attaches the stored bearer credential to protected calls, encodes the
/// body, and turns each response into exactly one outcome. Every failed call
/// is reported to the notifier once.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    credentials: CredentialStore,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    pub fn from_config(
        config: &Config,
        credentials: CredentialStore,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let client = Self::build_http_client(config)?;
        Ok(Self::with_client(
            client,
            config.api_base_url(),
            credentials,
            notifier,
        ))
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        credentials: CredentialStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            credentials,
            notifier,
        }
    }

    fn build_http_client(config: &Config) -> Result<Client> {
        let mut builder = Client::builder().default_headers(Self::default_headers());
        if !config.http_proxy.is_empty() {
            let proxy = Proxy::http(&config.http_proxy)
                .map_err(|e| ClientError::InvalidRequest(format!("invalid HTTP proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        if !config.https_proxy.is_empty() {
            let proxy = Proxy::https(&config.https_proxy)
                .map_err(|e| ClientError::InvalidRequest(format!("invalid HTTPS proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        builder
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to build HTTP client: {e}")))
    }

    pub fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Sends the request and returns the JSON payload, if the response had one.
    pub async fn send(&self, request: ApiRequest) -> Result<Option<Value>> {
        let outcome = self.execute(request).await;
        self.reported(outcome)
    }

    /// Like [`send`](Self::send), decoding the payload into `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Option<T>> {
        let path = request.path.clone();
        let outcome = match self.execute(request).await {
            Ok(Some(value)) => decode(&path, value).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        self.reported(outcome)
    }

    /// Sends the request and requires a JSON record of type `T` back.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let path = request.path.clone();
        let outcome = match self.execute(request).await {
            Ok(Some(value)) => decode(&path, value),
            Ok(None) => Err(ClientError::Decode {
                path,
                reason: "expected a JSON body but the response had none".to_string(),
            }),
            Err(e) => Err(e),
        };
        self.reported(outcome)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.fetch(ApiRequest::get(path)).await
    }

    pub async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.fetch(ApiRequest::get(path).public()).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.fetch(ApiRequest::post(path).json_body(body)).await
    }

    pub async fn patch_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.fetch(ApiRequest::patch(path).json_body(body)).await
    }

    /// DELETE whose response body, if any, is discarded.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }

    /// Authorized multipart POST of `file` plus string `fields`.
    pub async fn upload_file<T: DeserializeOwned>(
        &self,
        path: &str,
        file: FilePart,
        fields: impl IntoIterator<Item = (String, String)>,
    ) -> Result<T> {
        let mut payload = MultipartPayload::new(file);
        payload.fields.extend(fields);
        self.fetch(ApiRequest::post(path).multipart(payload)).await
    }

    fn reported<T>(&self, outcome: Result<T>) -> Result<T> {
        if let Err(e) = &outcome {
            self.notifier.error(&notification_text(e));
        }
        outcome
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        let raw = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Url::parse(&raw).map_err(|e| ClientError::InvalidRequest(format!("{raw}: {e}")))
    }

    async fn execute(&self, mut request: ApiRequest) -> Result<Option<Value>> {
        if let Some(reason) = request.take_encode_error() {
            return Err(ClientError::InvalidRequest(format!(
                "could not encode body for {}: {reason}",
                request.path
            )));
        }

        let path = request.path.clone();
        let url = self.url_for(&path)?;
        let mut headers = request.headers;

        if request.is_public {
            headers.remove(AUTHORIZATION);
        } else {
            match self.credentials.token() {
                Ok(Some(token)) => {
                    let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                        ClientError::InvalidRequest("stored credential is not a valid header".into())
                    })?;
                    headers.insert(AUTHORIZATION, value);
                }
                Ok(None) => warn!("No auth token found for protected route: {path}"),
                Err(e) => warn!("Could not read auth token for {path}: {e}"),
            }
        }

        let mut builder = self.client.request(request.method.clone(), url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.body {
            None => builder.headers(headers),
            Some(RequestBody::Json(value)) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                let encoded = serde_json::to_vec(&value).map_err(|e| {
                    ClientError::InvalidRequest(format!("could not encode body for {path}: {e}"))
                })?;
                builder.headers(headers).body(encoded)
            }
            Some(RequestBody::Form(pairs)) => builder.headers(headers).form(&pairs),
            Some(RequestBody::Multipart(payload)) => {
                // The transport sets the boundary content type.
                headers.remove(CONTENT_TYPE);
                builder.headers(headers).multipart(multipart_form(payload)?)
            }
        };

        info!("Sending {} request to {}", request.method, url);
        let start_time = Instant::now();

        let response = builder.send().await.map_err(|e| {
            error!("Failed HTTP request to {url}: {e}");
            if let Some(source) = e.source() {
                debug!("Error source: {source:?}");
            }
            if e.is_timeout() {
                error!("Request timed out");
            }
            if e.is_connect() {
                error!("Connection error");
            }
            ClientError::Transport(format!("Network error while contacting {url}: {e}"))
        })?;

        let status = response.status();
        info!(
            "Got response from {} after {:?} with status {}",
            url,
            start_time.elapsed(),
            status
        );
        let is_json = is_json_content(response.headers());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, is_json, &body);
            warn!("{} {} failed with {}: {}", request.method, path, status, message);
            return Err(ClientError::Http { status, message });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !is_json {
            warn!("Received non-JSON response from {path}");
            return Ok(None);
        }

        let bytes = response.bytes().await.map_err(|e| {
            ClientError::Transport(format!("Failed to read response from {url}: {e}"))
        })?;
        serde_json::from_slice::<Value>(&bytes)
            .map(Some)
            .map_err(|e| ClientError::Decode {
                path,
                reason: e.to_string(),
            })
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn multipart_form(payload: MultipartPayload) -> Result<Form> {
    let FilePart {
        file_name,
        bytes,
        mime_type,
    } = payload.file;
    let mut part = Part::bytes(bytes).file_name(file_name);
    if let Some(mime) = mime_type {
        part = part
            .mime_str(&mime)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid MIME type {mime}: {e}")))?;
    }

    let mut form = Form::new().part(MultipartPayload::FILE_FIELD, part);
    for (name, value) in payload.fields {
        form = form.text(name, value);
    }
    Ok(form)
}
