//! Typed HTTP client for the DataRepo REST backend.
//!
//! All calls return canonical models or [`ApiError`]; wire-format details
//! stay inside the [`wire`] adapter module. The client holds the bearer
//! token for the active session and attaches it to every request.

use std::sync::RwLock;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{header, Method, StatusCode};

use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{
    format_size, CreateDatasetRequest, Credentials, Dataset, DatasetDownload, Principal,
    RegisterRequest, UpdateDatasetRequest, Visibility, MAX_UPLOAD_BYTES,
};

pub(crate) mod wire;

use wire::{WireDataset, WireDatasetPatch, WirePrincipal};

/// Response header carrying the session token after login or registration.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Which slice of the dataset catalog to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Public datasets from every hospital
    Browse,
    /// All datasets owned by the authenticated principal
    Mine,
}

/// Successful authentication: the principal plus the bearer token that must
/// accompany subsequent calls. Nothing is installed on the client until the
/// session store commits it.
#[derive(Clone)]
pub struct AuthSession {
    pub principal: Principal,
    pub token: String,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("principal", &self.principal)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Typed access to the DataRepo REST API.
pub struct ResourceClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ResourceClient {
    /// Build a client from configuration.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("datarepo-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ApiError::Transport(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Install or clear the bearer token attached to subsequent requests.
    /// Normally driven by the session store.
    pub fn set_session_token(&self, token: Option<String>) {
        *self.token.write().expect("session token lock poisoned") = token;
    }

    pub fn has_session_token(&self) -> bool {
        self.token
            .read()
            .expect("session token lock poisoned")
            .is_some()
    }

    fn current_token(&self) -> Option<String> {
        self.token
            .read()
            .expect("session token lock poisoned")
            .clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request with the session token attached, when one is held.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = self.current_token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Verify credentials against the backend.
    ///
    /// `Ok(None)` means the backend rejected the credentials; any other
    /// failure is an error. Client state is untouched either way.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<AuthSession>, ApiError> {
        tracing::debug!("Authenticating {}", credentials.username);
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let token = extract_session_token(&response)?;
        let principal: WirePrincipal = response.json().await?;
        Ok(Some(AuthSession {
            principal: principal.into(),
            token,
        }))
    }

    /// Create a new hospital account. The backend signs the account in as
    /// part of registration, so a token comes back on success.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, ApiError> {
        tracing::debug!("Registering account {}", request.username);
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let token = extract_session_token(&response)?;
        let principal: WirePrincipal = response.json().await?;
        Ok(AuthSession {
            principal: principal.into(),
            token,
        })
    }

    /// Invalidate the session on the backend and drop the held token.
    ///
    /// The token is cleared before the request goes out, so local state is
    /// clean even when the backend call fails.
    pub async fn end_session(&self) -> Result<(), ApiError> {
        let token = self
            .token
            .write()
            .expect("session token lock poisoned")
            .take();
        let Some(token) = token else {
            return Ok(());
        };

        let response = self
            .http
            .post(self.url("/auth/logout"))
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(())
    }

    /// List datasets visible in the given scope, newest first as ordered by
    /// the backend.
    pub async fn list_datasets(&self, scope: ListScope) -> Result<Vec<Dataset>, ApiError> {
        let mut request = self.request(Method::GET, "/datasets");
        if scope == ListScope::Mine {
            request = request.query(&[("owner", "me")]);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        let datasets: Vec<WireDataset> = response.json().await?;
        Ok(datasets.into_iter().map(Dataset::from).collect())
    }

    /// Fetch one dataset. `Ok(None)` covers both a dataset that does not
    /// exist and one this principal is not allowed to know about.
    pub async fn get_dataset(&self, id: &str) -> Result<Option<Dataset>, ApiError> {
        let response = self
            .request(Method::GET, &format!("/datasets/{id}"))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        let dataset: WireDataset = response.json().await?;
        Ok(Some(dataset.into()))
    }

    /// Publish a new dataset. Oversized files are rejected locally without
    /// producing any network traffic.
    pub async fn create_dataset(&self, request: &CreateDatasetRequest) -> Result<Dataset, ApiError> {
        if request.file.size() > MAX_UPLOAD_BYTES {
            return Err(ApiError::Validation {
                field: Some("file".to_string()),
                message: format!(
                    "file is {}, above the {} upload limit",
                    format_size(request.file.size()),
                    format_size(MAX_UPLOAD_BYTES)
                ),
            });
        }

        tracing::debug!(
            "Uploading dataset {:?} ({})",
            request.name,
            format_size(request.file.size())
        );

        let part = Part::bytes(request.file.bytes.clone())
            .file_name(request.file.filename.clone())
            .mime_str(&request.file.content_type)
            .map_err(|err| ApiError::Validation {
                field: Some("file".to_string()),
                message: format!("invalid content type: {err}"),
            })?;
        let form = Form::new()
            .text("title", request.name.clone())
            .text("description", request.description.clone())
            .text("tags", request.tags.join(","))
            .text(
                "is_public",
                (request.visibility == Visibility::Public).to_string(),
            )
            .part("file", part);

        let response = self
            .request(Method::POST, "/datasets")
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(wire::normalize_validation(
                ApiError::from_response(response).await,
            ));
        }
        let dataset: WireDataset = response.json().await?;
        Ok(dataset.into())
    }

    /// Apply a partial update to an owned dataset.
    pub async fn update_dataset(
        &self,
        id: &str,
        request: &UpdateDatasetRequest,
    ) -> Result<Dataset, ApiError> {
        tracing::debug!("Updating dataset {}", id);
        let response = self
            .request(Method::PATCH, &format!("/datasets/{id}"))
            .json(&WireDatasetPatch::from(request))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(wire::normalize_validation(
                ApiError::from_response(response).await,
            ));
        }
        let dataset: WireDataset = response.json().await?;
        Ok(dataset.into())
    }

    /// Delete an owned dataset. `Ok(true)` when a dataset was removed,
    /// `Ok(false)` when there was nothing to remove, so retrying a delete
    /// that already went through stays a success.
    pub async fn delete_dataset(&self, id: &str) -> Result<bool, ApiError> {
        tracing::debug!("Deleting dataset {}", id);
        let response = self
            .request(Method::DELETE, &format!("/datasets/{id}"))
            .send()
            .await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(ApiError::from_response(response).await),
        }
    }

    /// Download a dataset's file. The filename comes from the
    /// `Content-Disposition` header when the backend provides one.
    pub async fn download_dataset(&self, id: &str) -> Result<DatasetDownload, ApiError> {
        tracing::debug!("Downloading dataset {}", id);
        let response = self
            .request(Method::GET, &format!("/datasets/{id}/download"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let filename = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_disposition_filename)
            .unwrap_or_else(|| format!("dataset-{id}"));
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(DatasetDownload {
            filename,
            content_type,
            bytes,
        })
    }
}

/// Pull the session token out of a login or registration response.
fn extract_session_token(response: &reqwest::Response) -> Result<String, ApiError> {
    response
        .headers()
        .get(SESSION_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::Transport(format!(
                "login response is missing the {SESSION_TOKEN_HEADER} header"
            ))
        })
}

/// Extract the filename parameter from a `Content-Disposition` value.
fn parse_content_disposition_filename(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
