//! HTTP client for the ciit-server API

use ciit_common::model::{Barrier, Concept, Session, Topic};
use ciit_common::{Error, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Error envelope the server attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Thin typed wrapper over the server's HTTP surface.
///
/// No retries and no timeouts here: callers decide what a failure means.
/// The session manager treats every failure as terminal for that one
/// operation and lets the next autosave tick retry implicitly.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn topics(&self) -> Result<Vec<Topic>> {
        let response = self.get("/api/topics").await?;
        decode(response).await
    }

    pub async fn barriers(&self) -> Result<Vec<Barrier>> {
        let response = self.get("/api/barriers").await?;
        decode(response).await
    }

    pub async fn concepts(&self) -> Result<Vec<Concept>> {
        let response = self.get("/api/concepts").await?;
        decode(response).await
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        let response = self.get("/api/sessions").await?;
        decode(response).await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        let response = self.get(&format!("/api/sessions/{session_id}")).await?;
        decode(response).await
    }

    /// POST the session and return the record as the server stored it (the
    /// server may have assigned the id and start time).
    pub async fn create_session(&self, session: &Session) -> Result<Session> {
        let response = self
            .http
            .post(self.url("/api/sessions"))
            .json(session)
            .send()
            .await
            .map_err(request_error)?;
        decode(response).await
    }

    /// PUT the full session record, replacing whatever is stored.
    pub async fn put_session(&self, session: &Session) -> Result<Session> {
        let response = self
            .http
            .put(self.url(&format!("/api/sessions/{}", session.id)))
            .json(session)
            .send()
            .await
            .map_err(request_error)?;
        decode(response).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/sessions/{session_id}")))
            .send()
            .await
            .map_err(request_error)?;
        check_status(response).await?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Response> {
        self.http
            .get(self.url(path))
            .send()
            .await
            .map_err(request_error)
    }
}

fn request_error(err: reqwest::Error) -> Error {
    Error::Internal(format!("Request failed: {err}"))
}

/// Map a non-success status to the matching domain error, extracting the
/// server's message from the error envelope when one is present.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error.message,
        Err(_) => format!("Server returned {status}"),
    };

    Err(match status {
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::BAD_REQUEST => Error::InvalidInput(message),
        StatusCode::CONFLICT => Error::Conflict(message),
        _ => Error::Internal(message),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| Error::Internal(format!("Malformed response body: {err}")))
}
