//! Single-shot HTTP execution with service error mapping.

use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use url::Url;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct RequestExecutor;

impl RequestExecutor {
    /// POST a JSON body once and return the response bytes. Never retries.
    ///
    /// `auth` is a lowercase header name and its value.
    pub async fn post<T: serde::Serialize + ?Sized>(
        http: &reqwest::Client,
        url: &Url,
        body: &T,
        auth: (&'static str, String),
    ) -> Result<Vec<u8>> {
        let (name, value) = auth;
        let mut value = HeaderValue::from_str(&value)
            .map_err(|_| Error::auth("credential contains characters not allowed in a header"))?;
        value.set_sensitive(true);

        let response = http
            .post(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(HeaderName::from_static(name), value)
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(ErrorEnvelope { error }) => (error.code, error.message.unwrap_or_default()),
            Err(_) => (None, text.trim().to_string()),
        };
        let message = if message.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            message
        };

        tracing::warn!(status = status.as_u16(), code = ?code, "Search request rejected");
        Err(Error::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }
}
