//! Fulfils the core's HTTP operations with `reqwest`, reading file parts from disk.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use shared::capabilities::{
    FormPart, HttpBody, HttpError, HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpResult,
};
use tracing::{debug, warn};
use url::Url;

#[derive(Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn execute(&self, request: &HttpRequest) -> HttpResult {
        let url = request.url().as_str();
        let mut builder = match request.method() {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        for (name, value) in request.headers().iter() {
            builder = builder.header(name, value);
        }
        if let Some(ms) = request.timeout_ms() {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        builder = match request.body() {
            HttpBody::Empty => builder,
            HttpBody::Json(bytes) => builder.body(bytes.clone()),
            HttpBody::Multipart(parts) => builder.multipart(build_form(parts).await?),
        };

        debug!(
            request_id = request.request_id(),
            method = request.method().as_str(),
            url,
            "sending request"
        );
        let response = builder.send().await.map_err(|e| map_error(request, &e))?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::InvalidResponse {
                reason: e.to_string(),
            })?;

        debug!(request_id = request.request_id(), status, bytes = body.len(), "response received");
        Ok(HttpResponse::new(status, HttpHeaders::from(headers), body.to_vec()))
    }
}

async fn build_form(parts: &[FormPart]) -> Result<Form, HttpError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                uri,
                file_name,
                content_type,
            } => {
                let path = uri_to_path(uri)?;
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| HttpError::FileUnavailable {
                        uri: uri.clone(),
                        message: e.to_string(),
                    })?;
                let file = Part::bytes(bytes)
                    .file_name(file_name.clone())
                    .mime_str(content_type)
                    .map_err(|e| HttpError::InvalidRequest {
                        reason: format!("bad content type '{content_type}': {e}"),
                    })?;
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}

/// Accepts `file://` URLs and plain filesystem paths.
pub fn uri_to_path(uri: &str) -> Result<PathBuf, HttpError> {
    if !uri.starts_with("file:") {
        return Ok(PathBuf::from(uri));
    }
    Url::parse(uri)
        .ok()
        .and_then(|url| url.to_file_path().ok())
        .ok_or_else(|| HttpError::FileUnavailable {
            uri: uri.to_string(),
            message: "not a local file URL".to_string(),
        })
}

fn map_error(request: &HttpRequest, e: &reqwest::Error) -> HttpError {
    if e.is_timeout() {
        return HttpError::Timeout {
            timeout_ms: request.timeout_ms().unwrap_or_default(),
            request_id: request.request_id().to_string(),
        };
    }
    if e.is_connect() || e.is_request() {
        return HttpError::ConnectionError {
            host: request.url().host().to_string(),
            message: e.to_string(),
        };
    }
    warn!(error = %e, "unexpected transport error");
    HttpError::InvalidResponse {
        reason: e.to_string(),
    }
}
