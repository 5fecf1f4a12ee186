//! Wire contracts of the analysis backend: DTOs, request builders and response readers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capabilities::{FormPart, HttpRequest, HttpResponse};
use crate::config::{ApiConfig, Endpoint};
use crate::error::{
    AppError, AppResult, ErrorKind, POST_FAILED_TITLE, REANALYZE_FAILED_TITLE, UPLOAD_FAILED_TITLE,
};
use crate::model::{AnalysisResult, EstimatedPrice, ImageQuality, ImageRef};

pub const IMAGE_FIELD: &str = "image";
pub const LISTING_IMAGE_FILE_NAME: &str = "image.jpg";
pub const LISTING_IMAGE_CONTENT_TYPE: &str = "image/jpeg";
pub const GENERIC_SERVER_ERROR: &str = "Something went wrong on the server!";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReanalyzeRequest {
    pub item: String,
    pub brand: String,
    pub description: String,
    pub condition: String,
    pub search_keywords: Vec<String>,
    pub image_quality: ImageQuality,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReanalyzeResponse {
    pub estimated_price: EstimatedPrice,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResponse {
    #[serde(default, alias = "itemId")]
    pub item_id: Option<String>,
    #[serde(default, rename = "listingUrl", alias = "listing_url")]
    pub listing_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Error body of the analysis endpoint. `detail` is only used when it is a string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

/// Multipart fields of a listing, already formatted for the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub condition: String,
    pub image: ImageRef,
}

impl ListingForm {
    pub fn into_parts(self) -> Vec<FormPart> {
        vec![
            FormPart::text("title", self.title),
            FormPart::text("description", self.description),
            FormPart::text("price", self.price),
            FormPart::text("condition", self.condition),
            FormPart::file(
                IMAGE_FIELD,
                self.image.as_str(),
                LISTING_IMAGE_FILE_NAME,
                LISTING_IMAGE_CONTENT_TYPE,
            ),
        ]
    }
}

pub fn upload_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorDetail>(body)
        .ok()
        .and_then(|e| e.detail)
        .and_then(|detail| detail.as_str().map(str::to_string))
        .filter(|detail| !detail.trim().is_empty())
        .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string())
}

pub fn plain_error_message(status: u16, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        format!("HTTP error {status}")
    } else {
        text.to_string()
    }
}

fn prepare(config: &ApiConfig, endpoint: Endpoint) -> AppResult<HttpRequest> {
    let url = config.endpoint(endpoint)?;
    let request = match endpoint {
        Endpoint::Health => HttpRequest::get(url),
        Endpoint::Analyze | Endpoint::Reanalyze | Endpoint::Post => HttpRequest::post(url),
    };
    Ok(request.with_timeout_ms(config.request_timeout_ms)?)
}

pub fn analyze_request(config: &ApiConfig, image: &ImageRef) -> AppResult<HttpRequest> {
    let part = FormPart::file(IMAGE_FIELD, image.as_str(), image.file_name(), image.mime_type());
    Ok(prepare(config, Endpoint::Analyze)?.with_multipart(vec![part])?)
}

pub fn reanalyze_request(config: &ApiConfig, body: &ReanalyzeRequest) -> AppResult<HttpRequest> {
    Ok(prepare(config, Endpoint::Reanalyze)?
        .with_header("Accept", "application/json")?
        .with_json(body)?)
}

pub fn post_listing_request(config: &ApiConfig, form: ListingForm) -> AppResult<HttpRequest> {
    Ok(prepare(config, Endpoint::Post)?.with_multipart(form.into_parts())?)
}

pub fn health_request(config: &ApiConfig) -> AppResult<HttpRequest> {
    prepare(config, Endpoint::Health)
}

pub fn read_analysis(response: &HttpResponse) -> AppResult<AnalysisResult> {
    if !response.is_success() {
        return Err(AppError::server(response.status(), upload_error_message(response.body()))
            .with_title(UPLOAD_FAILED_TITLE));
    }
    let analysis: AnalysisResult = decode(response, UPLOAD_FAILED_TITLE)?;
    analysis.estimated_price.validate().map_err(|e| {
        AppError::new(ErrorKind::Deserialization, e.to_string()).with_title(UPLOAD_FAILED_TITLE)
    })?;
    Ok(analysis)
}

pub fn read_reanalysis(response: &HttpResponse) -> AppResult<EstimatedPrice> {
    if !response.is_success() {
        return Err(AppError::server(
            response.status(),
            plain_error_message(response.status(), response.body()),
        )
        .with_title(REANALYZE_FAILED_TITLE));
    }
    let revised: ReanalyzeResponse = decode(response, REANALYZE_FAILED_TITLE)?;
    revised.estimated_price.validate().map_err(|e| {
        AppError::new(ErrorKind::Deserialization, e.to_string()).with_title(REANALYZE_FAILED_TITLE)
    })?;
    Ok(revised.estimated_price)
}

/// A 2xx with an empty body still counts as a created listing.
pub fn read_listing(response: &HttpResponse) -> AppResult<ListingResponse> {
    if !response.is_success() {
        return Err(AppError::server(
            response.status(),
            plain_error_message(response.status(), response.body()),
        )
        .with_title(POST_FAILED_TITLE));
    }
    if response.body().iter().all(u8::is_ascii_whitespace) {
        debug!("listing endpoint returned an empty body");
        return Ok(ListingResponse::default());
    }
    decode(response, POST_FAILED_TITLE)
}

fn decode<T: DeserializeOwned>(response: &HttpResponse, title: &str) -> AppResult<T> {
    response.json().map_err(|e| {
        warn!(
            status = response.status(),
            content_type = response.header("content-type").unwrap_or("none"),
            error = %e,
            "response body is not the expected JSON"
        );
        AppError::from(e).with_title(title)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{HttpBody, HttpHeaders, HttpMethod};

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(status, HttpHeaders::new(), body.as_bytes().to_vec())
    }

    #[test]
    fn test_upload_error_message() {
        assert_eq!(upload_error_message(br#"{"detail":"corrupt image"}"#), "corrupt image");
        assert_eq!(upload_error_message(b"Internal Server Error"), GENERIC_SERVER_ERROR);
        assert_eq!(upload_error_message(br#"{"detail":[{"loc":["body"]}]}"#), GENERIC_SERVER_ERROR);
        assert_eq!(upload_error_message(b""), GENERIC_SERVER_ERROR);
    }

    #[test]
    fn test_plain_error_message() {
        assert_eq!(plain_error_message(400, b"invalid condition\n"), "invalid condition");
        assert_eq!(plain_error_message(502, b"   "), "HTTP error 502");
    }

    #[test]
    fn test_analyze_request_shape() {
        let config = ApiConfig::default().with_timeout_ms(Some(30_000));
        let request = analyze_request(&config, &ImageRef::new("file:///tmp/shot.png")).unwrap();

        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.url().as_str(), "http://localhost:8000/analyze-image/");
        assert_eq!(request.timeout_ms(), Some(30_000));
        assert_eq!(
            request.body(),
            &HttpBody::Multipart(vec![FormPart::file(
                "image",
                "file:///tmp/shot.png",
                "shot.png",
                "image/png"
            )])
        );
    }

    #[test]
    fn test_reanalyze_request_wire_names() {
        let body = ReanalyzeRequest {
            item: "Leather Jacket".into(),
            brand: "Acme".into(),
            description: "...".into(),
            condition: "Used".into(),
            search_keywords: vec!["jacket".into()],
            image_quality: ImageQuality::Good,
        };
        let request = reanalyze_request(&ApiConfig::default(), &body).unwrap();
        let HttpBody::Json(bytes) = request.body() else {
            panic!("expected a JSON body");
        };
        let json: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(json["searchKeywords"][0], "jacket");
        assert_eq!(json["imageQuality"], "Good");
        assert_eq!(json["condition"], "Used");
    }

    #[test]
    fn test_listing_form_parts() {
        let form = ListingForm {
            title: "Leather Jacket".into(),
            description: "...".into(),
            price: "40.00".into(),
            condition: "Used".into(),
            image: ImageRef::new("file:///tmp/a.png"),
        };
        let parts = form.into_parts();
        let names: Vec<_> = parts.iter().map(FormPart::name).collect();
        assert_eq!(names, ["title", "description", "price", "condition", "image"]);
        assert!(matches!(
            &parts[4],
            FormPart::File { file_name, content_type, .. }
                if file_name == "image.jpg" && content_type == "image/jpeg"
        ));
    }

    #[test]
    fn test_health_request_is_get() {
        let request = health_request(&ApiConfig::default()).unwrap();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_bad_config_is_configuration_error() {
        let err = health_request(&ApiConfig::new("not a url")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_read_analysis_failure() {
        let err = read_analysis(&response(500, r#"{"detail":"corrupt image"}"#)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Server);
        assert_eq!(err.message, "corrupt image");
        assert_eq!(err.title, UPLOAD_FAILED_TITLE);
    }

    #[test]
    fn test_read_analysis_rejects_inverted_price() {
        let body = r#"{"item":"a","brand":"b","description":"c","condition":"d",
            "imageQuality":"Good","estimatedPrice":{"min":60,"max":20,"suggested":40},
            "searchKeywords":[]}"#;
        let err = read_analysis(&response(200, body)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Deserialization);
    }

    #[test]
    fn test_read_reanalysis() {
        let price = read_reanalysis(&response(
            200,
            r#"{"estimatedPrice":{"min":25,"max":70,"suggested":55.5},"note":"x"}"#,
        ))
        .unwrap();
        assert_eq!(price.suggested, 55.5);

        let err = read_reanalysis(&response(400, "invalid condition")).unwrap_err();
        assert_eq!(err.message, "invalid condition");
        assert_eq!(err.title, REANALYZE_FAILED_TITLE);
    }

    #[test]
    fn test_read_listing_variants() {
        let listing = read_listing(&response(
            200,
            r#"{"itemId":"v1|123","listingUrl":"https://ebay.example/itm/123","status":"SUCCESS"}"#,
        ))
        .unwrap();
        assert_eq!(listing.item_id.as_deref(), Some("v1|123"));
        assert_eq!(listing.listing_url.as_deref(), Some("https://ebay.example/itm/123"));
        assert_eq!(listing.status.as_deref(), Some("SUCCESS"));

        let listing = read_listing(&response(201, r#"{"item_id":"9"}"#)).unwrap();
        assert_eq!(listing.item_id.as_deref(), Some("9"));
        assert_eq!(listing.listing_url, None);

        assert_eq!(read_listing(&response(200, "")).unwrap(), ListingResponse::default());

        let err = read_listing(&response(403, "token expired")).unwrap_err();
        assert_eq!(err.message, "token expired");
    }
}
