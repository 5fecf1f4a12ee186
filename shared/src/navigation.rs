//! Hand-off between the capture and results screens.
//!
//! The results screen receives exactly what a route would carry: an image URI and
//! the analysis serialized as a JSON string. Either may be missing if the screen
//! is reached some other way, so opening the parameters is fallible.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AnalysisResult, ImageRef};
use crate::results::ResultsScreen;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Screen {
    #[default]
    Capture,
    Results(Box<ResultsScreen>),
}

impl Screen {
    pub fn results(&self) -> Option<&ResultsScreen> {
        match self {
            Screen::Results(screen) => Some(screen),
            Screen::Capture => None,
        }
    }

    pub fn results_mut(&mut self) -> Option<&mut ResultsScreen> {
        match self {
            Screen::Results(screen) => Some(screen),
            Screen::Capture => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("navigation is missing the image reference")]
    MissingImage,

    #[error("navigation is missing the analysis payload")]
    MissingAnalysis,

    #[error("analysis payload could not be read: {reason}")]
    MalformedAnalysis { reason: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsParams {
    pub image_uri: Option<String>,
    pub analysis_data: Option<String>,
}

impl ResultsParams {
    pub fn from_upload(image: &ImageRef, analysis: &AnalysisResult) -> Result<Self, NavigationError> {
        let analysis_data = serde_json::to_string(analysis)
            .map_err(|e| NavigationError::MalformedAnalysis { reason: e.to_string() })?;
        Ok(Self {
            image_uri: Some(image.as_str().to_string()),
            analysis_data: Some(analysis_data),
        })
    }

    pub fn open(&self) -> Result<(ImageRef, AnalysisResult), NavigationError> {
        let image_uri = self
            .image_uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .ok_or(NavigationError::MissingImage)?;
        let analysis_data = self
            .analysis_data
            .as_deref()
            .filter(|data| !data.is_empty())
            .ok_or(NavigationError::MissingAnalysis)?;

        let analysis = serde_json::from_str(analysis_data)
            .map_err(|e| NavigationError::MalformedAnalysis { reason: e.to_string() })?;
        Ok((ImageRef::new(image_uri), analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EstimatedPrice, ImageQuality};
    use proptest::prelude::*;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            item: "Leather Jacket".into(),
            brand: "Acme".into(),
            description: "...".into(),
            condition: "Used".into(),
            image_quality: ImageQuality::Good,
            estimated_price: EstimatedPrice {
                min: 20.0,
                max: 60.0,
                suggested: 40.0,
            },
            search_keywords: vec!["jacket".into(), "leather".into()],
        }
    }

    #[test]
    fn test_open_round_trip() {
        let image = ImageRef::new("file:///tmp/a.jpg");
        let params = ResultsParams::from_upload(&image, &analysis()).unwrap();
        let (opened_image, opened) = params.open().unwrap();
        assert_eq!(opened_image, image);
        assert_eq!(opened, analysis());
    }

    #[test]
    fn test_missing_parameters() {
        let params = ResultsParams {
            image_uri: Some("file:///tmp/a.jpg".into()),
            analysis_data: None,
        };
        assert!(matches!(params.open(), Err(NavigationError::MissingAnalysis)));

        let params = ResultsParams {
            image_uri: None,
            analysis_data: Some("{}".into()),
        };
        assert!(matches!(params.open(), Err(NavigationError::MissingImage)));

        assert!(matches!(
            ResultsParams::default().open(),
            Err(NavigationError::MissingImage)
        ));
    }

    #[test]
    fn test_malformed_payload() {
        let params = ResultsParams {
            image_uri: Some("file:///tmp/a.jpg".into()),
            analysis_data: Some("{\"item\": 3}".into()),
        };
        assert!(matches!(params.open(), Err(NavigationError::MalformedAnalysis { .. })));
    }

    fn arb_quality() -> impl Strategy<Value = ImageQuality> {
        prop_oneof![
            Just(ImageQuality::Excellent),
            Just(ImageQuality::Good),
            Just(ImageQuality::Fair),
            Just(ImageQuality::Poor),
            Just(ImageQuality::Unknown),
        ]
    }

    proptest! {
        #[test]
        fn prop_payload_survives_navigation(
            item in ".{0,40}",
            brand in ".{0,20}",
            description in ".{0,200}",
            condition in "[A-Za-z ]{0,12}",
            quality in arb_quality(),
            a in 0u32..100_000,
            b in 0u32..100_000,
            c in 0u32..100_000,
            keywords in proptest::collection::vec("[a-z]{1,10}", 0..6),
        ) {
            let mut bounds = [a, b, c];
            bounds.sort_unstable();
            let analysis = AnalysisResult {
                item,
                brand,
                description,
                condition,
                image_quality: quality,
                estimated_price: EstimatedPrice {
                    min: f64::from(bounds[0]) / 100.0,
                    suggested: f64::from(bounds[1]) / 100.0,
                    max: f64::from(bounds[2]) / 100.0,
                },
                search_keywords: keywords,
            };
            let image = ImageRef::new("file:///tmp/a.jpg");
            let params = ResultsParams::from_upload(&image, &analysis).unwrap();
            let (_, opened) = params.open().unwrap();
            prop_assert_eq!(opened, analysis);
        }
    }
}
