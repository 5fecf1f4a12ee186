//! Results screen: the analysis, the user's draft of it, and the actions built from the draft.

use serde::{Deserialize, Serialize};

use crate::api::{ListingForm, ListingResponse, ReanalyzeRequest};
use crate::config::PRICE_STEP;
use crate::flight::{FlightError, FlightToken, InFlight};
use crate::model::{
    format_price, Alert, AnalysisResult, DraftField, EditableListingDraft, EstimatedPrice,
    ImageQuality, ImageRef,
};
use crate::navigation::{NavigationError, ResultsParams};

pub const MISSING_DATA_MESSAGE: &str = "Error: Missing data.";
pub const MALFORMED_DATA_MESSAGE: &str = "Error: Invalid analysis data.";
pub const QUALITY_ADVISORY_TITLE: &str = "Image Quality";
pub const PRICE_UPDATED_TITLE: &str = "Price Updated";
pub const LISTING_CREATED_TITLE: &str = "Listing Created";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingReceipt {
    pub item_id: Option<String>,
    pub listing_url: Option<String>,
    pub status: Option<String>,
}

impl From<ListingResponse> for ListingReceipt {
    fn from(response: ListingResponse) -> Self {
        Self {
            item_id: response.item_id.filter(|id| !id.is_empty()),
            listing_url: response.listing_url.filter(|url| !url.is_empty()),
            status: response.status,
        }
    }
}

impl ListingReceipt {
    pub fn confirmation_message(&self) -> String {
        match &self.item_id {
            Some(id) => format!("Listing created (ID {id})"),
            None => "Listing created".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResultsScreen {
    Ready(ResultsState),
    /// Terminal. Nothing on the screen responds once mounting has failed.
    Failed { message: String },
}

impl ResultsScreen {
    /// Opens the navigation parameters. The alert, if any, is the one-off quality advisory.
    pub fn mount(params: &ResultsParams) -> (Self, Option<Alert>) {
        let opened = params.open().and_then(|(image, analysis)| {
            analysis
                .estimated_price
                .validate()
                .map(|()| (image, analysis))
                .map_err(|e| NavigationError::MalformedAnalysis {
                    reason: e.to_string(),
                })
        });
        match opened {
            Ok((image, analysis)) => {
                let state = ResultsState::new(image, analysis);
                let advisory = state.quality_advisory();
                (ResultsScreen::Ready(state), advisory)
            }
            Err(err) => {
                tracing::warn!(error = %err, "results screen mounted without usable parameters");
                let message = match err {
                    NavigationError::MissingImage | NavigationError::MissingAnalysis => {
                        MISSING_DATA_MESSAGE
                    }
                    NavigationError::MalformedAnalysis { .. } => MALFORMED_DATA_MESSAGE,
                };
                (
                    ResultsScreen::Failed {
                        message: message.to_string(),
                    },
                    None,
                )
            }
        }
    }

    pub fn ready(&self) -> Option<&ResultsState> {
        match self {
            ResultsScreen::Ready(state) => Some(state),
            ResultsScreen::Failed { .. } => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut ResultsState> {
        match self {
            ResultsScreen::Ready(state) => Some(state),
            ResultsScreen::Failed { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultsState {
    pub image: ImageRef,
    pub original: AnalysisResult,
    pub draft: EditableListingDraft,
    pub reanalyze: InFlight,
    pub post: InFlight,
    pub last_listing: Option<ListingReceipt>,
}

impl ResultsState {
    pub fn new(image: ImageRef, original: AnalysisResult) -> Self {
        let draft = EditableListingDraft::from_result(&original);
        Self {
            image,
            original,
            draft,
            reanalyze: InFlight::default(),
            post: InFlight::default(),
            last_listing: None,
        }
    }

    pub fn price_range(&self) -> &EstimatedPrice {
        &self.draft.price_range
    }

    pub fn quality_advisory(&self) -> Option<Alert> {
        if !self.original.needs_retake_advisory() {
            return None;
        }
        let assessment = match self.original.image_quality {
            ImageQuality::Unknown => "could not be assessed".to_string(),
            quality => format!("was rated {}", quality.as_str()),
        };
        Some(Alert::advisory(
            QUALITY_ADVISORY_TITLE,
            format!(
                "The photo quality {assessment}. Retaking it may give a more accurate estimate."
            ),
        ))
    }

    /// Moves the slider. Returns the price actually selected.
    pub fn adjust_price(&mut self, value: f64) -> f64 {
        if value.is_finite() {
            self.draft.selected_price = snap_to_step(self.price_range(), value);
        }
        self.draft.selected_price
    }

    pub fn edit(&mut self, field: DraftField, value: String) {
        self.draft.set_field(field, value);
    }

    /// The draft's text fields plus the keywords and quality from the original analysis.
    pub fn reanalyze_request(&self) -> ReanalyzeRequest {
        ReanalyzeRequest {
            item: self.draft.item.clone(),
            brand: self.draft.brand.clone(),
            description: self.draft.description.clone(),
            condition: self.draft.condition.clone(),
            search_keywords: self.original.search_keywords.clone(),
            image_quality: self.original.image_quality,
        }
    }

    pub fn begin_reanalyze(&mut self) -> Result<(FlightToken, ReanalyzeRequest), FlightError> {
        let token = self.reanalyze.begin()?;
        Ok((token, self.reanalyze_request()))
    }

    /// Selects the revised suggestion and moves the slider bounds to the revised range.
    /// The original analysis is left alone.
    pub fn apply_revised_price(&mut self, revised: EstimatedPrice) -> f64 {
        self.draft.price_range = revised;
        self.draft.selected_price = revised.clamp(revised.suggested);
        self.draft.selected_price
    }

    pub fn listing_form(&self) -> ListingForm {
        ListingForm {
            title: self.draft.item.clone(),
            description: self.draft.description.clone(),
            price: format!("{:.2}", self.draft.selected_price),
            condition: self.draft.condition.clone(),
            image: self.image.clone(),
        }
    }

    pub fn begin_post(&mut self) -> Result<(FlightToken, ListingForm), FlightError> {
        let token = self.post.begin()?;
        Ok((token, self.listing_form()))
    }

    pub fn record_listing(&mut self, response: ListingResponse) -> &ListingReceipt {
        self.last_listing.insert(ListingReceipt::from(response))
    }

    pub fn share_title(&self) -> String {
        self.draft.item.clone()
    }

    pub fn share_message(&self) -> String {
        let draft = &self.draft;
        let mut lines = vec![
            format!("Check out this {}!", draft.item),
            format!("Brand: {}", draft.brand),
            draft.description.clone(),
            format!("Price: {}", format_price(draft.selected_price)),
        ];
        if !self.original.search_keywords.is_empty() {
            lines.push(format!(
                "Keywords: {}",
                self.original.search_keywords.join(", ")
            ));
        }
        let hashtag: String = draft.brand.chars().filter(|c| !c.is_whitespace()).collect();
        if !hashtag.is_empty() {
            lines.push(format!("#{hashtag}"));
        }
        lines.join("\n")
    }

    pub fn price_updated_alert(&self) -> Alert {
        Alert::info(
            PRICE_UPDATED_TITLE,
            format!("New suggested price: {}", format_price(self.draft.selected_price)),
        )
    }
}

/// Clamps into `range`, then rounds to the nearest slider step from `min`.
fn snap_to_step(range: &EstimatedPrice, value: f64) -> f64 {
    let clamped = range.clamp(value);
    let steps = ((clamped - range.min) / PRICE_STEP).round();
    range.clamp(range.min + steps * PRICE_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn analysis(quality: ImageQuality) -> AnalysisResult {
        AnalysisResult {
            item: "Leather Jacket".into(),
            brand: "Acme Goods".into(),
            description: "Brown, size M".into(),
            condition: "Used".into(),
            image_quality: quality,
            estimated_price: EstimatedPrice {
                min: 20.0,
                max: 60.0,
                suggested: 40.0,
            },
            search_keywords: vec!["jacket".into(), "leather".into()],
        }
    }

    fn state() -> ResultsState {
        ResultsState::new(ImageRef::new("file:///tmp/a.jpg"), analysis(ImageQuality::Good))
    }

    fn params(quality: ImageQuality) -> ResultsParams {
        ResultsParams::from_upload(&ImageRef::new("file:///tmp/a.jpg"), &analysis(quality)).unwrap()
    }

    #[test]
    fn test_mount_good_quality_has_no_advisory() {
        let (screen, advisory) = ResultsScreen::mount(&params(ImageQuality::Good));
        assert!(advisory.is_none());
        let state = screen.ready().unwrap();
        assert_eq!(state.draft.selected_price, 40.0);
    }

    #[test]
    fn test_mount_poor_quality_has_one_advisory() {
        let (_, advisory) = ResultsScreen::mount(&params(ImageQuality::Poor));
        let advisory = advisory.unwrap();
        assert_eq!(advisory.title, QUALITY_ADVISORY_TITLE);
        assert!(advisory.message.contains("Poor"));
    }

    #[test]
    fn test_mount_missing_data_fails_closed() {
        let params = ResultsParams {
            image_uri: Some("file:///tmp/a.jpg".into()),
            analysis_data: None,
        };
        let (screen, advisory) = ResultsScreen::mount(&params);
        assert!(advisory.is_none());
        assert!(matches!(screen, ResultsScreen::Failed { ref message } if message == MISSING_DATA_MESSAGE));
    }

    #[test]
    fn test_adjust_price_clamps_and_snaps() {
        let mut state = state();
        assert_eq!(state.adjust_price(5.0), 20.0);
        assert_eq!(state.adjust_price(500.0), 60.0);
        assert!((state.adjust_price(33.33) - 33.35).abs() < 1e-9);
        assert_eq!(state.adjust_price(f64::NAN), state.draft.selected_price);
        assert_eq!(state.adjust_price(f64::INFINITY), state.draft.selected_price);
    }

    #[test]
    fn test_edits_leave_original_alone() {
        let mut state = state();
        state.edit(DraftField::Condition, "Like New".into());
        assert_eq!(state.draft.condition, "Like New");
        assert_eq!(state.original.condition, "Used");
        assert_eq!(state.reanalyze_request().condition, "Like New");
        assert_eq!(state.reanalyze_request().search_keywords, ["jacket", "leather"]);
    }

    #[test]
    fn test_revised_price_replaces_selection_and_bounds() {
        let mut state = state();
        let revised = EstimatedPrice {
            min: 70.0,
            max: 120.0,
            suggested: 95.0,
        };
        let selected = state.apply_revised_price(revised);
        assert_eq!(selected, 95.0);
        assert_eq!(state.price_range(), &revised);
        assert_eq!(state.price_updated_alert().message, "New suggested price: $95.00");
        assert_eq!(state.original.estimated_price.max, 60.0);

        // The slider now moves within the revised range.
        assert_eq!(state.adjust_price(500.0), 120.0);
        assert_eq!(state.adjust_price(10.0), 70.0);
    }

    #[test]
    fn test_mount_inverted_range_fails_closed() {
        let mut bad = analysis(ImageQuality::Good);
        bad.estimated_price = EstimatedPrice {
            min: 60.0,
            max: 20.0,
            suggested: 40.0,
        };
        let params = ResultsParams {
            image_uri: Some("file:///tmp/a.jpg".into()),
            analysis_data: Some(serde_json::to_string(&bad).unwrap()),
        };
        let (screen, advisory) = ResultsScreen::mount(&params);
        assert!(advisory.is_none());
        assert!(matches!(screen, ResultsScreen::Failed { ref message } if message == MALFORMED_DATA_MESSAGE));
    }

    #[test]
    fn test_unknown_quality_advisory_wording() {
        let (_, advisory) = ResultsScreen::mount(&params(ImageQuality::Unknown));
        let message = advisory.unwrap().message;
        assert!(message.contains("could not be assessed"));
        assert!(!message.contains("Unknown"));
    }

    #[test]
    fn test_single_flight_per_action() {
        let mut state = state();
        let (token, _) = state.begin_reanalyze().unwrap();
        assert!(state.begin_reanalyze().is_err());
        assert!(state.begin_post().is_ok());
        assert!(state.reanalyze.finish(token));
        assert!(state.begin_reanalyze().is_ok());
    }

    #[test]
    fn test_listing_form() {
        let mut state = state();
        state.adjust_price(42.5);
        let form = state.listing_form();
        assert_eq!(form.title, "Leather Jacket");
        assert_eq!(form.price, "42.50");
        assert_eq!(form.condition, "Used");
        assert_eq!(form.image.as_str(), "file:///tmp/a.jpg");
    }

    #[test]
    fn test_share_message() {
        let state = state();
        assert_eq!(
            state.share_message(),
            "Check out this Leather Jacket!\nBrand: Acme Goods\nBrown, size M\nPrice: $40.00\nKeywords: jacket, leather\n#AcmeGoods"
        );
    }

    #[test]
    fn test_share_message_omits_empty_lines() {
        let mut state = ResultsState::new(
            ImageRef::new("file:///tmp/a.jpg"),
            AnalysisResult {
                search_keywords: vec![],
                ..analysis(ImageQuality::Good)
            },
        );
        state.edit(DraftField::Brand, "  ".into());
        let message = state.share_message();
        assert!(!message.contains("Keywords"));
        assert!(!message.contains('#'));
    }

    #[test]
    fn test_listing_receipt() {
        let mut state = state();
        let receipt = state.record_listing(ListingResponse {
            item_id: Some("123".into()),
            listing_url: Some(String::new()),
            status: None,
        });
        assert_eq!(receipt.confirmation_message(), "Listing created (ID 123)");
        assert_eq!(receipt.listing_url, None);
        assert_eq!(ListingReceipt::default().confirmation_message(), "Listing created");
    }

    proptest! {
        #[test]
        fn prop_adjusted_price_stays_in_range(
            lo in 0.0f64..1_000.0,
            width in 0.0f64..1_000.0,
            value in proptest::num::f64::ANY,
        ) {
            let mut analysis = analysis(ImageQuality::Good);
            analysis.estimated_price = EstimatedPrice { min: lo, max: lo + width, suggested: lo };
            let mut state = ResultsState::new(ImageRef::new("file:///x.jpg"), analysis);
            let selected = state.adjust_price(value);
            prop_assert!(selected >= lo && selected <= lo + width);
        }

        #[test]
        fn prop_revised_suggestion_is_selected(
            lo in 0.0f64..1_000.0,
            width in 0.0f64..1_000.0,
            offset in 0.0f64..=1.0,
        ) {
            let suggested = lo + width * offset;
            let mut state = state();
            let selected = state.apply_revised_price(EstimatedPrice {
                min: lo,
                max: lo + width,
                suggested,
            });
            prop_assert_eq!(selected, suggested);
            prop_assert_eq!(state.original.estimated_price.suggested, 40.0);
        }
    }
}
