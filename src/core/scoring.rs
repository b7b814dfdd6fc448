use std::sync::Arc;
use std::time::Duration;

use crate::core::distance::{is_within_bounding_box, round2};
use crate::models::{
    Coordinate, DecisionBands, Geofence, ScoreBreakdown, ScoringWeights, ServiceArea,
    ValidationResult, ValidationStatus,
};
use crate::services::inference::{with_deadline, InferenceError, InferenceProvider};

/// Score used when a signal carries no information
pub const NEUTRAL_SCORE: f64 = 0.5;

const DISTRICT_PREFIX_LEN: usize = 4;
const DISTRICT_MATCH_SCORE: f64 = 0.6;
const LANDMARK_HIT_SCORE: f64 = 0.8;
const LANDMARK_MISS_SCORE: f64 = 0.3;

/// Multi-factor serviceability scorer for a single configured area
///
/// Scoring formula:
/// confidence = (
///     pincode_score * 0.4 +        # exact or same-district pincode
///     address_score * 0.3 +        # inference, landmark heuristic on failure
///     geo_score * 0.3              # coordinate against the area geofence
/// )
pub struct ConfidenceScorer<P> {
    area: Arc<ServiceArea>,
    provider: Arc<P>,
    weights: ScoringWeights,
    bands: DecisionBands,
    inference_timeout: Duration,
}

impl<P: InferenceProvider> ConfidenceScorer<P> {
    pub fn new(
        area: Arc<ServiceArea>,
        provider: Arc<P>,
        bands: DecisionBands,
        inference_timeout: Duration,
    ) -> Self {
        Self {
            area,
            provider,
            weights: ScoringWeights::default(),
            bands,
            inference_timeout,
        }
    }

    pub fn area(&self) -> &ServiceArea {
        &self.area
    }

    /// Decide whether an address falls inside the service area
    ///
    /// Never fails: inference problems degrade to fallback scores.
    pub async fn validate(
        &self,
        address: &str,
        pincode: &str,
        city: &str,
        coordinates: Option<Coordinate>,
    ) -> ValidationResult {
        let scores = ScoreBreakdown {
            pincode: pincode_score(pincode, &self.area),
            address: self.address_score(address, city).await,
            geolocation: geo_score(coordinates, &self.area.geofence),
        };

        // Bands apply to the raw blend; only the reported value is rounded
        let raw_confidence = blend(&scores, &self.weights);
        let status = decide(raw_confidence, self.bands);
        let confidence = round2(raw_confidence);

        tracing::info!(
            "Area validation for pincode {}: {:?} (confidence {:.2})",
            pincode,
            status,
            confidence
        );

        ValidationResult {
            status,
            confidence,
            message: status_message(status, &self.area.name),
            area_name: self.area.name.clone(),
            reasoning: format!(
                "Pincode: {:.2}, Address: {:.2}, Geo: {:.2}",
                scores.pincode, scores.address, scores.geolocation
            ),
            scores: ScoreBreakdown {
                pincode: round2(scores.pincode),
                address: round2(scores.address),
                geolocation: round2(scores.geolocation),
            },
        }
    }

    /// Address plausibility from the inference provider
    ///
    /// Falls back to the landmark heuristic when the provider errors or answers
    /// with something unparsable, and to [`NEUTRAL_SCORE`] when it never answers.
    pub async fn address_score(&self, address: &str, city: &str) -> f64 {
        let prompt = address_prompt(&self.area, address, city);

        match with_deadline(self.inference_timeout, self.provider.score(&prompt)).await {
            Ok(score) => score,
            Err(InferenceError::Timeout) => {
                tracing::warn!(
                    "{} address scoring timed out, using neutral score",
                    self.provider.name()
                );
                NEUTRAL_SCORE
            }
            Err(e) => {
                tracing::warn!(
                    "{} address scoring failed, using landmark heuristic: {}",
                    self.provider.name(),
                    e
                );
                landmark_score(address, &self.area.landmarks)
            }
        }
    }
}

/// 1.0 for a configured pincode, 0.6 when the first four digits match one, else 0.0
pub fn pincode_score(pincode: &str, area: &ServiceArea) -> f64 {
    let pincode = pincode.trim();

    if area.pincodes.contains(pincode) {
        return 1.0;
    }

    let Some(prefix) = pincode.get(..DISTRICT_PREFIX_LEN) else {
        return 0.0;
    };

    if area
        .pincodes
        .iter()
        .any(|p| p.get(..DISTRICT_PREFIX_LEN) == Some(prefix))
    {
        DISTRICT_MATCH_SCORE
    } else {
        0.0
    }
}

/// Case-insensitive landmark mention check
pub fn landmark_score(address: &str, landmarks: &[String]) -> f64 {
    let address = address.to_lowercase();

    if landmarks
        .iter()
        .any(|l| !l.is_empty() && address.contains(&l.to_lowercase()))
    {
        LANDMARK_HIT_SCORE
    } else {
        LANDMARK_MISS_SCORE
    }
}

/// Score a coordinate against the configured geofence
///
/// Distances here are plain Euclidean degrees, not kilometers.
pub fn geo_score(coordinates: Option<Coordinate>, geofence: &Geofence) -> f64 {
    use geo::EuclideanDistance;

    let Some(coord) = coordinates else {
        return NEUTRAL_SCORE;
    };

    match geofence {
        Geofence::BoundingBox(bbox) => {
            if is_within_bounding_box(coord, bbox) {
                return 1.0;
            }
            let degrees = coord.to_point().euclidean_distance(&bbox.center().to_point());
            if degrees < 0.01 {
                0.8
            } else if degrees < 0.02 {
                0.5
            } else {
                0.2
            }
        }
        Geofence::CenterRadius(center) => {
            let degrees = coord.to_point().euclidean_distance(&center.to_point());
            if degrees < 0.05 {
                1.0
            } else if degrees < 0.1 {
                0.7
            } else {
                0.3
            }
        }
        Geofence::Unbounded => NEUTRAL_SCORE,
    }
}

/// Weighted linear blend, clamped to [0, 1]
#[inline]
pub fn blend(scores: &ScoreBreakdown, weights: &ScoringWeights) -> f64 {
    (scores.pincode * weights.pincode
        + scores.address * weights.address
        + scores.geolocation * weights.geolocation)
        .clamp(0.0, 1.0)
}

/// Map a confidence to a status, evaluating bands from high to low
pub fn decide(confidence: f64, bands: DecisionBands) -> ValidationStatus {
    match bands {
        DecisionBands::Standard => {
            if confidence >= 0.75 {
                ValidationStatus::Approved
            } else if confidence >= 0.40 {
                ValidationStatus::Uncertain
            } else {
                ValidationStatus::Rejected
            }
        }
        DecisionBands::Strict => {
            if confidence >= 0.8 {
                ValidationStatus::Approved
            } else if confidence >= 0.5 {
                ValidationStatus::Pending
            } else {
                ValidationStatus::Rejected
            }
        }
    }
}

fn status_message(status: ValidationStatus, area_name: &str) -> String {
    match status {
        ValidationStatus::Approved => {
            format!("Great! You're in {}. We deliver to your area!", area_name)
        }
        ValidationStatus::Uncertain | ValidationStatus::Pending => {
            "We need to manually verify your location. Our team will contact you.".to_string()
        }
        ValidationStatus::Rejected => {
            format!("Sorry, we currently only serve {}. We'll expand soon!", area_name)
        }
    }
}

fn address_prompt(area: &ServiceArea, address: &str, city: &str) -> String {
    format!(
        r#"You are an area validation expert for a hyperlocal delivery service.

Our Service Area: {name}
Known Landmarks: {landmarks}
Boundaries: {boundaries}

User's Address: {address}, {city}

Task: Analyze if this address is likely within our service area.

Consider:
1. Landmark mentions
2. Street names common in the area
3. Neighborhood indicators
4. City match

Respond with ONLY a JSON object (no markdown, no code blocks):
{{"score": 0.0-1.0, "reasoning": "brief explanation"}}

Score Guidelines:
- 1.0: Definitely in the service area
- 0.7-0.9: Very likely in the service area
- 0.4-0.6: Possibly in the service area
- 0.0-0.3: Unlikely in the service area
"#,
        name = area.name,
        landmarks = area.landmarks.join(", "),
        boundaries = area.boundary_description,
        address = address,
        city = city,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider with a canned reply
    enum Reply {
        Text(&'static str),
        Fail,
        Hang,
    }

    struct StubProvider {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl InferenceProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Fail => Err(InferenceError::ApiError("boom".into())),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok("1.0".to_string())
                }
            }
        }
    }

    fn create_area() -> Arc<ServiceArea> {
        Arc::new(
            ServiceArea::new(
                "Ahmedabad",
                ["382481", "382424", "380015"].map(String::from),
                vec!["Gota".to_string(), "SG Highway".to_string()],
                None,
                Some(Coordinate::new(23.1167, 72.5667).unwrap()),
                5.0,
            )
            .unwrap(),
        )
    }

    fn scorer(reply: Reply) -> ConfidenceScorer<StubProvider> {
        ConfidenceScorer::new(
            create_area(),
            StubProvider::new(reply),
            DecisionBands::Standard,
            Duration::from_millis(50),
        )
    }

    #[test]
    fn test_pincode_score() {
        let area = create_area();
        assert_eq!(pincode_score("382481", &area), 1.0);
        assert_eq!(pincode_score(" 382481 ", &area), 1.0);
        assert_eq!(pincode_score("382499", &area), 0.6);
        assert_eq!(pincode_score("110001", &area), 0.0);
        assert_eq!(pincode_score("38", &area), 0.0);
        assert_eq!(pincode_score("", &area), 0.0);
    }

    #[test]
    fn test_landmark_score() {
        let landmarks = vec!["Gota".to_string(), "SG Highway".to_string()];
        assert_eq!(landmark_score("12 Shivalik Row, near sg highway", &landmarks), 0.8);
        assert_eq!(landmark_score("B-4, GOTA housing", &landmarks), 0.8);
        assert_eq!(landmark_score("Connaught Place", &landmarks), 0.3);
    }

    #[test]
    fn test_geo_score_center_radius() {
        let fence = Geofence::CenterRadius(Coordinate::new(23.1167, 72.5667).unwrap());

        assert_eq!(geo_score(None, &fence), 0.5);
        assert_eq!(geo_score(Some(Coordinate::new(23.13, 72.57).unwrap()), &fence), 1.0);
        assert_eq!(geo_score(Some(Coordinate::new(23.19, 72.5667).unwrap()), &fence), 0.7);
        assert_eq!(geo_score(Some(Coordinate::new(23.5, 72.5667).unwrap()), &fence), 0.3);
    }

    #[test]
    fn test_geo_score_bounding_box() {
        let fence = Geofence::BoundingBox(BoundingBox {
            min_lat: 19.120,
            max_lat: 19.145,
            min_lon: 72.825,
            max_lon: 72.850,
        });

        // center is (19.1325, 72.8375)
        assert_eq!(geo_score(Some(Coordinate::new(19.13, 72.83).unwrap()), &fence), 1.0);
        assert_eq!(geo_score(Some(Coordinate::new(19.1325, 72.8220).unwrap()), &fence), 0.5);
        assert_eq!(geo_score(Some(Coordinate::new(19.30, 72.90).unwrap()), &fence), 0.2);
        assert_eq!(geo_score(None, &fence), 0.5);
    }

    #[test]
    fn test_geo_score_unbounded() {
        let coord = Coordinate::new(0.0, 0.0).unwrap();
        assert_eq!(geo_score(Some(coord), &Geofence::Unbounded), 0.5);
    }

    #[test]
    fn test_blend_grid() {
        let weights = ScoringWeights::default();
        let levels = [0.0, 0.5, 1.0];

        for p in levels {
            for a in levels {
                for g in levels {
                    let scores = ScoreBreakdown {
                        pincode: p,
                        address: a,
                        geolocation: g,
                    };
                    let expected = 0.4 * p + 0.3 * a + 0.3 * g;
                    assert!((blend(&scores, &weights) - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_standard_bands() {
        assert_eq!(decide(0.75, DecisionBands::Standard), ValidationStatus::Approved);
        assert_eq!(decide(0.74, DecisionBands::Standard), ValidationStatus::Uncertain);
        assert_eq!(decide(0.40, DecisionBands::Standard), ValidationStatus::Uncertain);
        assert_eq!(decide(0.39, DecisionBands::Standard), ValidationStatus::Rejected);
    }

    #[test]
    fn test_strict_bands() {
        assert_eq!(decide(0.8, DecisionBands::Strict), ValidationStatus::Approved);
        assert_eq!(decide(0.7, DecisionBands::Strict), ValidationStatus::Pending);
        assert_eq!(decide(0.5, DecisionBands::Strict), ValidationStatus::Pending);
        assert_eq!(decide(0.49, DecisionBands::Strict), ValidationStatus::Rejected);
    }

    #[tokio::test]
    async fn test_validate_uses_provider_score() {
        let scorer = scorer(Reply::Text(r#"{"score": 0.9, "reasoning": "Gota"}"#));
        let result = scorer
            .validate(
                "Shivalik Row, Gota",
                "382481",
                "Ahmedabad",
                Some(Coordinate::new(23.12, 72.57).unwrap()),
            )
            .await;

        // 0.4 + 0.27 + 0.3
        assert_eq!(result.confidence, 0.97);
        assert_eq!(result.status, ValidationStatus::Approved);
        assert_eq!(result.scores.address, 0.9);
        assert_eq!(result.area_name, "Ahmedabad");
        assert_eq!(result.reasoning, "Pincode: 1.00, Address: 0.90, Geo: 1.00");
    }

    #[tokio::test]
    async fn test_neutral_signals_are_uncertain() {
        // p = 1.0, a = 0.5, g = 0.5 -> 0.70
        let scorer = scorer(Reply::Text("0.5"));
        let result = scorer.validate("Somewhere", "382481", "Ahmedabad", None).await;

        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.status, ValidationStatus::Uncertain);
        assert!(result.message.contains("manually verify"));
    }

    #[tokio::test]
    async fn test_status_decided_before_rounding() {
        // 0.4 + 0.1962 + 0.15 = 0.7462, reported as 0.75 but below the approval band
        let scorer = scorer(Reply::Text("0.654"));
        let result = scorer.validate("Somewhere", "382481", "Ahmedabad", None).await;

        assert_eq!(result.confidence, 0.75);
        assert_eq!(result.status, ValidationStatus::Uncertain);
        assert_eq!(result.scores.address, 0.65);
    }

    #[tokio::test]
    async fn test_provider_failure_uses_landmark_heuristic() {
        let scorer = scorer(Reply::Fail);

        let hit = scorer.address_score("Near SG Highway", "Ahmedabad").await;
        let miss = scorer.address_score("Unknown lane", "Ahmedabad").await;

        assert_eq!(hit, 0.8);
        assert_eq!(miss, 0.3);
    }

    #[tokio::test]
    async fn test_unparsable_reply_uses_landmark_heuristic() {
        let scorer = scorer(Reply::Text("I think it is in the area"));
        assert_eq!(scorer.address_score("Gota", "Ahmedabad").await, 0.8);
    }

    #[tokio::test]
    async fn test_hanging_provider_scores_neutral() {
        let scorer = scorer(Reply::Hang);
        let result = scorer.validate("Gota", "110001", "Delhi", None).await;

        assert_eq!(result.scores.address, 0.5);
        // 0.0 + 0.15 + 0.15
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.status, ValidationStatus::Rejected);
        assert!(result.message.starts_with("Sorry"));
    }

    #[tokio::test]
    async fn test_same_failure_same_result() {
        let scorer = scorer(Reply::Fail);
        let first = scorer.validate("Gota", "382481", "Ahmedabad", None).await;
        let second = scorer.validate("Gota", "382481", "Ahmedabad", None).await;

        assert_eq!(first, second);
        assert_eq!(scorer.provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_prompt_mentions_area_details() {
        let area = create_area();
        let prompt = address_prompt(&area, "12 Main Road", "Ahmedabad");

        assert!(prompt.contains("Our Service Area: Ahmedabad"));
        assert!(prompt.contains("Gota, SG Highway"));
        assert!(prompt.contains("12 Main Road, Ahmedabad"));
    }
}
