// Core algorithm exports
pub mod coverage;
pub mod distance;
pub mod error;
pub mod insights;
pub mod matcher;
pub mod resolver;
pub mod scoring;
pub mod stats;

pub use coverage::CoverageValidator;
pub use distance::{eta_minutes, format_distance, haversine_distance, is_within_radius};
pub use error::GeoError;
pub use matcher::{Matcher, PartnerMatch, RankingPolicy};
pub use resolver::resolve_coordinate;
pub use scoring::ConfidenceScorer;
pub use stats::AreaStatistics;
