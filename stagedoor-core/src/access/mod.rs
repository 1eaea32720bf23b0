mod blocklist;
mod engine;
mod geo_policy;
mod teaser;

pub use blocklist::BlockListEvaluator;
pub use engine::AccessDecisionEngine;
pub use geo_policy::{GeoPolicyEvaluator, GeoVerdict};
pub use teaser::{validate_teaser_duration, TeaserSessionManager};
