use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("degenerate ring: {points} point(s), need at least 2")]
    DegenerateRing { points: usize },
    #[error("feature {code:?} has no drawable rings")]
    EmptyFeature { code: String },
}
