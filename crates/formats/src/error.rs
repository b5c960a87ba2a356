/// Malformed input for one dataset. Fatal to that dataset only.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("input is empty")]
    EmptyInput,
    #[error("missing raster header key `{0}`")]
    MissingHeaderKey(&'static str),
    #[error("invalid value `{value}` for raster header key `{key}`")]
    InvalidHeaderValue { key: &'static str, value: String },
    #[error("raster has no data rows after the header")]
    NoDataRows,
    #[error("raster declares {expected} cells but only {found} are present")]
    TruncatedData { expected: usize, found: usize },
    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
}
