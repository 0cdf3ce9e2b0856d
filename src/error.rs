use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Failed to parse chart at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid chart: {0}")]
    InvalidChart(String),

    #[error("Chart has no timing points..!")]
    NoTimingPoints,

    #[error("The first timing point must define a BPM..!")]
    MissingGoverningTempo,

    #[error("Changing BPM mid-chart is not supported (found {bpms:?})..!")]
    UnsupportedTempoChange { bpms: Vec<f64> },

    #[error("Unsupported key count: {0} (expected 1..=8)")]
    UnsupportedKeyCount(u8),

    #[error("Lane {index} does not exist in a {key_count}K layout..!")]
    LaneOutOfRange { key_count: u8, index: usize },

    #[error("Hold note #{index} at {time}ms has no valid end time..!")]
    MissingHoldEnd { index: usize, time: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
