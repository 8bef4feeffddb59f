use thiserror::Error;

/// Reasons a `SimulationConfig` is rejected before any tick runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("egg gestation period must be at least one tick")]
    ZeroGestation,

    #[error("queen position ({x}, {y}) lies outside the {width}x{height} grid")]
    QueenOutsideGrid {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid config document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a map layout cannot be parsed.
#[derive(Error, Debug, PartialEq)]
pub enum MapError {
    #[error("missing `rows` and `cols` header")]
    MissingHeader,

    #[error("map declares {expected} rows but has {actual}")]
    RowCount { expected: usize, actual: usize },

    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unknown cell `{value}` at row {row}, col {col}")]
    UnknownCell { value: char, row: usize, col: usize },

    #[error("map contains more than one queen")]
    DuplicateQueen,
}
