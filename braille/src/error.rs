use thiserror::Error;

/// Structurally invalid input to a cell codec or the mode decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("bit string length {0} is not a multiple of 6")]
    BitLength(usize),

    #[error("invalid character '{0}' in bit string at position {1}")]
    BitChar(char, usize),

    #[error("invalid point-number token '{token}' at index {index}")]
    PointToken { token: String, index: usize },

    #[error("non-braille characters at positions {0:?}")]
    NotBraille(Vec<usize>),

    #[error("bit array for cell {index} has {len} entries, expected 6")]
    BitArrayLength { index: usize, len: usize },

    #[error("bit array for cell {index} contains {value}, expected 0 or 1")]
    BitArrayValue { index: usize, value: u8 },

    #[error("{indicator} at cell {position} is not followed by content")]
    DanglingIndicator {
        indicator: &'static str,
        position: usize,
    },

    #[error("{count} consecutive capital indicators at cell {position}")]
    CapitalRun { count: usize, position: usize },
}

/// Raster geometry problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    #[error(
        "canvas {width}x{height} does not fit a grid of {cell}px cells with {margin}px margins"
    )]
    GeometryMismatch {
        width: u32,
        height: u32,
        cell: u32,
        margin: u32,
    },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("pixel buffer holds {len} bytes, expected at least {expected}")]
    BufferSize { len: usize, expected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unsupported output format '{0}' (expected unicode, dots, binary or json)")]
    Unsupported(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Parse(String),

    #[error("invalid marker scheme: {0}")]
    Markers(String),

    #[error("no translation tables configured for language '{0}'")]
    MissingTables(String),

    #[error("geometry error: {0}")]
    Geometry(#[from] RasterError),
}

/// Crate-level error for operations that can fail in more than one way.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed input: {0}")]
    Codec(#[from] CodecError),

    #[error("raster error: {0}")]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
