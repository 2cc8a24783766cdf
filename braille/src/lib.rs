pub mod cell;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod marker;
pub mod mode;
pub mod pipeline;
pub mod raster;
pub mod segment;
pub mod stats;
pub mod translate;

pub use cell::{Cell, CellSequence};
pub use config::TranslatorConfig;
pub use error::{CodecError, ConfigError, Error, FormatError, RasterError};
pub use format::{Input, InputKind, OutputFormat};
pub use pipeline::{DecodeReport, EncodeReport, Translator};
pub use segment::Language;
pub use translate::memory::MemoryService;
pub use translate::TranslationService;
