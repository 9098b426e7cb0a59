// Domain layer modules
pub mod day_window;
pub mod exported_blob;
pub mod query_spec;

// Re-exports
pub use day_window::{DayWindow, DayWindows};
pub use exported_blob::{ExportedBlob, Record};
pub use query_spec::{DateParseError, QuerySpec};
