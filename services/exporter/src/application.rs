// アプリケーション層モジュール
pub mod exporter;

// 再エクスポート
pub use exporter::{ExportError, ExportSummary, Exporter, PollConfig};
