/// ログ基盤モジュール
///
/// 1回の実行につき1つのログファイルへ追記する設定を提供する。
/// グローバルなサブスクライバーは設定せず、構築した`Dispatch`を
/// 呼び出し側がエクスポート処理に明示的に紐付ける。
///
/// 出力形式: `<timestamp> - <LEVEL> - <message>`
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// タイムスタンプ形式（ローカル時刻、ミリ秒はカンマ区切り）
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// `RUST_LOG`未設定時のフィルタ（依存クレートはwarn以上のみ）
const DEFAULT_DIRECTIVES: &str = "warn,exporter=info,export_splunk_to_s3=info";

/// ログ初期化のエラー型
#[derive(Debug, Error)]
pub enum LoggingError {
    /// ログファイルを開けない
    #[error("ログファイルを開けません: {path}: {source}")]
    OpenFile {
        /// ログファイルのパス
        path: String,
        /// 元のI/Oエラー
        #[source]
        source: std::io::Error,
    },
}

/// `<timestamp> - <LEVEL> - <message>` 形式の1行フォーマッター
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLineFormat;

impl<S, N> FormatEvent<S, N> for LogLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        write!(writer, "{} - {} - ", timestamp, event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// ログファイルへ追記する`Dispatch`を構築する
///
/// ファイルが無ければ作成し、既存の内容は残したまま追記する。
/// ローテーションは行わない。環境変数`RUST_LOG`でレベルを変更でき、
/// デフォルトはこのクレートのinfo。
///
/// # 使用例
/// ```ignore
/// use tracing::instrument::WithSubscriber;
///
/// let dispatch = file_dispatch("export_splunk_to_s3.log")?;
/// run_export().with_subscriber(dispatch).await?;
/// ```
pub fn file_dispatch(path: impl AsRef<Path>) -> Result<Dispatch, LoggingError> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.display().to_string(),
            source,
        })?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .event_format(LogLineFormat);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    Ok(Dispatch::new(subscriber))
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
///
/// # 注意
/// この関数はテスト専用であり、本番環境では`file_dispatch`を使用すること。
#[cfg(test)]
pub fn init_test_logging() {
    use std::sync::Once;
    use tracing_subscriber::util::SubscriberInitExt;
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}
