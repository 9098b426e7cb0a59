/// Splunk → S3 日単位エクスポート
///
/// カレントディレクトリの`config.yaml`を読み込み、設定されたクエリごとに
/// 日付範囲を1日ずつ検索してS3に書き込む。
/// ログはカレントディレクトリの`export_splunk_to_s3.log`に追記する。
///
/// コマンドライン引数はない。エラー時は非ゼロで終了する。
///
/// # ローカル実行
/// ```bash
/// cargo run --bin export_splunk_to_s3
/// ```
use exporter::application::{ExportError, Exporter};
use exporter::infrastructure::{file_dispatch, ExportConfig, S3ObjectStore, SplunkClient};
use tracing::instrument::WithSubscriber;
use tracing::{error, info};

/// 設定ファイルのパス
const CONFIG_FILE: &str = "config.yaml";

/// ログファイルのパス
const LOG_FILE: &str = "export_splunk_to_s3.log";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ExportError> {
    // 実行全体で使うログ出力先を構築し、エクスポート処理に紐付ける
    let dispatch = file_dispatch(LOG_FILE)?;

    run().with_subscriber(dispatch).await
}

/// 設定読み込みからエクスポート完了までを実行
async fn run() -> Result<(), ExportError> {
    let result = export().await;

    if let Err(e) = &result {
        error!("エクスポートに失敗: {}", e);
    }

    result
}

async fn export() -> Result<(), ExportError> {
    let config = ExportConfig::load(CONFIG_FILE)?;

    // Splunkへの認証は実行ごとに1回
    let splunk = SplunkClient::connect(config.splunk()).await?;
    let object_store = S3ObjectStore::from_config(config.aws()).await;

    let exporter = Exporter::new(
        splunk,
        object_store,
        config.aws().s3_bucket_name(),
        config.aws().s3_key_prefix(),
    )
    .with_poll_interval(config.splunk().poll_interval());

    let summary = exporter.run(config.queries()).await?;

    info!(
        "エクスポート完了: クエリ数={} オブジェクト数={}",
        summary.queries_processed, summary.objects_written
    );

    Ok(())
}
