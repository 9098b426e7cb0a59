/// 日単位エクスポートループ
///
/// 設定されたクエリごとに、日付範囲を1日ずつ昇順に進めながら
/// 検索ジョブ投入 → 完了待ち → 結果取得 → JSON化 → S3書き込み を行う。
///
/// # 処理の性質
/// - クエリは設定順、日は昇順に逐次処理する（並行処理なし）
/// - 再試行なし。どのエラーもその場で実行全体を中断する
/// - 中断時点までに書き込んだオブジェクトはそのまま残る
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::domain::{DateParseError, DayWindow, ExportedBlob, QuerySpec, Record};
use crate::infrastructure::config::DEFAULT_POLL_INTERVAL_MS;
use crate::infrastructure::{
    ConfigError, LoggingError, ObjectStore, ObjectStoreError, QueryConfig, SearchJob,
    SearchPlatform, SearchPlatformError,
};

/// エクスポート実行のエラー型
///
/// どの種類のエラーもプロセス境界まで伝播し、実行を終了させる。
#[derive(Debug, Error)]
pub enum ExportError {
    /// 設定エラー
    #[error("設定エラー: {0}")]
    Config(#[from] ConfigError),

    /// ログ初期化エラー
    #[error("ログ初期化エラー: {0}")]
    Logging(#[from] LoggingError),

    /// 日付パースエラー
    #[error("日付エラー: {0}")]
    DateParse(#[from] DateParseError),

    /// 検索プラットフォームエラー
    #[error("Splunkエラー: {0}")]
    SearchPlatform(#[from] SearchPlatformError),

    /// オブジェクトストアエラー
    #[error("S3エラー: {0}")]
    ObjectStore(#[from] ObjectStoreError),

    /// JSONシリアライズエラー
    #[error("JSONシリアライズエラー: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// ジョブ完了待ちのポーリング設定
///
/// タイムアウトや試行回数の上限は持たない。
/// 完了しないジョブがあれば、そこで永久に待ち続ける。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// 状態確認の間隔
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// 正常終了時の実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// 処理したクエリ数
    pub queries_processed: usize,
    /// 書き込んだオブジェクト数
    pub objects_written: usize,
}

/// エクスポーター
pub struct Exporter<SP, OS>
where
    SP: SearchPlatform,
    OS: ObjectStore,
{
    /// 検索プラットフォーム
    search_platform: SP,
    /// オブジェクトストア
    object_store: OS,
    /// 出力先バケット
    bucket: String,
    /// オブジェクトキーのプレフィックス
    key_prefix: String,
    /// ポーリング設定
    poll: PollConfig,
}

impl<SP, OS> Exporter<SP, OS>
where
    SP: SearchPlatform,
    OS: ObjectStore,
{
    /// 新しいExporterを作成
    pub fn new(
        search_platform: SP,
        object_store: OS,
        bucket: impl Into<String>,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            search_platform,
            object_store,
            bucket: bucket.into(),
            key_prefix: key_prefix.into(),
            poll: PollConfig::default(),
        }
    }

    /// ポーリング間隔を設定
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    /// ポーリング設定を取得
    pub fn poll_config(&self) -> PollConfig {
        self.poll
    }

    /// すべてのクエリを設定順にエクスポートする
    ///
    /// 日付はクエリに到達した時点でパースする。不正な日付があれば、
    /// そのクエリのジョブを1つも投入せずに実行全体を中断する。
    ///
    /// # 戻り値
    /// * `Ok(ExportSummary)` - すべてのクエリ・日が完了した
    /// * `Err(ExportError)` - 最初に発生したエラー
    pub async fn run(&self, queries: &[QueryConfig]) -> Result<ExportSummary, ExportError> {
        let mut summary = ExportSummary::default();

        for entry in queries {
            let spec = entry.to_query_spec()?;
            summary.objects_written += self.export_query(&spec).await?;
            summary.queries_processed += 1;
        }

        Ok(summary)
    }

    /// 1つのクエリについて、開始日から終了日まで1日ずつエクスポートする
    ///
    /// # 戻り値
    /// 書き込んだオブジェクト数（開始日 > 終了日なら0）
    pub async fn export_query(&self, spec: &QuerySpec) -> Result<usize, ExportError> {
        let mut written = 0;

        for window in spec.day_windows() {
            self.export_day(spec.query(), &window).await?;
            written += 1;
        }

        Ok(written)
    }

    /// 1日分をエクスポートし、書き込んだオブジェクトキーを返す
    pub async fn export_day(&self, query: &str, window: &DayWindow) -> Result<String, ExportError> {
        let search = window.bounded_search(query);

        info!("Executing search: {}", search);
        let job = self.search_platform.submit(&search).await?;

        self.wait_for_job(&job).await?;

        let records: Vec<Record> = self.search_platform.results(&job).await?.collect();
        let blob = ExportedBlob::from_records(&records)?;

        let key = window.object_key(&self.key_prefix);
        info!("Uploading data to S3: {}/{}", self.bucket, key);
        self.object_store
            .put(&self.bucket, &key, blob.into_body())
            .await?;

        Ok(key)
    }

    /// ジョブが完了するまで一定間隔で状態を確認する（タイムアウトなし）
    async fn wait_for_job(&self, job: &SearchJob) -> Result<(), SearchPlatformError> {
        while !self.search_platform.is_done(job).await? {
            tokio::time::sleep(self.poll.interval).await;
        }
        Ok(())
    }
}
