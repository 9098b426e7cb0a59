/// エクスポート設定（config.yaml）
///
/// 起動時に1度だけ読み込み、実行中は変更しない。
/// `splunk` / `aws` / `queries` の各キーは必須で、欠けている場合は即座にエラーになる。
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{DateParseError, QuerySpec};

/// ジョブ状態確認のデフォルト間隔（ミリ秒）
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// 設定読み込みのエラー型
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 設定ファイルが存在しない、または読めない
    #[error("設定ファイルの読み込みに失敗: {path}: {source}")]
    Io {
        /// 設定ファイルのパス
        path: String,
        /// 元のI/Oエラー
        #[source]
        source: std::io::Error,
    },

    /// YAMLが不正、または必須キーが欠けている
    #[error("設定ファイルのパースに失敗: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// エクスポート全体の設定
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    splunk: SplunkConfig,
    aws: AwsConfig,
    queries: Vec<QueryConfig>,
}

impl ExportConfig {
    /// 設定ファイルを読み込む
    ///
    /// # 戻り値
    /// * `Ok(ExportConfig)` - 読み込み成功
    /// * `Err(ConfigError::Io)` - ファイルが読めない
    /// * `Err(ConfigError::Parse)` - YAMLが不正、必須キーの欠落
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml_str(&contents)
    }

    /// YAML文字列から設定を作成
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Splunk接続設定を取得
    pub fn splunk(&self) -> &SplunkConfig {
        &self.splunk
    }

    /// AWS設定を取得
    pub fn aws(&self) -> &AwsConfig {
        &self.aws
    }

    /// エクスポート対象クエリを設定順に取得
    pub fn queries(&self) -> &[QueryConfig] {
        &self.queries
    }
}

/// Splunk接続設定
#[derive(Clone, Deserialize)]
pub struct SplunkConfig {
    username: String,
    password: String,
    host: String,
    port: u16,
    /// TLS証明書を検証するか（デフォルト: 検証しない）
    #[serde(default)]
    verify_tls: bool,
    /// ジョブ状態確認の間隔（ミリ秒）
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl std::fmt::Debug for SplunkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplunkConfig")
            .field("username", &self.username)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("verify_tls", &self.verify_tls)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish_non_exhaustive()
    }
}

impl SplunkConfig {
    /// 明示的な値で新しい設定を作成（テスト用）
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: host.into(),
            port,
            verify_tls: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// ユーザー名を取得
    pub fn username(&self) -> &str {
        &self.username
    }

    /// パスワードを取得
    pub fn password(&self) -> &str {
        &self.password
    }

    /// ホスト名を取得
    pub fn host(&self) -> &str {
        &self.host
    }

    /// 管理ポートを取得
    pub fn port(&self) -> u16 {
        self.port
    }

    /// TLS証明書を検証するか
    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// ジョブ状態確認の間隔
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// REST APIのベースURL（常にhttps）
    ///
    /// 例: "https://splunk.example.com:8089"
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }
}

/// AWS（S3）設定
#[derive(Clone, Deserialize)]
pub struct AwsConfig {
    access_key_id: String,
    secret_access_key: String,
    s3_bucket_name: String,
    s3_key_prefix: String,
    /// 省略時はAWSのデフォルトチェーン（AWS_REGION等）から解決
    #[serde(default)]
    region: Option<String>,
}

impl std::fmt::Debug for AwsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsConfig")
            .field("access_key_id", &self.access_key_id)
            .field("s3_bucket_name", &self.s3_bucket_name)
            .field("s3_key_prefix", &self.s3_key_prefix)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsConfig {
    /// アクセスキーIDを取得
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// シークレットアクセスキーを取得
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// 出力先バケット名を取得
    pub fn s3_bucket_name(&self) -> &str {
        &self.s3_bucket_name
    }

    /// オブジェクトキーのプレフィックスを取得
    pub fn s3_key_prefix(&self) -> &str {
        &self.s3_key_prefix
    }

    /// リージョンを取得（未指定ならNone）
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

/// 設定ファイル上のクエリエントリ
///
/// 日付は文字列のまま保持し、エクスポートループがこのエントリに到達した時点で
/// パースする。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryConfig {
    query: String,
    start_date: String,
    end_date: String,
}

impl QueryConfig {
    /// 新しいクエリエントリを作成
    pub fn new(
        query: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// クエリ断片を取得
    pub fn query(&self) -> &str {
        &self.query
    }

    /// 日付をパースしてQuerySpecに変換
    pub fn to_query_spec(&self) -> Result<QuerySpec, DateParseError> {
        QuerySpec::parse(self.query.clone(), &self.start_date, &self.end_date)
    }
}
