//! オブジェクトストア操作モジュール
//!
//! エクスポート結果のJSON配列をS3に書き込む。
//! - 1回のPutObjectで全体を書き込む（部分書き込みなし）
//! - 同じキーへの再書き込みは上書き

use async_trait::async_trait;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use thiserror::Error;
use tracing::debug;

use super::config::AwsConfig;

/// 書き込むオブジェクトのContent-Type
const JSON_CONTENT_TYPE: &str = "application/json";

/// 静的認証情報のプロバイダー名
const CREDENTIALS_PROVIDER_NAME: &str = "export-config";

/// オブジェクトストア操作のエラー型
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// AWS SDK エラー
    #[error("AWS S3 APIエラー: {0}")]
    AwsSdkError(String),
}

/// オブジェクトストア操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// オブジェクトを書き込む
    ///
    /// # 引数
    /// * `bucket` - バケット名
    /// * `key` - オブジェクトキー
    /// * `body` - 書き込むバイト列
    ///
    /// # 戻り値
    /// * `Ok(())` - 書き込み成功
    /// * `Err(ObjectStoreError)` - エラー
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError>;
}

/// 実際のAWS S3 SDKを使用したオブジェクトストア実装
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    /// 新しいS3ObjectStoreを作成
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// 設定ファイルの静的認証情報でクライアントを作成
    ///
    /// リージョンは設定ファイルで指定されていればそれを使い、
    /// なければAWSのデフォルトチェーンから解決する。
    pub async fn from_config(config: &AwsConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id(),
            config.secret_access_key(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials);

        if let Some(region) = config.region() {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }

        let sdk_config = loader.load().await;
        Self::new(S3Client::new(&sdk_config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(JSON_CONTENT_TYPE)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| ObjectStoreError::AwsSdkError(DisplayErrorContext(&err).to_string()))?;

        debug!("S3への書き込み完了: s3://{}/{} ({} bytes)", bucket, key, size);
        Ok(())
    }
}
