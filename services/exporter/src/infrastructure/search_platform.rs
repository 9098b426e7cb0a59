//! 検索プラットフォーム操作モジュール
//!
//! エクスポートループから見た検索プラットフォームの契約を定義する。
//! - 検索ジョブの投入
//! - ジョブ状態の再取得と完了判定
//! - 完了したジョブの結果取得

use async_trait::async_trait;
use thiserror::Error;

use super::splunk::ResultsReader;

/// 検索プラットフォーム操作のエラー型
#[derive(Debug, Error)]
pub enum SearchPlatformError {
    /// 認証失敗
    #[error("Splunk認証エラー: {0}")]
    Authentication(String),

    /// HTTPエラー（ステータスコード付き）
    #[error("Splunk HTTPエラー: status={status}, message={message}")]
    Http {
        /// HTTPステータスコード
        status: u16,
        /// レスポンスボディ
        message: String,
    },

    /// ネットワークエラー
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// エンドポイントURLが構築できない
    #[error("エンドポイントURLが不正です: {0}")]
    InvalidEndpoint(String),

    /// レスポンスの形式が想定外
    #[error("Splunkレスポンスの形式が不正です: {0}")]
    InvalidResponse(String),

    /// ジョブがプラットフォーム側で失敗した
    #[error("検索ジョブが失敗しました: sid={sid}, state={state}")]
    JobFailed {
        /// 検索ジョブID
        sid: String,
        /// dispatchState
        state: String,
    },
}

/// 投入済みの検索ジョブ
///
/// 投入 → 完了までポーリング → 結果取得 の間だけ使われる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchJob {
    sid: String,
}

impl SearchJob {
    /// 検索ジョブIDから作成
    pub fn new(sid: impl Into<String>) -> Self {
        Self { sid: sid.into() }
    }

    /// 検索ジョブIDを取得
    pub fn sid(&self) -> &str {
        &self.sid
    }
}

/// 検索プラットフォーム操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait SearchPlatform: Send + Sync {
    /// 検索文字列を新しいジョブとして投入する
    ///
    /// # 引数
    /// * `search` - 時間範囲付きの検索文字列
    ///
    /// # 戻り値
    /// * `Ok(SearchJob)` - 投入されたジョブ
    /// * `Err(SearchPlatformError)` - 投入失敗（不正なクエリを含む）
    async fn submit(&self, search: &str) -> Result<SearchJob, SearchPlatformError>;

    /// ジョブ状態を再取得し、完了しているかを返す
    async fn is_done(&self, job: &SearchJob) -> Result<bool, SearchPlatformError>;

    /// 完了したジョブの結果を取得する
    async fn results(&self, job: &SearchJob) -> Result<ResultsReader, SearchPlatformError>;
}
