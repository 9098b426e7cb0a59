// Splunk REST APIクライアント
//
// 管理ポート（https://<host>:<port>）に対して、セッションキー認証で
// 検索ジョブの投入・状態確認・結果取得を行う。
// 認証は実行ごとに1回だけ行い、再試行・セッション更新は行わない。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::results_reader::ResultsReader;
use crate::infrastructure::config::SplunkConfig;
use crate::infrastructure::search_platform::{SearchJob, SearchPlatform, SearchPlatformError};

/// 接続タイムアウト（秒）
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// すべてのリクエストでJSON出力を要求する
const OUTPUT_MODE: (&str, &str) = ("output_mode", "json");

/// ジョブが失敗したことを示すdispatchState
const DISPATCH_STATE_FAILED: &str = "FAILED";

/// POST /services/auth/login のレスポンス
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "sessionKey")]
    session_key: String,
}

/// POST /services/search/jobs のレスポンス
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    sid: String,
}

/// GET /services/search/jobs/{sid} のレスポンス
#[derive(Debug, Deserialize)]
struct JobStatusResponse {
    #[serde(default)]
    entry: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
struct JobEntry {
    content: JobContent,
}

#[derive(Debug, Deserialize)]
struct JobContent {
    #[serde(rename = "isDone", default)]
    is_done: bool,
    #[serde(rename = "dispatchState", default)]
    dispatch_state: Option<String>,
}

/// 認証済みのSplunkクライアント
#[derive(Clone)]
pub struct SplunkClient {
    /// HTTPクライアント（再試行なし）
    client: Client,
    /// REST APIのベースURL
    base_url: Url,
    /// ログインで得たセッションキー
    session_key: String,
}

impl std::fmt::Debug for SplunkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplunkClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SplunkClient {
    /// 設定からHTTPクライアントを構築し、ログインする
    ///
    /// `verify_tls`がfalseの場合は自己署名証明書を受け入れる。
    ///
    /// # 戻り値
    /// * `Ok(SplunkClient)` - 認証済みクライアント
    /// * `Err(SearchPlatformError)` - 接続・認証に失敗
    pub async fn connect(config: &SplunkConfig) -> Result<Self, SearchPlatformError> {
        let base_url = Url::parse(&config.base_url())
            .map_err(|e| SearchPlatformError::InvalidEndpoint(e.to_string()))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .danger_accept_invalid_certs(!config.verify_tls())
            .build()
            .map_err(network_error)?;

        Self::login(client, base_url, config.username(), config.password()).await
    }

    /// 指定のHTTPクライアントとベースURLでログインする
    ///
    /// 401はAuthenticationエラー、その他の非2xxはHttpエラーになる。
    pub async fn login(
        client: Client,
        base_url: Url,
        username: &str,
        password: &str,
    ) -> Result<Self, SearchPlatformError> {
        let url = endpoint(&base_url, &["services", "auth", "login"])?;
        debug!("Splunkにログイン: {}", url);

        let response = client
            .post(url)
            .form(&[("username", username), ("password", password), OUTPUT_MODE])
            .send()
            .await
            .map_err(network_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchPlatformError::Authentication(body));
        }

        let login: LoginResponse = read_json(response).await?;

        Ok(Self {
            client,
            base_url,
            session_key: login.session_key,
        })
    }

    /// ベースURLを取得
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authorization(&self) -> String {
        format!("Splunk {}", self.session_key)
    }

    fn job_url(&self, job: &SearchJob, suffix: Option<&str>) -> Result<Url, SearchPlatformError> {
        let mut segments = vec!["services", "search", "jobs", job.sid()];
        segments.extend(suffix);
        endpoint(&self.base_url, &segments)
    }
}

#[async_trait]
impl SearchPlatform for SplunkClient {
    async fn submit(&self, search: &str) -> Result<SearchJob, SearchPlatformError> {
        let url = endpoint(&self.base_url, &["services", "search", "jobs"])?;

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, self.authorization())
            .form(&[("search", search), OUTPUT_MODE])
            .send()
            .await
            .map_err(network_error)?;

        let submitted: SubmitResponse = read_json(response).await?;
        debug!("検索ジョブを投入: sid={}", submitted.sid);

        Ok(SearchJob::new(submitted.sid))
    }

    async fn is_done(&self, job: &SearchJob) -> Result<bool, SearchPlatformError> {
        let url = self.job_url(job, None)?;

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.authorization())
            .query(&[OUTPUT_MODE])
            .send()
            .await
            .map_err(network_error)?;

        // 投入直後でジョブがまだ参照できない間は204が返る
        if response.status() == StatusCode::NO_CONTENT {
            debug!("ジョブ準備中: sid={}", job.sid());
            return Ok(false);
        }

        let status: JobStatusResponse = read_json(response).await?;
        let content = status
            .entry
            .into_iter()
            .next()
            .map(|entry| entry.content)
            .ok_or_else(|| {
                SearchPlatformError::InvalidResponse(format!("entryがありません: sid={}", job.sid()))
            })?;

        if let Some(state) = content.dispatch_state.as_deref() {
            debug!("ジョブ状態: sid={} state={} done={}", job.sid(), state, content.is_done);
            if state == DISPATCH_STATE_FAILED {
                return Err(SearchPlatformError::JobFailed {
                    sid: job.sid().to_string(),
                    state: state.to_string(),
                });
            }
        }

        Ok(content.is_done)
    }

    async fn results(&self, job: &SearchJob) -> Result<ResultsReader, SearchPlatformError> {
        let url = self.job_url(job, Some("results"))?;

        // count=0 で件数上限なし（全件）
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.authorization())
            .query(&[OUTPUT_MODE, ("count", "0")])
            .send()
            .await
            .map_err(network_error)?;

        let body = read_body(response).await?;
        ResultsReader::from_json(&body)
    }
}

/// ベースURLにパスセグメントを連結したURLを構築
fn endpoint(base_url: &Url, segments: &[&str]) -> Result<Url, SearchPlatformError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| SearchPlatformError::InvalidEndpoint(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// 2xx以外をHttpエラーに変換してボディを返す
async fn read_body(response: Response) -> Result<String, SearchPlatformError> {
    let status = response.status();
    let body = response.text().await.map_err(network_error)?;

    if !status.is_success() {
        return Err(SearchPlatformError::Http {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(body)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SearchPlatformError> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|e| SearchPlatformError::InvalidResponse(e.to_string()))
}

fn network_error(error: reqwest::Error) -> SearchPlatformError {
    SearchPlatformError::Network(error.to_string())
}
