// Splunk検索結果リーダー
//
// `output_mode=json`で取得した結果ドキュメントから、レコードを1件ずつ取り出す。
// 前方向のみ・有限・再読み込み不可。

use serde::Deserialize;
use tracing::debug;

use crate::domain::Record;
use crate::infrastructure::search_platform::SearchPlatformError;

/// 結果ドキュメント（必要なフィールドのみ）
#[derive(Debug, Deserialize)]
struct ResultsDocument {
    #[serde(default)]
    results: Vec<Record>,
    #[serde(default)]
    messages: Vec<ResultMessage>,
}

/// 結果に混在する診断メッセージ（レコードではない）
#[derive(Debug, Deserialize)]
struct ResultMessage {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

/// 検索結果を1レコードずつ返すイテレーター
#[derive(Debug)]
pub struct ResultsReader {
    records: std::vec::IntoIter<Record>,
}

impl ResultsReader {
    /// 結果ドキュメント（JSON）をパース
    ///
    /// 空のボディは結果0件として扱う。
    /// `messages`の診断メッセージはレコードに含めず、debugログに出す。
    pub fn from_json(body: &str) -> Result<Self, SearchPlatformError> {
        if body.trim().is_empty() {
            return Ok(Self::from_records(Vec::new()));
        }

        let document: ResultsDocument = serde_json::from_str(body)
            .map_err(|e| SearchPlatformError::InvalidResponse(e.to_string()))?;

        for message in &document.messages {
            debug!("Splunkメッセージ: {} {}", message.kind, message.text);
        }

        Ok(Self::from_records(document.results))
    }

    /// 取得済みのレコード列から作成
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl Iterator for ResultsReader {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}
