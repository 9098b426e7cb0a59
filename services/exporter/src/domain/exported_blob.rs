/// 1日分のエクスポート結果（JSON配列）
use serde_json::{Map, Value};

/// 検索結果の1レコード（フィールド名 → 値）
///
/// 形状はSplunk側が決めるため、このシステムでは中身を解釈しない。
pub type Record = Map<String, Value>;

/// S3に書き込むJSON配列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedBlob {
    body: Vec<u8>,
    record_count: usize,
}

impl ExportedBlob {
    /// レコード列をそのままの順序で1つのJSON配列にシリアライズ
    ///
    /// レコードが0件の場合は`[]`になる。
    pub fn from_records(records: &[Record]) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(records)?;
        Ok(Self {
            body,
            record_count: records.len(),
        })
    }

    /// シリアライズ済みのバイト列
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// バイト列を取り出す
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// 含まれるレコード数
    pub fn record_count(&self) -> usize {
        self.record_count
    }
}
