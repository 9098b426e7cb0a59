/// エクスポート対象クエリの定義
///
/// 設定ファイルの1エントリ（クエリ断片と日付範囲）を検証済みの形で保持する。
use chrono::NaiveDate;
use thiserror::Error;

use super::day_window::DayWindows;

/// 設定ファイル上の日付フォーマット
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 日付パースのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DateParseError {
    /// YYYY-MM-DD形式として解釈できない
    #[error("日付の形式が不正です（YYYY-MM-DD）: {field}={value}")]
    InvalidFormat {
        /// 対象フィールド名（start_date / end_date）
        field: &'static str,
        /// 入力値
        value: String,
    },
}

/// 1つのエクスポート対象クエリ
///
/// `query`は時間範囲を含まない検索断片。日付範囲は両端を含む。
/// `start_date > end_date`の場合はエラーではなく、対象日が0件になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    query: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl QuerySpec {
    /// 検証済みの日付から作成
    pub fn new(query: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            query: query.into(),
            start_date,
            end_date,
        }
    }

    /// 文字列の日付をパースして作成
    ///
    /// # 戻り値
    /// * `Ok(QuerySpec)` - 両方の日付がYYYY-MM-DDとして解釈できた
    /// * `Err(DateParseError)` - どちらかの日付が不正
    pub fn parse(
        query: impl Into<String>,
        start_date: &str,
        end_date: &str,
    ) -> Result<Self, DateParseError> {
        let start_date = parse_date("start_date", start_date)?;
        let end_date = parse_date("end_date", end_date)?;

        Ok(Self::new(query, start_date, end_date))
    }

    /// クエリ断片を取得
    pub fn query(&self) -> &str {
        &self.query
    }

    /// 開始日を取得
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// 終了日を取得
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// 対象日数（開始日 > 終了日なら0）
    pub fn day_count(&self) -> usize {
        let days = (self.end_date - self.start_date).num_days();
        if days < 0 { 0 } else { days as usize + 1 }
    }

    /// 開始日から終了日まで1日ずつ昇順にDayWindowを列挙
    pub fn day_windows(&self) -> DayWindows {
        DayWindows::new(self.start_date, self.end_date)
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| DateParseError::InvalidFormat {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("有効な日付")
    }

    // ==================== parse テスト ====================

    #[test]
    fn test_parse_valid_dates() {
        let spec = QuerySpec::parse("index=main", "2024-01-01", "2024-01-03").unwrap();

        assert_eq!(spec.query(), "index=main");
        assert_eq!(spec.start_date(), date(2024, 1, 1));
        assert_eq!(spec.end_date(), date(2024, 1, 3));
    }

    #[test]
    fn test_parse_invalid_start_date() {
        let result = QuerySpec::parse("index=main", "2024/01/01", "2024-01-03");

        assert_eq!(
            result.unwrap_err(),
            DateParseError::InvalidFormat {
                field: "start_date",
                value: "2024/01/01".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_invalid_end_date() {
        let result = QuerySpec::parse("index=main", "2024-01-01", "2024-02-30");

        match result.unwrap_err() {
            DateParseError::InvalidFormat { field, value } => {
                assert_eq!(field, "end_date");
                assert_eq!(value, "2024-02-30");
            }
        }
    }

    #[test]
    fn test_parse_empty_date() {
        assert!(QuerySpec::parse("index=main", "", "2024-01-01").is_err());
    }

    #[test]
    fn test_date_parse_error_display() {
        let error = DateParseError::InvalidFormat {
            field: "start_date",
            value: "yesterday".to_string(),
        };
        assert!(error.to_string().contains("start_date=yesterday"));
        assert!(error.to_string().contains("YYYY-MM-DD"));
    }

    // ==================== day_count / day_windows テスト ====================

    #[test]
    fn test_day_count_inclusive_range() {
        let spec = QuerySpec::new("q", date(2024, 1, 1), date(2024, 1, 3));
        assert_eq!(spec.day_count(), 3);
        assert_eq!(spec.day_windows().count(), 3);
    }

    #[test]
    fn test_day_count_single_day() {
        let spec = QuerySpec::new("q", date(2024, 1, 1), date(2024, 1, 1));
        assert_eq!(spec.day_count(), 1);
        assert_eq!(spec.day_windows().count(), 1);
    }

    #[test]
    fn test_day_count_reversed_range_is_empty() {
        let spec = QuerySpec::new("q", date(2024, 1, 5), date(2024, 1, 1));
        assert_eq!(spec.day_count(), 0);
        assert_eq!(spec.day_windows().count(), 0);
    }

    #[test]
    fn test_day_count_matches_windows_across_leap_day() {
        let spec = QuerySpec::new("q", date(2024, 2, 27), date(2024, 3, 2));
        assert_eq!(spec.day_count(), 5);
        assert_eq!(spec.day_windows().count(), spec.day_count());
    }
}
