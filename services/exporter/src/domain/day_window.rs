/// 1日分の検索時間窓
///
/// `[当日 00:00:00, 翌日 00:00:00)`の半開区間。タイムゾーン変換は行わず、
/// Splunk側のローカル時刻表現（オフセットなし）のまま扱う。
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// earliest/latestに埋め込む時刻フォーマット
const SEARCH_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// オブジェクトキーのファイル名部分のフォーマット
const OBJECT_KEY_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// 1日分の時間窓
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DayWindow {
    /// 指定日の時間窓を作成
    ///
    /// 翌日が表現できない日付（NaiveDate::MAX）の場合は`None`
    pub fn new(day: NaiveDate) -> Option<Self> {
        let next_day = day.succ_opt()?;
        Some(Self {
            start: day.and_time(NaiveTime::MIN),
            end: next_day.and_time(NaiveTime::MIN),
        })
    }

    /// 対象日
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    /// 窓の開始時刻（当日 00:00:00）
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// 窓の終了時刻（翌日 00:00:00、この時刻は含まない）
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// クエリ断片の前に時間範囲フィルタを付与した検索文字列を構築
    ///
    /// 例: `search earliest="2024-01-01T00:00:00" latest="2024-01-02T00:00:00" index=main`
    pub fn bounded_search(&self, query: &str) -> String {
        format!(
            "search earliest=\"{}\" latest=\"{}\" {}",
            self.start.format(SEARCH_TIME_FORMAT),
            self.end.format(SEARCH_TIME_FORMAT),
            query
        )
    }

    /// 窓の開始時刻から決まるオブジェクトキーを構築
    ///
    /// 例: `splunk/export/2024-01-01_00-00-00.json`
    pub fn object_key(&self, prefix: &str) -> String {
        format!("{}/{}.json", prefix, self.start.format(OBJECT_KEY_TIME_FORMAT))
    }
}

/// 日付範囲（両端を含む）を1日ずつ昇順に列挙するイテレーター
#[derive(Debug, Clone)]
pub struct DayWindows {
    next: Option<NaiveDate>,
    end_date: NaiveDate,
}

impl DayWindows {
    /// 新しいイテレーターを作成
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            next: Some(start_date),
            end_date,
        }
    }
}

impl Iterator for DayWindows {
    type Item = DayWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let day = self.next.filter(|day| *day <= self.end_date)?;
        let window = DayWindow::new(day)?;
        self.next = day.succ_opt();
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("有効な日付")
    }

    // ==================== DayWindow テスト ====================

    #[test]
    fn test_window_is_exactly_24_hours() {
        let window = DayWindow::new(date(2024, 1, 1)).unwrap();

        assert_eq!(window.day(), date(2024, 1, 1));
        assert_eq!(window.end() - window.start(), chrono::TimeDelta::hours(24));
        assert_eq!(window.end().date(), date(2024, 1, 2));
    }

    #[test]
    fn test_window_crosses_month_and_year() {
        let window = DayWindow::new(date(2023, 12, 31)).unwrap();
        assert_eq!(
            window.bounded_search("index=main"),
            "search earliest=\"2023-12-31T00:00:00\" latest=\"2024-01-01T00:00:00\" index=main"
        );
    }

    #[test]
    fn test_window_max_date_has_no_window() {
        assert!(DayWindow::new(NaiveDate::MAX).is_none());
    }

    #[test]
    fn test_bounded_search_keeps_query_fragment() {
        let window = DayWindow::new(date(2024, 1, 2)).unwrap();
        let query = "index=web status>=500 | stats count by host";

        let search = window.bounded_search(query);

        assert_eq!(
            search,
            format!(
                "search earliest=\"2024-01-02T00:00:00\" latest=\"2024-01-03T00:00:00\" {}",
                query
            )
        );
        assert!(search.ends_with(query));
    }

    #[test]
    fn test_object_key_format() {
        let window = DayWindow::new(date(2024, 1, 1)).unwrap();
        assert_eq!(
            window.object_key("splunk/export"),
            "splunk/export/2024-01-01_00-00-00.json"
        );
    }

    #[test]
    fn test_object_key_is_deterministic() {
        let first = DayWindow::new(date(2024, 3, 15)).unwrap();
        let second = DayWindow::new(date(2024, 3, 15)).unwrap();
        assert_eq!(first.object_key("p"), second.object_key("p"));
    }

    // ==================== DayWindows テスト ====================

    #[test]
    fn test_day_windows_ascending() {
        let days: Vec<NaiveDate> = DayWindows::new(date(2024, 1, 30), date(2024, 2, 2))
            .map(|w| w.day())
            .collect();

        assert_eq!(
            days,
            vec![
                date(2024, 1, 30),
                date(2024, 1, 31),
                date(2024, 2, 1),
                date(2024, 2, 2),
            ]
        );
    }

    #[test]
    fn test_day_windows_reversed_range() {
        let mut windows = DayWindows::new(date(2024, 1, 2), date(2024, 1, 1));
        assert!(windows.next().is_none());
    }

    #[test]
    fn test_day_windows_windows_are_contiguous() {
        let windows: Vec<DayWindow> =
            DayWindows::new(date(2024, 1, 1), date(2024, 1, 10)).collect();

        for pair in windows.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
    }
}
