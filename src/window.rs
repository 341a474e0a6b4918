use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 設定値の日付文字列（`YYYY-MM-DD`）をUTC深夜0時としてパース。
/// 空文字列や不正な形式はエラーにせず `None` を返す。
pub fn parse_config_date(s: &str) -> Option<DateTime<Utc>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()?;
    Some(at_midnight(date))
}

/// 指定時刻が属する月の初日と翌月初日（いずれもUTC 00:00）を返す。
pub fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .expect("first day of month is always valid");
    let next = if now.month() == 12 {
        NaiveDate::from_ymd_opt(now.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(now.year(), now.month() + 1, 1)
    }
    .expect("first day of next month is always valid");
    (at_midnight(first), at_midnight(next))
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is always valid"))
}

/// 抽出対象の日付範囲。`start` は含み、`end` は含まない半開区間 `[start, end)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// 現在時刻と設定上書き値から日付範囲を決定する。
    ///
    /// - `start_str` がパースできればその日の00:00、できなければ当月初日
    /// - `end_str` がパースできればその翌日00:00（指定日を含む）
    /// - `end_str` が空でなくパース不能なら翌月初日（当月全体をカバー）
    /// - `end_str` が空なら今日の翌日00:00（今日を含む）
    /// - 最後に `end <= start` なら `end = start + 1日` に補正
    pub fn resolve(now: DateTime<Utc>, start_str: &str, end_str: &str) -> Self {
        let (month_start, next_month) = month_bounds(now);

        let start = parse_config_date(start_str).unwrap_or(month_start);

        let end = match parse_config_date(end_str) {
            Some(end_date) => end_date + Duration::days(1),
            None if !end_str.trim().is_empty() => next_month,
            None => at_midnight(now.date_naive()) + Duration::days(1),
        };

        // 安全弁: 範囲が空または逆転していたら最低1日分を確保する
        let end = if end <= start {
            start + Duration::days(1)
        } else {
            end
        };

        Self { start, end }
    }

    /// 範囲に対応するJQL条件を生成する。終端は排他的なので1日引いて包含表現にする。
    pub fn jql(&self) -> String {
        let last_day = self.end - Duration::days(1);
        format!(
            "worklogDate >= \"{}\" AND worklogDate <= \"{}\"",
            self.start.format("%Y-%m-%d"),
            last_day.format("%Y-%m-%d")
        )
    }

    /// 指定時刻が範囲 `[start, end)` に含まれるかを判定。
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}
