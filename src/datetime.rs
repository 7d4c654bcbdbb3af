use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// start時刻をオフセット適用後の日付へ変換する。
///
/// 変換に利用するタイムゾーンは設定ファイルから明示的に渡す。
pub fn spent_on(start: &DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    start.with_timezone(offset).date_naive()
}

/// 日付をパースする。
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, FixedOffset, NaiveDate, TimeZone, Utc};
    use rstest::rstest;

    use super::{parse_date, spent_on};

    /// オフセット適用後の日付が得られることを確認する。
    #[rstest]
    #[case::utc(23, 30, 0, 1)]
    #[case::plus_9h_crosses_midnight(16, 0, 9 * 3600, 2)]
    #[case::minus_5h_stays_on_previous_day(3, 0, -5 * 3600, 31)]
    fn test_spent_on(
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] offset_secs: i32,
        #[case] expected_day: u32,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap();
        let offset = FixedOffset::east_opt(offset_secs).unwrap();

        let date = spent_on(&start, &offset);

        assert_eq!(date.day(), expected_day);
    }

    /// 日付のパースを確認する。
    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date("15/01/2024").is_err());
    }
}
