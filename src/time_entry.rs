use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// ミリ秒を時間へ変換するための係数。
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Togglの詳細レポートから取得した1件の作業記録。
#[derive(Clone, Debug)]
pub struct RawEntry {
    pub id: i64,
    pub project: Option<String>,
    pub description: String,
    /// 作業時間(ミリ秒)。
    pub dur: i64,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub uid: i64,
    pub client: Option<String>,
}

impl RawEntry {
    /// 作業時間を時間単位で返す。
    pub fn total_hours(&self) -> f64 {
        self.dur as f64 / MS_PER_HOUR
    }
}

/// 解決された転記先を表す構造体。
///
/// すべてのフィールドが`None`の場合は転記先なしを表し、
/// その場合も時間とコメントは同期される。
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TargetFields {
    pub issue_id: Option<i64>,
    pub project: Option<String>,
    pub client_id: Option<i64>,
    pub activity_id: Option<i64>,
}

/// 1つのfragmentに対して割り当てた時間と転記先。
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    pub comment: String,
    pub hours: f64,
    pub target: TargetFields,
}

/// 同期先へ書き込む1レコード分のパラメータ。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedParams {
    pub external_id: i64,
    pub data_source_id: i64,
    pub user_id: i64,
    pub spent_on: NaiveDate,
    pub hours: f64,
    pub comment: String,
    #[serde(flatten)]
    pub target: TargetFields,
}
