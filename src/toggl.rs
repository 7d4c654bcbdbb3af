use std::env;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use log::info;
#[cfg(test)]
use mockall::automock;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;

use crate::time_entry::RawEntry;

/// Toggl詳細レポートの1ページ分のレスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct DetailedReportPage {
    total_count: i64,
    data: Vec<DetailedReportEntry>,
}

/// Toggl詳細レポートの1行をデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct DetailedReportEntry {
    id: i64,
    uid: i64,
    description: String,
    project: Option<String>,
    client: Option<String>,
    start: String,
    end: Option<String>,
    dur: i64,
}

/// Togglから作業記録を取得するためのtrait。
#[cfg_attr(test, automock)]
pub trait TogglRepository {
    /// 指定された期間の詳細レポートを取得する。
    async fn read_detailed_entries(
        &self,
        since: &NaiveDate,
        until: &NaiveDate,
    ) -> Result<Vec<RawEntry>>;
}

/// Toggl Reports APIと通信するためのクライアント。
///
/// # Examples
///
/// ```
/// let client = TogglReportsClient::new(workspace_id).unwrap();
/// let entries = client.read_detailed_entries(&since, &until).await.unwrap();
/// ```
pub struct TogglReportsClient {
    client: Client,
    api_url: String,
    api_token: String,
    workspace_id: i64,
}

impl TogglReportsClient {
    /// 新しい`TogglReportsClient`を返す。
    ///
    /// 環境変数`TOGGL_API_TOKEN`が設定されていない場合はエラーを返す。
    pub fn new(workspace_id: i64) -> Result<Self> {
        let api_token = env::var("TOGGL_API_TOKEN").context("TOGGL_API_TOKEN must be set")?;

        Ok(Self::with_api_url(
            "https://api.track.toggl.com/reports/api/v2".to_string(),
            api_token,
            workspace_id,
        ))
    }

    /// API URLとトークンを直接指定して`TogglReportsClient`を返す。
    pub fn with_api_url(api_url: String, api_token: String, workspace_id: i64) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_token,
            workspace_id,
        }
    }

    /// 詳細レポートを1ページ分取得する。
    async fn read_page(
        &self,
        since: &NaiveDate,
        until: &NaiveDate,
        page: i64,
    ) -> Result<DetailedReportPage> {
        self.client
            .get(format!("{}/details", self.api_url))
            .basic_auth(&self.api_token, Some("api_token"))
            .header(CONTENT_TYPE, "application/json")
            .query(&[
                ("workspace_id", self.workspace_id.to_string()),
                ("since", since.format("%Y-%m-%d").to_string()),
                ("until", until.format("%Y-%m-%d").to_string()),
                ("user_agent", "togsync".to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to Toggl API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<DetailedReportPage>()
            .await
            .context("Failed to deserialize response")
    }
}

impl TogglRepository for TogglReportsClient {
    /// 詳細レポートの全ページを取得して`RawEntry`へ変換する。
    async fn read_detailed_entries(
        &self,
        since: &NaiveDate,
        until: &NaiveDate,
    ) -> Result<Vec<RawEntry>> {
        let mut entries = Vec::new();
        let mut page = 1;
        loop {
            let report = self.read_page(since, until, page).await?;
            let page_size = report.data.len();
            for entry in report.data {
                entries.push(to_raw_entry(entry)?);
            }
            if entries.len() as i64 >= report.total_count || page_size == 0 {
                break;
            }
            page += 1;
        }
        info!("length of time entries: {}", entries.len());

        Ok(entries)
    }
}

/// 詳細レポートの1行を`RawEntry`へ変換する。
fn to_raw_entry(entry: DetailedReportEntry) -> Result<RawEntry> {
    let start = DateTime::parse_from_rfc3339(&entry.start)
        .with_context(|| format!("Failed to parse start time: {}", entry.start))?
        .to_utc();
    let end = match entry.end {
        Some(end) => Some(
            DateTime::parse_from_rfc3339(&end)
                .with_context(|| format!("Failed to parse end time: {}", end))?
                .to_utc(),
        ),
        None => None,
    };

    Ok(RawEntry {
        id: entry.id,
        project: entry.project,
        description: entry.description,
        dur: entry.dur,
        start,
        end,
        uid: entry.uid,
        client: entry.client,
    })
}
