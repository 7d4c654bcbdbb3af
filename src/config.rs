use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::Deserialize;

/// 同期対象のデータソース設定。
///
/// `users`/`clients`/`issues`はオフライン実行時にlookupの代わりとなる静的な対応表。
#[derive(Clone, Debug, Deserialize)]
pub struct SourceConfig {
    /// 同期先でデータソースを識別するID。
    pub source_id: i64,
    /// TogglのworkspaceのID。
    pub workspace_id: i64,
    /// issue経由の解決を有効にするハンドラ識別子。
    #[serde(default)]
    pub issue_handler: Option<String>,
    /// 正規化済みプロジェクト名と顧客の対応表。
    #[serde(default)]
    pub projects: Vec<ProjectMapping>,
    /// 作業記録に顧客名がない場合に利用する顧客名。
    #[serde(default)]
    pub default_client: Option<String>,
    /// spent_onの算出に利用するUTCからのオフセット(分)。
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub users: Vec<UserMapping>,
    #[serde(default)]
    pub clients: Vec<ClientMapping>,
    #[serde(default)]
    pub issues: Vec<IssueMapping>,
}

/// 正規化済みプロジェクト名に対する顧客と表示名の対応。
#[derive(Clone, Debug, Deserialize)]
pub struct ProjectMapping {
    /// 正規化済みのプロジェクト名。
    pub project: String,
    /// 顧客名。
    pub client: String,
    /// 表示用の元のプロジェクト名。
    #[serde(default)]
    pub project_origin: Option<String>,
}

/// 外部サービスのユーザーIDと内部ユーザーIDの対応。
#[derive(Clone, Debug, Deserialize)]
pub struct UserMapping {
    pub uid: i64,
    pub user_id: i64,
}

/// 顧客名と顧客IDの対応。
#[derive(Clone, Debug, Deserialize)]
pub struct ClientMapping {
    pub name: String,
    pub id: i64,
}

/// issue IDに紐づく転記先の対応。
#[derive(Clone, Debug, Deserialize)]
pub struct IssueMapping {
    pub id: i64,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub activity_id: Option<i64>,
}

impl SourceConfig {
    /// 設定ファイルを読み込む。
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// spent_onの算出に利用するオフセットを返す。
    pub fn tz_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .with_context(|| format!("utc_offset_minutes is out of range: {}", self.utc_offset_minutes))
    }
}

/// 既定の設定ファイルパスを返す。
pub fn default_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Failed to determine config directory")?;

    Ok(dir.join("togsync").join("config.json"))
}
