use crate::config::{IssueMapping, SourceConfig};
use crate::resolver::{
    ClientDirectory, IssueHandler, IssueMetadataSource, ProjectCompanyLookup,
    ProjectNameDenormalizer,
};
use crate::sync::UserAccountMapper;
use crate::time_entry::TargetFields;

/// 設定ファイルでissue解決を有効にするためのハンドラ識別子。
pub const CONFIG_ISSUE_HANDLER: &str = "config";

/// 設定ファイルの静的な対応表をlookupとして提供するアダプタ。
///
/// 外部コネクタを持たないオフライン実行で利用する。
pub struct ConfigDirectory<'a> {
    config: &'a SourceConfig,
}

impl<'a> ConfigDirectory<'a> {
    /// 新しい`ConfigDirectory`を返す。
    pub fn new(config: &'a SourceConfig) -> Self {
        Self { config }
    }
}

impl UserAccountMapper for ConfigDirectory<'_> {
    fn resolve(&self, source_id: i64, external_uid: i64) -> Option<i64> {
        if source_id != self.config.source_id {
            return None;
        }
        self.config
            .users
            .iter()
            .find(|user| user.uid == external_uid)
            .map(|user| user.user_id)
    }
}

impl ClientDirectory for ConfigDirectory<'_> {
    fn id_by_name(&self, name: &str) -> Option<i64> {
        self.config
            .clients
            .iter()
            .find(|client| client.name == name)
            .map(|client| client.id)
    }
}

impl ProjectCompanyLookup for ConfigDirectory<'_> {
    // 静的な対応表はresolverが直接参照するため、外部lookup分の追加情報はない。
    fn company_for_project(&self, _normalized_name: &str) -> Option<String> {
        None
    }
}

impl ProjectNameDenormalizer for ConfigDirectory<'_> {
    fn denormalize(&self, _normalized_name: &str) -> Option<String> {
        None
    }
}

/// 設定ファイルのissue対応表に基づくハンドラ。
struct ConfigIssueHandler {
    mapping: IssueMapping,
}

impl IssueHandler for ConfigIssueHandler {
    fn issue_related_params(&self, issue_id: i64) -> TargetFields {
        TargetFields {
            issue_id: Some(issue_id),
            project: self.mapping.project.clone(),
            client_id: self.mapping.client_id,
            activity_id: self.mapping.activity_id,
        }
    }
}

impl IssueMetadataSource for ConfigDirectory<'_> {
    fn handler_for(&self, issue_id: i64) -> Option<Box<dyn IssueHandler>> {
        self.config
            .issues
            .iter()
            .find(|issue| issue.id == issue_id)
            .map(|mapping| {
                Box::new(ConfigIssueHandler {
                    mapping: mapping.clone(),
                }) as Box<dyn IssueHandler>
            })
    }
}
