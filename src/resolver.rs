use std::collections::HashMap;

use log::debug;
#[cfg(test)]
use mockall::automock;

use crate::config::ProjectMapping;
use crate::description::{issue_tag, project_tag};
use crate::time_entry::{RawEntry, TargetFields};

/// 顧客名から顧客IDを引くためのtrait。
#[cfg_attr(test, automock)]
pub trait ClientDirectory {
    fn id_by_name(&self, name: &str) -> Option<i64>;
}

/// 正規化済みプロジェクト名から顧客名を引くための外部lookup。
#[cfg_attr(test, automock)]
pub trait ProjectCompanyLookup {
    fn company_for_project(&self, normalized_name: &str) -> Option<String>;
}

/// 正規化済みプロジェクト名を表示用の元の名前へ戻すための外部lookup。
#[cfg_attr(test, automock)]
pub trait ProjectNameDenormalizer {
    fn denormalize(&self, normalized_name: &str) -> Option<String>;
}

/// issueに紐づく転記先パラメータを提供するハンドラ。
pub trait IssueHandler {
    fn issue_related_params(&self, issue_id: i64) -> TargetFields;
}

/// issue IDからハンドラを引くためのtrait。
#[cfg_attr(test, automock)]
pub trait IssueMetadataSource {
    fn handler_for(&self, issue_id: i64) -> Option<Box<dyn IssueHandler>>;
}

/// データソースIDから`IssueMetadataSource`を引くためのregistry。
///
/// issue経由の解決は、データソースに対してsourceが登録されている場合のみ有効になる。
#[derive(Default)]
pub struct IssueSourceRegistry<'a> {
    sources: HashMap<i64, &'a dyn IssueMetadataSource>,
}

impl<'a> IssueSourceRegistry<'a> {
    /// 新しい空の`IssueSourceRegistry`を返す。
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// データソースに対するissue解決元を登録する。
    pub fn register(&mut self, source_id: i64, source: &'a dyn IssueMetadataSource) {
        self.sources.insert(source_id, source);
    }

    /// データソースに登録されたissue解決元を返す。
    pub fn source_for(&self, source_id: i64) -> Option<&'a dyn IssueMetadataSource> {
        self.sources.get(&source_id).copied()
    }
}

/// fragmentから転記先を解決する。
///
/// 解決は次の順で試行し、最初に適用できた規則で確定する。
///
/// 1. issue経由: fragmentが数値tagを持ち、issue解決元が有効な場合
/// 2. プロジェクト名経由: fragmentがtagを持つ場合
/// 3. 作業記録自体のプロジェクト
/// 4. 転記先なし
pub struct TargetResolver<'a> {
    projects: &'a [ProjectMapping],
    clients: &'a dyn ClientDirectory,
    companies: &'a dyn ProjectCompanyLookup,
    denormalizer: &'a dyn ProjectNameDenormalizer,
    issues: Option<&'a dyn IssueMetadataSource>,
}

impl<'a> TargetResolver<'a> {
    /// 新しい`TargetResolver`を返す。
    pub fn new(
        projects: &'a [ProjectMapping],
        clients: &'a dyn ClientDirectory,
        companies: &'a dyn ProjectCompanyLookup,
        denormalizer: &'a dyn ProjectNameDenormalizer,
        issues: Option<&'a dyn IssueMetadataSource>,
    ) -> Self {
        Self {
            projects,
            clients,
            companies,
            denormalizer,
            issues,
        }
    }

    /// fragmentの転記先を解決する。
    ///
    /// `default_client_id`は作業記録自体のプロジェクトで解決した場合のみ利用する。
    /// どの規則でも解決できない場合は転記先なしを返し、エラーにはしない。
    pub fn resolve(
        &self,
        fragment: &str,
        entry: &RawEntry,
        default_client_id: Option<i64>,
    ) -> TargetFields {
        if let Some(issues) = self.issues {
            if let Some(issue_id) = issue_tag(fragment) {
                return match issues.handler_for(issue_id) {
                    Some(handler) => handler.issue_related_params(issue_id),
                    None => {
                        debug!("No issue handler found for issue {}", issue_id);
                        TargetFields::default()
                    }
                };
            }
        }

        if let Some(name) = project_tag(fragment) {
            return self.resolve_named_project(&name);
        }

        if let Some(project) = &entry.project {
            return TargetFields {
                project: Some(project.clone()),
                client_id: default_client_id,
                ..TargetFields::default()
            };
        }

        TargetFields::default()
    }

    /// tagに書かれたプロジェクト名から転記先を解決する。
    ///
    /// 顧客名は静的な対応表を優先し、見つからない場合のみ外部lookupへ問い合わせる。
    /// 表示名の復元も同じ順で行う。
    fn resolve_named_project(&self, name: &str) -> TargetFields {
        let normalized = normalize_project_name(name);
        let mapping = self.projects.iter().find(|m| m.project == normalized);

        let client_name = match mapping
            .map(|m| m.client.clone())
            .or_else(|| self.companies.company_for_project(&normalized))
        {
            Some(client_name) => client_name,
            None => {
                debug!("No client found for project {}", normalized);
                return TargetFields::default();
            }
        };

        let project = mapping
            .and_then(|m| m.project_origin.clone())
            .or_else(|| self.denormalizer.denormalize(&normalized));

        TargetFields {
            project,
            client_id: self.clients.id_by_name(&client_name),
            ..TargetFields::default()
        }
    }
}

/// プロジェクト名を正規化する。
///
/// 英字は小文字化し、英字以外の文字は`_`へ置き換える。
pub fn normalize_project_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
