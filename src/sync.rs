use anyhow::{Context, Result};
use chrono::FixedOffset;
use log::info;
#[cfg(test)]
use mockall::automock;

use crate::allocation::allocate;
use crate::config::SourceConfig;
use crate::datetime::spent_on;
use crate::description::parse_description;
use crate::resolver::{ClientDirectory, TargetResolver};
use crate::time_entry::{Allocation, RawEntry, ResolvedParams};

/// 外部サービスのユーザーIDを内部ユーザーIDへ解決するためのtrait。
#[cfg_attr(test, automock)]
pub trait UserAccountMapper {
    fn resolve(&self, source_id: i64, external_uid: i64) -> Option<i64>;
}

/// time entryの永続化先を表すtrait。
///
/// `replace_all`は(external_id, source_id)に対する既存レコードの削除と
/// 新しいレコード一式の挿入をひとつのトランザクションとして扱うこと。
#[cfg_attr(test, automock)]
pub trait TimeEntryStore {
    /// (external_id, source_id)をキーとして、なければ作成、あれば更新する。
    fn create_or_update(
        &self,
        external_id: i64,
        source_id: i64,
        params: &ResolvedParams,
    ) -> Result<()>;

    /// (external_id, source_id)の既存レコードをすべて削除して入れ替える。
    fn replace_all(
        &self,
        external_id: i64,
        source_id: i64,
        params: &[ResolvedParams],
    ) -> Result<()>;
}

/// 1件のRawEntryに対する同期結果。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// ユーザーのマッピングが見つからず、何も書き込まなかった。
    SkippedUnmappedUser,
    /// 1件のレコードをcreate_or_updateで書き込んだ。
    Upserted,
    /// 指定件数のレコードをreplace_allで入れ替えた。
    Replaced(usize),
}

/// 1件のRawEntryを分割・配分・解決して永続化先へ送る。
pub struct SyncOrchestrator<'a> {
    config: &'a SourceConfig,
    users: &'a dyn UserAccountMapper,
    clients: &'a dyn ClientDirectory,
    resolver: TargetResolver<'a>,
    store: &'a dyn TimeEntryStore,
    tz_offset: FixedOffset,
}

impl<'a> SyncOrchestrator<'a> {
    /// 新しい`SyncOrchestrator`を返す。
    pub fn new(
        config: &'a SourceConfig,
        users: &'a dyn UserAccountMapper,
        clients: &'a dyn ClientDirectory,
        resolver: TargetResolver<'a>,
        store: &'a dyn TimeEntryStore,
        tz_offset: FixedOffset,
    ) -> Self {
        Self {
            config,
            users,
            clients,
            resolver,
            store,
            tz_offset,
        }
    }

    /// 1件のRawEntryを同期する。
    ///
    /// fragmentが1つの場合はcreate_or_update、複数の場合はreplace_allを利用する。
    /// ユーザーのマッピングが見つからない場合はエラーにせず、何も書き込まない。
    pub fn push(&self, entry: &RawEntry) -> Result<PushOutcome> {
        let user_id = match self.users.resolve(self.config.source_id, entry.uid) {
            Some(user_id) => user_id,
            None => {
                info!("No user mapping for uid {}, skipping entry {}", entry.uid, entry.id);
                return Ok(PushOutcome::SkippedUnmappedUser);
            }
        };

        let default_client_id = entry
            .client
            .as_deref()
            .or(self.config.default_client.as_deref())
            .and_then(|name| self.clients.id_by_name(name));
        let date = spent_on(&entry.start, &self.tz_offset);

        let fragments = parse_description(&entry.description);
        let allocations: Vec<Allocation> = allocate(&fragments, entry.total_hours())
            .into_iter()
            .map(|(comment, hours)| Allocation {
                target: self.resolver.resolve(&comment, entry, default_client_id),
                comment,
                hours,
            })
            .collect();
        let params: Vec<ResolvedParams> = allocations
            .into_iter()
            .map(|allocation| ResolvedParams {
                external_id: entry.id,
                data_source_id: self.config.source_id,
                user_id,
                spent_on: date,
                hours: allocation.hours,
                comment: allocation.comment,
                target: allocation.target,
            })
            .collect();

        if params.len() == 1 {
            self.store
                .create_or_update(entry.id, self.config.source_id, &params[0])
                .with_context(|| format!("Failed to upsert time entry for record {}", entry.id))?;

            Ok(PushOutcome::Upserted)
        } else {
            self.store
                .replace_all(entry.id, self.config.source_id, &params)
                .with_context(|| {
                    format!("Failed to replace time entries for record {}", entry.id)
                })?;

            Ok(PushOutcome::Replaced(params.len()))
        }
    }
}
