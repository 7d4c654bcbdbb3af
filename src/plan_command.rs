use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use log::info;

use crate::config::SourceConfig;
use crate::datetime::parse_date;
use crate::directory::{ConfigDirectory, CONFIG_ISSUE_HANDLER};
use crate::resolver::{IssueSourceRegistry, TargetResolver};
use crate::sync::{PushOutcome, SyncOrchestrator, TimeEntryStore};
use crate::toggl::TogglRepository;

/// 1日分の作業記録の同期内容を出力するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct PlanArgs {
    #[clap(
        short = 'd',
        long = "date",
        help = "Sets a custom date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    date: Option<NaiveDate>,
}

pub struct PlanCommand<'a, T: TogglRepository, S: TimeEntryStore> {
    toggl_client: &'a T,
    config: &'a SourceConfig,
    store: &'a S,
}

impl<'a, T: TogglRepository, S: TimeEntryStore> PlanCommand<'a, T, S> {
    /// 新しい`PlanCommand`を返す。
    ///
    /// # Arguments
    /// * `toggl_client` - Toggl APIと通信するためのリポジトリ
    /// * `config` - 同期対象のデータソース設定
    /// * `store` - 書き込み先の`TimeEntryStore`
    pub fn new(toggl_client: &'a T, config: &'a SourceConfig, store: &'a S) -> Self {
        Self {
            toggl_client,
            config,
            store,
        }
    }

    /// `plan`サブコマンドの処理を行う。
    ///
    /// Localタイムゾーンで指定された日付の作業記録を取得し、
    /// 1件ずつ分割・配分・解決して`store`へ送る。
    /// 日付が指定されていない場合は、Localタイムゾーンで現在の日付を利用する。
    pub async fn run(&self, args: PlanArgs) -> Result<Vec<PushOutcome>> {
        let date = args.date.unwrap_or_else(|| Local::now().date_naive());
        info!("Date: {}", date);

        let entries = self
            .toggl_client
            .read_detailed_entries(&date, &date)
            .await
            .context("Failed to retrieve time entries")?;

        let directory = ConfigDirectory::new(self.config);
        let mut registry = IssueSourceRegistry::new();
        if self.config.issue_handler.as_deref() == Some(CONFIG_ISSUE_HANDLER) {
            registry.register(self.config.source_id, &directory);
        }
        let resolver = TargetResolver::new(
            &self.config.projects,
            &directory,
            &directory,
            &directory,
            registry.source_for(self.config.source_id),
        );
        let orchestrator = SyncOrchestrator::new(
            self.config,
            &directory,
            &directory,
            resolver,
            self.store,
            self.config.tz_offset()?,
        );

        let mut outcomes = Vec::new();
        for entry in &entries {
            let outcome = orchestrator
                .push(entry)
                .with_context(|| format!("Failed to push entry {}", entry.id))?;
            outcomes.push(outcome);
        }

        let upserted = outcomes
            .iter()
            .filter(|o| matches!(o, PushOutcome::Upserted))
            .count();
        let replaced = outcomes
            .iter()
            .filter(|o| matches!(o, PushOutcome::Replaced(_)))
            .count();
        let skipped = outcomes
            .iter()
            .filter(|o| matches!(o, PushOutcome::SkippedUnmappedUser))
            .count();
        info!(
            "Planned operations: {} upserted, {} replaced, {} skipped",
            upserted, replaced, skipped
        );

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::PlanArgs;
    use super::PlanCommand;
    use crate::config::SourceConfig;
    use crate::sync::{MockTimeEntryStore, PushOutcome};
    use crate::time_entry::RawEntry;
    use crate::toggl::MockTogglRepository;

    /// テスト用の設定を作成する。
    fn dummy_config() -> SourceConfig {
        serde_json::from_str(
            r#"{
                "source_id": 1,
                "workspace_id": 42,
                "issue_handler": "config",
                "default_client": "Acme",
                "users": [{"uid": 9, "user_id": 10}],
                "clients": [{"name": "Acme", "id": 42}],
                "issues": [
                    {"id": 123, "project": "Website", "client_id": 7},
                    {"id": 456, "project": "Backend", "client_id": 7}
                ]
            }"#,
        )
        .unwrap()
    }

    /// テスト用にダミーのRawEntryを作成する。
    fn dummy_entry(uid: i64, description: &str, dur: i64) -> RawEntry {
        RawEntry {
            id: 101,
            project: None,
            description: description.to_string(),
            dur,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            end: None,
            uid,
            client: None,
        }
    }

    /// 複数fragmentの作業記録がreplace_allされることを確認する。
    #[tokio::test]
    async fn test_plan_command_replaces_multi_fragment_entry() {
        let config = dummy_config();
        let mut toggl = MockTogglRepository::new();
        toggl
            .expect_read_detailed_entries()
            .times(1)
            .returning(|_, _| Ok(vec![dummy_entry(9, "#123 fix @2 #456 review", 7_200_000)]));
        let mut store = MockTimeEntryStore::new();
        store
            .expect_replace_all()
            .times(1)
            .withf(|_, _, params| {
                params.len() == 2
                    && params[0].target.issue_id == Some(123)
                    && params[1].target.issue_id == Some(456)
            })
            .returning(|_, _, _| Ok(()));
        store.expect_create_or_update().times(0);

        let command = PlanCommand::new(&toggl, &config, &store);
        let outcomes = command.run(PlanArgs { date: None }).await.unwrap();

        assert_eq!(outcomes, vec![PushOutcome::Replaced(2)]);
    }

    /// マッピングのないユーザーの作業記録が読み飛ばされることを確認する。
    #[tokio::test]
    async fn test_plan_command_skips_unmapped_user() {
        let config = dummy_config();
        let mut toggl = MockTogglRepository::new();
        toggl
            .expect_read_detailed_entries()
            .times(1)
            .returning(|_, _| Ok(vec![dummy_entry(999, "plain work", 3_600_000)]));
        let mut store = MockTimeEntryStore::new();
        store.expect_create_or_update().times(0);
        store.expect_replace_all().times(0);

        let command = PlanCommand::new(&toggl, &config, &store);
        let outcomes = command.run(PlanArgs { date: None }).await.unwrap();

        assert_eq!(outcomes, vec![PushOutcome::SkippedUnmappedUser]);
    }

    /// issue_handlerが未設定の場合は数値tagがissueとして解決されないことを確認する。
    #[tokio::test]
    async fn test_plan_command_without_issue_handler() {
        let mut config = dummy_config();
        config.issue_handler = None;
        let mut toggl = MockTogglRepository::new();
        toggl
            .expect_read_detailed_entries()
            .times(1)
            .returning(|_, _| Ok(vec![dummy_entry(9, "#123 fix", 3_600_000)]));
        let mut store = MockTimeEntryStore::new();
        store
            .expect_create_or_update()
            .times(1)
            .withf(|_, _, params| params.target.issue_id.is_none())
            .returning(|_, _, _| Ok(()));

        let command = PlanCommand::new(&toggl, &config, &store);
        let outcomes = command.run(PlanArgs { date: None }).await.unwrap();

        assert_eq!(outcomes, vec![PushOutcome::Upserted]);
    }
}
