use std::io::Write;

use anyhow::{Context, Result};
use chrono::Local;

use crate::sync::TimeEntryStore;
use crate::time_entry::{RawEntry, ResolvedParams};

/// Consoleに作業記録を表示するためのtrait。
pub trait ConsolePresenter {
    /// 作業記録を表示する。
    ///
    /// # Arguments
    ///
    /// * `time_entries` - 表示する作業記録
    fn show_time_entries(&mut self, time_entries: &[RawEntry]) -> Result<()>;
}

/// 作業記録をMarkdownのlist形式で表示する。
pub struct ConsoleMarkdownList<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleMarkdownList<'a, W> {
    /// 新しい`ConsoleMarkdownList`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdownList<'a, W> {
    // 作業記録をlist形式で表示する。
    fn show_time_entries(&mut self, time_entries: &[RawEntry]) -> Result<()> {
        let mut sorted_entries = time_entries.to_vec();
        sorted_entries.sort_by_key(|entry| entry.start);

        for entry in sorted_entries {
            let start_str = entry
                .start
                .with_timezone(&Local)
                .format("%H:%M")
                .to_string();
            let end_str = entry
                .end
                .map(|end| end.with_timezone(&Local).format("%H:%M").to_string())
                .unwrap_or_else(|| "now".to_string());
            let project_str = entry
                .project
                .clone()
                .unwrap_or_else(|| "(no project)".to_string());
            writeln!(
                self.writer,
                "- {} ~ {}: {} [{}] {:.2}h",
                start_str,
                end_str,
                entry.description,
                project_str,
                entry.total_hours()
            )
            .with_context(|| format!("Failed to write time entry: {:?}", entry))?;
        }

        Ok(())
    }
}

/// 書き込み予定の操作をconsoleへ出力する`TimeEntryStore`。
///
/// `plan`サブコマンドで実際の永続化先の代わりに利用する。
pub struct ConsoleStore;

impl TimeEntryStore for ConsoleStore {
    fn create_or_update(
        &self,
        external_id: i64,
        source_id: i64,
        params: &ResolvedParams,
    ) -> Result<()> {
        println!(
            "upsert {}/{}: {}",
            source_id,
            external_id,
            serde_json::to_string(params).context("Failed to serialize params")?
        );

        Ok(())
    }

    fn replace_all(
        &self,
        external_id: i64,
        source_id: i64,
        params: &[ResolvedParams],
    ) -> Result<()> {
        println!("replace {}/{}: {} records", source_id, external_id, params.len());
        for param in params {
            println!(
                "  {}",
                serde_json::to_string(param).context("Failed to serialize params")?
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone, Utc};
    use rstest::rstest;

    use super::ConsoleMarkdownList;
    use super::ConsolePresenter;
    use crate::time_entry::RawEntry;

    /// 正常系のテスト。
    #[rstest]
    #[case::no_entry(&[], "")]
    #[case::single(
        &[dummy_entry(1)],
        &expected_output(&dummy_entry(1)),
    )]
    #[case::no_end(
        &[dummy_entry(3)],
        &expected_output(&dummy_entry(3)),
    )]
    #[case::sort_with_start_time(
        &[dummy_entry(2), dummy_entry(1)],
        &[expected_output(&dummy_entry(1)), expected_output(&dummy_entry(2))].join(""),
    )]
    fn test_show_time_entries(#[case] input: &[RawEntry], #[case] expected: &str) {
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        presenter.show_time_entries(input).unwrap();

        assert_eq!(String::from_utf8(writer).unwrap(), expected);
    }

    /// テスト用にダミーのRawEntryを作成する。
    fn dummy_entry(pattern: u8) -> RawEntry {
        match pattern {
            1 => RawEntry {
                id: 1,
                project: Some("Website".to_string()),
                description: "entry1".to_string(),
                dur: 3_600_000,
                start: Utc.with_ymd_and_hms(2021, 1, 1, 1, 0, 0).unwrap(),
                end: Some(Utc.with_ymd_and_hms(2021, 1, 1, 2, 0, 0).unwrap()),
                uid: 9,
                client: None,
            },
            2 => RawEntry {
                id: 2,
                project: None,
                description: "entry2".to_string(),
                dur: 3_600_000,
                start: Utc.with_ymd_and_hms(2021, 1, 1, 3, 0, 0).unwrap(),
                end: Some(Utc.with_ymd_and_hms(2021, 1, 1, 4, 0, 0).unwrap()),
                uid: 9,
                client: None,
            },
            3 => RawEntry {
                id: 3,
                project: None,
                description: "entry3".to_string(),
                dur: 1_800_000,
                start: Utc.with_ymd_and_hms(2021, 1, 1, 5, 0, 0).unwrap(),
                end: None,
                uid: 9,
                client: None,
            },
            _ => panic!("Invalid pattern: {}", pattern),
        }
    }

    /// テスト用に出力の1作業記録に対する期待値の文字列を作成する。
    fn expected_output(entry: &RawEntry) -> String {
        let start_str = entry
            .start
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string();
        let end_str = entry
            .end
            .map(|end| end.with_timezone(&Local).format("%H:%M").to_string())
            .unwrap_or_else(|| "now".to_string());
        let project_str = entry
            .project
            .clone()
            .unwrap_or_else(|| "(no project)".to_string());
        format!(
            "- {} ~ {}: {} [{}] {:.2}h\n",
            start_str,
            end_str,
            entry.description,
            project_str,
            entry.total_hours()
        )
    }
}
