use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use log::info;

use crate::datetime::parse_date;
use crate::time_entry::RawEntry;
use crate::toggl::TogglRepository;

/// 1日分の作業記録を表示するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct ShowArgs {
    #[clap(
        short = 'd',
        long = "date",
        help = "Sets a custom date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    date: Option<NaiveDate>,
}

pub struct ShowCommand<'a, T: TogglRepository> {
    toggl_client: &'a T,
}

impl<'a, T: TogglRepository> ShowCommand<'a, T> {
    /// 新しい`ShowCommand`を返す。
    ///
    /// # Arguments
    /// * `toggl_client` - Toggl APIと通信するためのリポジトリ
    pub fn new(toggl_client: &'a T) -> Self {
        Self { toggl_client }
    }

    /// `show`サブコマンドの処理を行う。
    ///
    /// Localタイムゾーンで指定された日付の作業記録を取得する。
    /// 日付が指定されていない場合は、Localタイムゾーンで現在の日付を利用する。
    ///
    /// # Arguments
    ///
    /// * `args` - `show`サブコマンドの引数
    pub async fn run(&self, args: ShowArgs) -> Result<Vec<RawEntry>> {
        let date = args.date.unwrap_or_else(|| Local::now().date_naive());
        info!("Date: {}", date);

        let time_entries = self
            .toggl_client
            .read_detailed_entries(&date, &date)
            .await
            .context("Failed to retrieve time entries")?;
        info!("Time entries retrieved successfully.");

        Ok(time_entries)
    }
}
