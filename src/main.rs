use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod allocation;
mod config;
mod console;
mod datetime;
mod description;
mod directory;
mod plan_command;
mod resolver;
mod show_command;
mod sync;
mod time_entry;
mod toggl;

use config::SourceConfig;
use console::{ConsoleMarkdownList, ConsolePresenter, ConsoleStore};
use plan_command::{PlanArgs, PlanCommand};
use show_command::{ShowArgs, ShowCommand};
use toggl::TogglReportsClient;

/// Togglの作業記録をtimesheetへ同期するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- show
/// $ cargo run -- plan -d 2024-01-01
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(
        short = 'c',
        long = "config",
        help = "Sets a custom config file path",
        global = true
    )]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    Show(ShowArgs),
    Plan(PlanArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger().context("Failed to initialize logger")?;

    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => config::default_path()?,
    };
    let config = SourceConfig::load(&config_path)?;
    let toggl_client = TogglReportsClient::new(config.workspace_id)
        .context("Failed to new toggl reports client")?;

    match args.subcommand {
        SubCommands::Show(show) => {
            let entries = ShowCommand::new(&toggl_client).run(show).await?;
            let mut stdout = std::io::stdout();
            ConsoleMarkdownList::new(&mut stdout).show_time_entries(&entries)?;
        }
        SubCommands::Plan(plan) => {
            let store = ConsoleStore;
            PlanCommand::new(&toggl_client, &config, &store)
                .run(plan)
                .await?;
        }
    }

    Ok(())
}

/// ログ出力を初期化する。
///
/// ログレベルは環境変数`RUST_LOG`で変更できる。
fn setup_logger() -> Result<()> {
    let level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let colors = fern::colors::ColoredLevelConfig::new();

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}
