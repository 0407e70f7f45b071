// apps/cm_cli/src/main.rs

//! CartaMatch 命令行界面
//!
//! 提供 GeoJSON 图层空间匹配的命令行工具。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// CartaMatch 空间匹配命令行工具
#[derive(Parser)]
#[command(name = "cm_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CartaMatch spatial overlap matching", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 两图层成对相交匹配
    Intersect(commands::intersect::IntersectArgs),
    /// 单图层逐要素度量
    Measure(commands::measure::MeasureArgs),
    /// 显示图层信息
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Intersect(args) => commands::intersect::execute(args),
        Commands::Measure(args) => commands::measure::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}
