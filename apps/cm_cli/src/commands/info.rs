// apps/cm_cli/src/commands/info.rs

//! 图层信息命令

use anyhow::{Context, Result};
use clap::Args;
use cm_map::{GeoJsonSource, MapProvider};
use cm_match::partition;
use std::path::PathBuf;

/// 图层信息参数
#[derive(Args)]
pub struct InfoArgs {
    /// 图层 GeoJSON 文件
    #[arg(short, long)]
    pub map: PathBuf,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let source = GeoJsonSource::new(&args.map);
    let info = source.describe().context("读取图层失败")?;
    let (chunk, jobs) = partition::partition(info.size);

    println!("=== 图层信息 ===");
    println!("文件: {}", args.map.display());
    println!("要素数: {}", info.size);
    println!("几何种类: {}", info.kind);
    println!("坐标系: {}", info.crs);
    println!("任务划分: {} 个任务, 每任务 {} 要素", jobs, chunk);

    Ok(())
}
