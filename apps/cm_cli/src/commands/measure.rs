// apps/cm_cli/src/commands/measure.rs

//! 逐要素度量命令
//!
//! 输出 `[索引, 度量]` 对数组。地理坐标图层先换算到等积投影。

use anyhow::{Context, Result};
use clap::Args;
use cm_map::{GeoJsonSource, MapRef};
use cm_match::{MatchMaker, MatchOptions};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// 逐要素度量参数
#[derive(Args)]
pub struct MeasureArgs {
    /// 图层 GeoJSON 文件
    #[arg(short, long)]
    pub map: PathBuf,

    /// 输出文件（缺省写标准输出）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 工作线程数 (0=自动)
    #[arg(short, long, default_value = "0")]
    pub workers: usize,
}

/// 执行度量命令
pub fn execute(args: MeasureArgs) -> Result<()> {
    let source: MapRef = Arc::new(GeoJsonSource::new(&args.map));
    let options = MatchOptions::default().with_workers(args.workers);

    info!("度量 {}", args.map.display());
    let result = MatchMaker::measure_all(source, options).context("度量失败")?;
    info!("完成: {} 个要素", result.len());

    let mut rows: Vec<_> = result.into_iter().collect();
    rows.sort_by_key(|&(id, _)| id);
    let rows: Vec<_> = rows
        .into_iter()
        .map(|(id, measure)| json!([id, measure]))
        .collect();

    super::write_json(&json!(rows), args.output.as_deref())
}
