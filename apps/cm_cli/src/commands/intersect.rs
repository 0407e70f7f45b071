// apps/cm_cli/src/commands/intersect.rs

//! 成对相交匹配命令
//!
//! 把源图层与面状目标图层做空间匹配，输出
//! `[源索引, 目标索引, 度量]` 三元组数组。

use anyhow::{Context, Result};
use clap::Args;
use cm_map::{GeoJsonSource, MapRef};
use cm_match::{MatchMaker, MatchOptions, ProgressObserver};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// 成对相交匹配参数
#[derive(Args)]
pub struct IntersectArgs {
    /// 源图层 GeoJSON 文件
    #[arg(short, long)]
    pub from: PathBuf,

    /// 目标图层 GeoJSON 文件（必须是面）
    #[arg(short, long)]
    pub to: PathBuf,

    /// 输出文件（缺省写标准输出）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 工作线程数 (0=自动)
    #[arg(short, long, default_value = "0")]
    pub workers: usize,

    /// 工作线程日志目录
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// 按源要素自身度量归一（输出份额而非绝对量）
    #[arg(long)]
    pub allocate: bool,
}

/// 进度打点：每完成约一成上报一次
struct LogProgress {
    last_decile: usize,
}

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, processed: usize, total: usize) {
        if total == 0 {
            return;
        }
        let decile = processed * 10 / total;
        if decile > self.last_decile {
            self.last_decile = decile;
            info!("进度: {}/{} 要素", processed, total);
        }
    }
}

/// 执行匹配命令
pub fn execute(args: IntersectArgs) -> Result<()> {
    let source: MapRef = Arc::new(GeoJsonSource::new(&args.from));
    let target: MapRef = Arc::new(GeoJsonSource::new(&args.to));

    let mut options = MatchOptions::default()
        .with_workers(args.workers)
        .with_observer(Box::new(LogProgress { last_decile: 0 }));
    if let Some(dir) = &args.log_dir {
        options = options.with_log_dir(dir);
    }

    info!(
        "匹配 {} -> {}",
        args.from.display(),
        args.to.display()
    );
    let start = Instant::now();

    let result = if args.allocate {
        MatchMaker::allocate(source, target, options)
    } else {
        MatchMaker::intersect(source, target, options)
    }
    .context("匹配失败")?;

    info!(
        "完成: {} 对, 耗时 {:.2} s",
        result.len(),
        start.elapsed().as_secs_f64()
    );

    // 按 (源, 目标) 排序保证输出稳定
    let mut triples: Vec<_> = result.into_iter().collect();
    triples.sort_by_key(|&(key, _)| key);
    let rows: Vec<_> = triples
        .into_iter()
        .map(|((from_id, to_id), measure)| json!([from_id, to_id, measure]))
        .collect();

    super::write_json(&json!(rows), args.output.as_deref())
}
