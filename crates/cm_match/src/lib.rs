// crates/cm_match/src/lib.rs

//! CartaMatch 匹配引擎
//!
//! 把源图层切成要素段任务，分发给固定数量的工作线程做空间叠加
//! 匹配，再把各任务的部分结果合并成全局结果。工作线程的日志经
//! 共享通道汇聚到单一输出。
//!
//! # 模块
//!
//! - `partition`: 任务划分（块大小与任务数）
//! - `worker`: 单任务执行（清理、重投影、索引查询、度量）
//! - `dispatch`: 工作线程池与任务派发
//! - `aggregate`: 部分结果合并与进度上报
//! - `logsink`: 跨线程日志汇聚
//! - `error`: 引擎错误类型
//!
//! # 示例
//!
//! ```
//! use cm_geo::crs::Crs;
//! use cm_map::{Feature, FeatureCollection, InMemorySource};
//! use cm_match::{MatchMaker, MatchOptions};
//! use geo::polygon;
//! use std::sync::Arc;
//!
//! fn square(x0: f64) -> Feature {
//!     Feature::new(polygon![
//!         (x: x0, y: 0.0),
//!         (x: x0 + 1.0, y: 0.0),
//!         (x: x0 + 1.0, y: 1.0),
//!         (x: x0, y: 1.0),
//!         (x: x0, y: 0.0),
//!     ].into())
//! }
//!
//! let source = Arc::new(InMemorySource::new(
//!     FeatureCollection::new(vec![square(0.0)], Crs::web_mercator()).unwrap(),
//! ));
//! let target = Arc::new(InMemorySource::new(
//!     FeatureCollection::new(vec![square(0.5)], Crs::web_mercator()).unwrap(),
//! ));
//!
//! let result = MatchMaker::intersect(source, target, MatchOptions::default()).unwrap();
//! assert!((result[&(0, 0)] - 0.5).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod aggregate;
pub mod dispatch;
pub mod error;
pub mod logsink;
pub mod partition;
pub mod worker;

pub use aggregate::{GlobalResult, NoopObserver, ProgressObserver};
pub use dispatch::DispatchConfig;
pub use error::{MatchError, MatchResult};
pub use logsink::{LogChannel, LogListener, LogRecord, Severity};
pub use worker::{JobOutput, MatchJob, MatchMode, PartialResult};

use aggregate::Aggregator;
use cm_geo::geometry::GeometryKind;
use cm_map::{FeatureId, MapRef};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// 一轮匹配的选项
pub struct MatchOptions {
    /// 参与匹配的源要素索引 (`None`=全部；空列表=零任务)
    pub ids: Option<Vec<FeatureId>>,
    /// 工作线程数 (0=自动)
    pub worker_count: usize,
    /// 工作线程日志目录 (`None`=丢弃日志)
    pub log_dir: Option<PathBuf>,
    /// 进度回调
    pub observer: Option<Box<dyn ProgressObserver>>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            ids: None,
            worker_count: 0,
            log_dir: None,
            observer: None,
        }
    }
}

impl MatchOptions {
    /// 限定参与的源要素索引
    #[must_use]
    pub fn with_ids(mut self, ids: Vec<FeatureId>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// 设置工作线程数
    #[must_use]
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// 设置日志目录
    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// 设置进度回调
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// 匹配引擎入口
///
/// 三个操作共用同一条流水线：校验、划分、派发、聚合。
pub struct MatchMaker;

impl MatchMaker {
    /// 源图层与面状目标图层的成对相交度量
    ///
    /// 结果键为 (源索引, 目标索引)，值为相交量（点计数 / 线长度
    /// / 面面积，工作投影单位）。无有效相交的对不出现。
    ///
    /// # Errors
    /// 目标图层不是面类型时在派发前返回 `MatchError::Validation`
    pub fn intersect(
        source: MapRef,
        target: MapRef,
        options: MatchOptions,
    ) -> MatchResult<HashMap<(FeatureId, FeatureId), f64>> {
        Self::run_pairwise(source, target, MatchMode::Intersection, options)
    }

    /// 成对相交度量按源要素自身度量归一（份额）
    ///
    /// 每个源要素在各目标上的份额位于 0..=1，完整覆盖时合计约 1。
    pub fn allocate(
        source: MapRef,
        target: MapRef,
        options: MatchOptions,
    ) -> MatchResult<HashMap<(FeatureId, FeatureId), f64>> {
        Self::run_pairwise(source, target, MatchMode::Allocation, options)
    }

    /// 单图层逐要素自身度量
    ///
    /// 地理坐标图层换算到等积投影后度量（米/平方米）；已投影
    /// 图层按原投影单位度量。
    pub fn measure_all(
        source: MapRef,
        options: MatchOptions,
    ) -> MatchResult<HashMap<FeatureId, f64>> {
        let info = source.describe()?;
        let ids = resolve_ids(options.ids, info.size)?;
        let total = ids.len();

        tracing::info!("measuring {} of {} features", total, info.size);

        let jobs = build_jobs(ids, MatchMode::Measure, &source, None);
        let aggregator = Aggregator::per_feature(
            total,
            options.observer.unwrap_or_else(|| Box::new(NoopObserver)),
        );
        let result = run_round(jobs, options.worker_count, options.log_dir, aggregator)?;
        match result {
            GlobalResult::PerFeature(map) => Ok(map),
            GlobalResult::Pairwise(_) => {
                Err(MatchError::internal("unexpected pairwise result"))
            }
        }
    }

    fn run_pairwise(
        source: MapRef,
        target: MapRef,
        mode: MatchMode,
        options: MatchOptions,
    ) -> MatchResult<HashMap<(FeatureId, FeatureId), f64>> {
        // 目标图层类型在派发任何任务前校验
        let target_info = target.describe()?;
        if target_info.kind != GeometryKind::Polygon {
            return Err(MatchError::validation(format!(
                "target map must contain polygons, got {}",
                target_info.kind
            )));
        }

        let source_info = source.describe()?;
        let ids = resolve_ids(options.ids, source_info.size)?;
        let total = ids.len();

        tracing::info!(
            "matching {} of {} features against {} target polygons",
            total,
            source_info.size,
            target_info.size
        );

        let jobs = build_jobs(ids, mode, &source, Some(&target));
        let aggregator = Aggregator::pairwise(
            total,
            options.observer.unwrap_or_else(|| Box::new(NoopObserver)),
        );
        let result = run_round(jobs, options.worker_count, options.log_dir, aggregator)?;
        match result {
            GlobalResult::Pairwise(map) => Ok(map),
            GlobalResult::PerFeature(_) => {
                Err(MatchError::internal("unexpected per-feature result"))
            }
        }
    }
}

/// 解析并校验参与的要素索引
fn resolve_ids(ids: Option<Vec<FeatureId>>, size: usize) -> MatchResult<Vec<FeatureId>> {
    match ids {
        Some(ids) => {
            if let Some(&bad) = ids.iter().find(|&&id| id >= size) {
                return Err(MatchError::validation(format!(
                    "feature id {bad} out of range 0..{size}"
                )));
            }
            Ok(ids)
        }
        None => Ok((0..size).collect()),
    }
}

/// 按划分规则切出任务列表
fn build_jobs(
    ids: Vec<FeatureId>,
    mode: MatchMode,
    source: &MapRef,
    target: Option<&MapRef>,
) -> Vec<MatchJob> {
    let (chunk, _) = partition::partition(ids.len());
    partition::split(&ids, chunk)
        .into_iter()
        .enumerate()
        .map(|(job_id, ids)| MatchJob {
            job_id,
            ids,
            mode,
            source: Arc::clone(source),
            target: target.map(Arc::clone),
        })
        .collect()
}

/// 执行一轮：启动日志汇聚、派发任务、合并输出、收尾
fn run_round(
    jobs: Vec<MatchJob>,
    worker_count: usize,
    log_dir: Option<PathBuf>,
    mut aggregator: Aggregator,
) -> MatchResult<GlobalResult> {
    let sink: Box<dyn io::Write + Send> = match &log_dir {
        Some(dir) => logsink::file_sink(dir)?.0,
        None => Box::new(io::sink()),
    };
    let (channel, listener) = LogListener::start(sink)?;

    let mut merge_error: Option<MatchError> = None;
    let run_result = dispatch::run_jobs(
        jobs,
        &DispatchConfig { worker_count },
        &channel,
        |output| {
            if merge_error.is_none() {
                if let Err(e) = aggregator.absorb(output) {
                    merge_error = Some(e);
                }
            }
        },
    );

    // 发送端全部释放后监听线程才会排空退出
    drop(channel);
    listener.stop();

    run_result?;
    if let Some(e) = merge_error {
        return Err(e);
    }
    Ok(aggregator.finish())
}
