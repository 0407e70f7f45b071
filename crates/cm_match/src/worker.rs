// crates/cm_match/src/worker.rs

//! 单任务执行
//!
//! 一个任务处理源图层的一段要素索引：逐要素清理、换算到工作投影、
//! 经空间索引找出候选目标、计算相交度量。可恢复的拓扑错误只跳过
//! 当前要素并留下警告记录，其余错误使任务失败。

use crate::error::{MatchError, MatchResult};
use crate::logsink::LogChannel;
use cm_geo::clean::clean;
use cm_geo::crs::Crs;
use cm_geo::error::GeoResult;
use cm_geo::geometry::{self, GeometryKind};
use cm_geo::overlap::{area_or_length, intersection_measure, MEASURE_EPSILON};
use cm_geo::transform::{reproject, to_equal_area};
use cm_map::{Feature, FeatureCollection, FeatureId, MapRef};
use geo::Geometry;
use std::collections::HashMap;

/// 匹配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// 成对相交度量（点计数 / 线长度 / 面面积）
    Intersection,
    /// 成对相交度量按源要素自身度量归一（份额，0..=1）
    Allocation,
    /// 单图层逐要素自身度量
    Measure,
}

/// 一个工作单元
///
/// `target` 在 [`MatchMode::Measure`] 下为 `None`。
#[derive(Clone)]
pub struct MatchJob {
    /// 任务编号（0 起连续）
    pub job_id: usize,
    /// 本任务负责的源要素索引
    pub ids: Vec<FeatureId>,
    /// 匹配模式
    pub mode: MatchMode,
    /// 源图层
    pub source: MapRef,
    /// 目标图层
    pub target: Option<MapRef>,
}

/// 任务的部分结果
#[derive(Debug, Clone)]
pub enum PartialResult {
    /// (源索引, 目标索引) -> 度量
    Pairwise(HashMap<(FeatureId, FeatureId), f64>),
    /// 源索引 -> 度量
    PerFeature(HashMap<FeatureId, f64>),
}

/// 任务输出
#[derive(Debug, Clone)]
pub struct JobOutput {
    /// 任务编号
    pub job_id: usize,
    /// 已处理要素数（含跳过的要素）
    pub processed: usize,
    /// 部分结果
    pub partial: PartialResult,
}

/// 执行一个任务
///
/// # Errors
/// 不可恢复的几何错误、图层访问错误或目标图层类型不符时失败；
/// 单要素拓扑错误不算失败。
pub fn run_job(job: &MatchJob, log: &LogChannel) -> MatchResult<JobOutput> {
    match job.mode {
        MatchMode::Measure => run_measure(job, log),
        MatchMode::Intersection | MatchMode::Allocation => run_overlay(job, log),
    }
}

/// 清理要素几何，拓扑错误降级为跳过
fn clean_or_skip(
    geom: &Geometry<f64>,
    id: FeatureId,
    context: &str,
    log: &LogChannel,
) -> MatchResult<Option<Geometry<f64>>> {
    match clean(geom) {
        Ok(g) => Ok(Some(g)),
        Err(e) if e.is_recoverable() => {
            log.warn(context, format!("skipping feature {id}: {e}"));
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn run_measure(job: &MatchJob, log: &LogChannel) -> MatchResult<JobOutput> {
    let context = format!("job-{}", job.job_id);
    log.info(
        &context,
        format!("measuring {} features", job.ids.len()),
    );

    let source = job.source.load()?;
    log.info(
        &context,
        format!("loaded source map: {} features", source.size()),
    );
    let kind = source.kind();
    let src_crs = source.crs();

    let mut values = HashMap::new();
    let mut processed = 0usize;
    for &id in &job.ids {
        let feature = source.get(id)?;
        processed += 1;
        let Some(geom) = clean_or_skip(&feature.geometry, id, &context, log)? else {
            continue;
        };
        let geom = to_equal_area(&geom, &src_crs)?;
        values.insert(id, area_or_length(&geom, kind)?);
    }

    Ok(JobOutput {
        job_id: job.job_id,
        processed,
        partial: PartialResult::PerFeature(values),
    })
}

fn run_overlay(job: &MatchJob, log: &LogChannel) -> MatchResult<JobOutput> {
    let context = format!("job-{}", job.job_id);
    log.info(
        &context,
        format!("matching {} features", job.ids.len()),
    );
    let target_ref = job
        .target
        .as_ref()
        .ok_or_else(|| MatchError::internal("overlay job without target map"))?;

    let target = target_ref.load()?;
    log.info(
        &context,
        format!("loaded target map: {} features", target.size()),
    );
    if target.kind() != GeometryKind::Polygon {
        return Err(MatchError::validation(format!(
            "target map must contain polygons, got {}",
            target.kind()
        )));
    }
    let source = job.source.load()?;
    log.info(
        &context,
        format!("loaded source map: {} features", source.size()),
    );
    let kind = source.kind();
    let src_crs = source.crs();
    let tgt_crs = target.crs();

    // 工作投影：目标为地理坐标时换到等积投影，否则沿用目标投影
    let work_crs = if tgt_crs.is_geographic() {
        Crs::mollweide()
    } else {
        tgt_crs
    };

    // 目标图层换算到工作投影，重建为同投影的工作副本并建包围盒索引
    let mut work_features = Vec::with_capacity(target.size());
    for (_, feature) in target.iter() {
        work_features.push(Feature::new(reproject(
            &feature.geometry,
            &tgt_crs,
            &work_crs,
        )?));
    }
    let target_work = FeatureCollection::new(work_features, work_crs)?;
    let index = target_work.build_spatial_index();

    let mut pairs = HashMap::new();
    let mut processed = 0usize;
    for &id in &job.ids {
        let feature = source.get(id)?;
        processed += 1;
        let Some(geom) = clean_or_skip(&feature.geometry, id, &context, log)? else {
            continue;
        };
        let geom = reproject(&geom, &src_crs, &work_crs)?;
        let Some(bounds) = geometry::bounding_box(&geom) else {
            continue;
        };

        // 份额模式的分母：源要素自身在工作投影下的度量
        let denominator = match job.mode {
            MatchMode::Allocation => {
                let own = area_or_length(&geom, kind)?;
                if own <= MEASURE_EPSILON {
                    log.warn(&context, format!("skipping zero-measure feature {id}"));
                    continue;
                }
                Some(own)
            }
            _ => None,
        };

        let mut candidates = Vec::new();
        for tid in index.query_bounds(&bounds) {
            candidates.push((tid, &target_work.get(tid)?.geometry));
        }
        let outcomes = candidates
            .iter()
            .map(|&(tid, g)| (tid, intersection_measure(&geom, kind, g)));
        let Some(collected) = collect_candidate_pairs(id, outcomes, log, &context)? else {
            continue;
        };
        for (tid, measure) in collected {
            let value = match denominator {
                Some(own) => measure / own,
                None => measure,
            };
            pairs.insert((id, tid), value);
        }
    }

    Ok(JobOutput {
        job_id: job.job_id,
        processed,
        partial: PartialResult::Pairwise(pairs),
    })
}

/// 收集单个源要素对所有候选目标的度量
///
/// 任一候选出现可恢复错误即放弃整个要素，返回 `Ok(None)` 并丢弃
/// 已收集的配对，结果中不留下该要素的残缺条目；其余错误向上传播。
fn collect_candidate_pairs(
    id: FeatureId,
    outcomes: impl IntoIterator<Item = (FeatureId, GeoResult<Option<f64>>)>,
    log: &LogChannel,
    context: &str,
) -> MatchResult<Option<Vec<(FeatureId, f64)>>> {
    let mut collected = Vec::new();
    for (tid, outcome) in outcomes {
        match outcome {
            Ok(Some(measure)) => collected.push((tid, measure)),
            Ok(None) => {}
            Err(e) if e.is_recoverable() => {
                log.warn(
                    context,
                    format!("skipping feature {id} (candidate {tid}): {e}"),
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(collected))
}

// ============================================================================
// 测试
// ============================================================================
