// crates/cm_match/src/aggregate.rs

//! 结果聚合
//!
//! 各任务覆盖互不相交的源要素段，聚合即不相交并集合并。
//! 进度按已处理要素数（含跳过）单调推进。

use crate::error::{MatchError, MatchResult};
use crate::worker::{JobOutput, PartialResult};
use cm_map::FeatureId;
use std::collections::HashMap;

/// 进度回调
pub trait ProgressObserver {
    /// 处理数推进时调用；`processed` 单调不减，最终等于 `total`
    fn on_progress(&mut self, processed: usize, total: usize);
}

/// 丢弃进度的占位实现
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&mut self, _processed: usize, _total: usize) {}
}

/// 全局匹配结果
#[derive(Debug, Clone)]
pub enum GlobalResult {
    /// (源索引, 目标索引) -> 度量
    Pairwise(HashMap<(FeatureId, FeatureId), f64>),
    /// 源索引 -> 度量
    PerFeature(HashMap<FeatureId, f64>),
}

/// 部分结果聚合器
pub struct Aggregator {
    result: GlobalResult,
    processed: usize,
    total: usize,
    observer: Box<dyn ProgressObserver>,
}

impl Aggregator {
    /// 聚合成对结果
    pub fn pairwise(total: usize, observer: Box<dyn ProgressObserver>) -> Self {
        Self {
            result: GlobalResult::Pairwise(HashMap::new()),
            processed: 0,
            total,
            observer,
        }
    }

    /// 聚合逐要素结果
    pub fn per_feature(total: usize, observer: Box<dyn ProgressObserver>) -> Self {
        Self {
            result: GlobalResult::PerFeature(HashMap::new()),
            processed: 0,
            total,
            observer,
        }
    }

    /// 合并一个任务输出
    ///
    /// # Errors
    /// 结果形态不符或键重复（任务划分被破坏）时返回
    /// `MatchError::Internal`
    pub fn absorb(&mut self, output: JobOutput) -> MatchResult<()> {
        match (&mut self.result, output.partial) {
            (GlobalResult::Pairwise(global), PartialResult::Pairwise(partial)) => {
                for (key, value) in partial {
                    if global.insert(key, value).is_some() {
                        return Err(MatchError::internal(format!(
                            "duplicate pair ({}, {}) from job {}",
                            key.0, key.1, output.job_id
                        )));
                    }
                }
            }
            (GlobalResult::PerFeature(global), PartialResult::PerFeature(partial)) => {
                for (key, value) in partial {
                    if global.insert(key, value).is_some() {
                        return Err(MatchError::internal(format!(
                            "duplicate feature {key} from job {}",
                            output.job_id
                        )));
                    }
                }
            }
            _ => {
                return Err(MatchError::internal(format!(
                    "mismatched result shape from job {}",
                    output.job_id
                )));
            }
        }

        self.processed += output.processed;
        self.observer.on_progress(self.processed, self.total);
        Ok(())
    }

    /// 已处理要素数
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// 取出全局结果
    pub fn finish(self) -> GlobalResult {
        self.result
    }
}

// ============================================================================
// 测试
// ============================================================================
