// crates/cm_match/src/dispatch.rs

//! 任务派发
//!
//! 固定数量的命名工作线程从共享队列领取任务，结果经通道回传
//! 调用线程。调用线程按到达顺序消费输出；单个任务失败不打断
//! 其余任务，整轮结束后统一上报失败数。

use crate::error::{MatchError, MatchResult};
use crate::logsink::LogChannel;
use crate::worker::{run_job, JobOutput, MatchJob};
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

/// 派发配置
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// 工作线程数 (0=自动，按可用核数)
    pub worker_count: usize,
}

/// 解析实际线程数
///
/// 0 取可用核数，并以任务数为上限；至少为 1。
#[must_use]
pub fn effective_workers(requested: usize, total_jobs: usize) -> usize {
    let base = if requested == 0 {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    } else {
        requested
    };
    base.min(total_jobs).max(1)
}

enum Outcome {
    Done(JobOutput),
    Failed(MatchError),
}

/// 并行执行一批任务
///
/// `on_output` 在调用线程上按任务完成顺序收到每个成功输出。
///
/// # Errors
/// - 线程创建失败：`MatchError::Internal`
/// - 有任务失败：`MatchError::RunFailed`（所有任务执行完后返回）
pub fn run_jobs(
    jobs: Vec<MatchJob>,
    config: &DispatchConfig,
    log: &LogChannel,
    mut on_output: impl FnMut(JobOutput),
) -> MatchResult<()> {
    let total = jobs.len();
    if total == 0 {
        return Ok(());
    }
    let workers = effective_workers(config.worker_count, total);
    tracing::debug!("dispatching {} jobs across {} workers", total, workers);

    let (job_tx, job_rx) = mpsc::channel::<MatchJob>();
    for job in jobs {
        let _ = job_tx.send(job);
    }
    drop(job_tx);
    let job_rx: Arc<Mutex<Receiver<MatchJob>>> = Arc::new(Mutex::new(job_rx));

    let (out_tx, out_rx) = mpsc::channel::<Outcome>();

    let mut handles = Vec::with_capacity(workers);
    for i in 0..workers {
        let job_rx = Arc::clone(&job_rx);
        let out_tx = out_tx.clone();
        let log = log.clone();
        let handle = std::thread::Builder::new()
            .name(format!("matcher-{i}"))
            .spawn(move || loop {
                // 先取任务再放锁，避免持锁执行
                let job = match job_rx.lock().recv() {
                    Ok(job) => job,
                    Err(_) => break,
                };
                let outcome = match run_job(&job, &log) {
                    Ok(output) => Outcome::Done(output),
                    Err(e) => {
                        let failed = MatchError::WorkerFailed {
                            job_id: job.job_id,
                            message: e.to_string(),
                        };
                        log.error(format!("job-{}", job.job_id), failed.to_string());
                        Outcome::Failed(failed)
                    }
                };
                if out_tx.send(outcome).is_err() {
                    break;
                }
            })
            .map_err(|e| MatchError::internal(format!("failed to spawn worker: {e}")))?;
        handles.push(handle);
    }
    drop(out_tx);

    let mut received = 0usize;
    let mut failed = 0usize;
    while received < total {
        match out_rx.recv() {
            Ok(Outcome::Done(output)) => {
                received += 1;
                on_output(output);
            }
            Ok(Outcome::Failed(err)) => {
                received += 1;
                failed += 1;
                tracing::warn!("{}", err);
            }
            // 所有发送端已退出；缺口按失败计
            Err(_) => break,
        }
    }
    failed += total - received;

    for handle in handles {
        if handle.join().is_err() {
            tracing::warn!("worker thread panicked");
        }
    }

    if failed > 0 {
        Err(MatchError::RunFailed { failed, total })
    } else {
        Ok(())
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logsink::LogListener;
    use crate::worker::{MatchMode, PartialResult};
    use cm_geo::crs::Crs;
    use cm_map::{Feature, FeatureCollection, InMemorySource, MapRef};
    use geo::polygon;
    use std::collections::HashMap;

    fn square(x0: f64, y0: f64) -> Feature {
        Feature::new(
            polygon![
                (x: x0, y: y0),
                (x: x0 + 1.0, y: y0),
                (x: x0 + 1.0, y: y0 + 1.0),
                (x: x0, y: y0 + 1.0),
                (x: x0, y: y0),
            ]
            .into(),
        )
    }

    fn grid_map(n: usize) -> MapRef {
        let features = (0..n).map(|i| square(i as f64 * 2.0, 0.0)).collect();
        std::sync::Arc::new(InMemorySource::new(
            FeatureCollection::new(features, Crs::web_mercator()).unwrap(),
        ))
    }

    fn measure_jobs(source: &MapRef, chunk: usize, n: usize) -> Vec<MatchJob> {
        let ids: Vec<usize> = (0..n).collect();
        ids.chunks(chunk)
            .enumerate()
            .map(|(job_id, ids)| MatchJob {
                job_id,
                ids: ids.to_vec(),
                mode: MatchMode::Measure,
                source: std::sync::Arc::clone(source),
                target: None,
            })
            .collect()
    }

    #[test]
    fn test_all_jobs_complete() {
        let source = grid_map(25);
        let jobs = measure_jobs(&source, 4, 25);
        let total_jobs = jobs.len();
        let (channel, listener) = LogListener::start(Box::new(std::io::sink())).unwrap();

        let mut merged: HashMap<usize, f64> = HashMap::new();
        let mut outputs = 0usize;
        run_jobs(
            jobs,
            &DispatchConfig { worker_count: 4 },
            &channel,
            |out| {
                outputs += 1;
                let PartialResult::PerFeature(values) = out.partial else {
                    panic!("expected per-feature result");
                };
                merged.extend(values);
            },
        )
        .unwrap();
        drop(channel);
        listener.stop();

        assert_eq!(outputs, total_jobs);
        assert_eq!(merged.len(), 25);
        assert!(merged.values().all(|&v| (v - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_empty_job_list_is_ok() {
        let (channel, listener) = LogListener::start(Box::new(std::io::sink())).unwrap();
        run_jobs(vec![], &DispatchConfig::default(), &channel, |_| {
            panic!("no output expected")
        })
        .unwrap();
        drop(channel);
        listener.stop();
    }

    #[test]
    fn test_failed_jobs_counted_after_full_run() {
        // 第二个任务引用不存在的索引而失败，其余任务仍然完成
        let source = grid_map(10);
        let mut jobs = measure_jobs(&source, 5, 10);
        jobs.insert(
            1,
            MatchJob {
                job_id: 2,
                ids: vec![999],
                mode: MatchMode::Measure,
                source: std::sync::Arc::clone(&source),
                target: None,
            },
        );
        let (channel, listener) = LogListener::start(Box::new(std::io::sink())).unwrap();

        let mut outputs = 0usize;
        let err = run_jobs(
            jobs,
            &DispatchConfig { worker_count: 2 },
            &channel,
            |_| outputs += 1,
        )
        .unwrap_err();
        drop(channel);
        listener.stop();

        assert!(matches!(
            err,
            MatchError::RunFailed {
                failed: 1,
                total: 3
            }
        ));
        assert_eq!(outputs, 2);
    }

    #[test]
    fn test_effective_workers() {
        assert_eq!(effective_workers(4, 100), 4);
        assert_eq!(effective_workers(8, 3), 3);
        assert!(effective_workers(0, 100) >= 1);
        assert_eq!(effective_workers(0, 0), 1);
    }
}
