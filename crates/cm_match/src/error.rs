// crates/cm_match/src/error.rs

//! 匹配引擎错误

use cm_foundation::error::CmError;
use cm_geo::error::GeoError;
use thiserror::Error;

/// 匹配结果类型
pub type MatchResult<T> = Result<T, MatchError>;

/// 匹配引擎错误
#[derive(Debug, Error)]
pub enum MatchError {
    /// 输入校验失败（派发前检出）
    #[error("Validation error: {0}")]
    Validation(String),

    /// 单个任务在工作线程中失败
    #[error("Job {job_id} failed: {message}")]
    WorkerFailed {
        /// 任务编号
        job_id: usize,
        /// 失败原因
        message: String,
    },

    /// 整轮运行失败
    #[error("{failed} of {total} jobs failed")]
    RunFailed {
        /// 失败任务数
        failed: usize,
        /// 任务总数
        total: usize,
    },

    /// 几何处理错误
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeoError),

    /// 图层访问错误
    #[error("Map error: {0}")]
    Map(CmError),

    /// 日志汇聚错误
    #[error("Log sink error: {0}")]
    LogSink(String),

    /// 内部不变量被破坏
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MatchError {
    /// 输入校验失败
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

// 图层层的校验错误在引擎层同样算校验错误，其余按图层错误包装
impl From<CmError> for MatchError {
    fn from(err: CmError) -> Self {
        match err {
            CmError::Validation(message) => Self::Validation(message),
            other => Self::Map(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_passthrough() {
        let err: MatchError = CmError::validation("目标图层类型错误").into();
        assert!(matches!(err, MatchError::Validation(_)));
    }

    #[test]
    fn test_other_map_errors_wrapped() {
        let err: MatchError = CmError::file_not_found("/tmp/x").into();
        assert!(matches!(err, MatchError::Map(_)));
    }

    #[test]
    fn test_run_failed_display() {
        let err = MatchError::RunFailed {
            failed: 2,
            total: 10,
        };
        assert_eq!(err.to_string(), "2 of 10 jobs failed");
    }
}
