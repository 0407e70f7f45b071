// crates/cm_geo/src/error.rs

//! 几何层错误类型
//!
//! 区分可恢复的拓扑错误与致命错误：单要素的拓扑退化应被调用方跳过，
//! 其余错误终止所在任务。

use thiserror::Error;

/// 几何层结果类型
pub type GeoResult<T> = Result<T, GeoError>;

/// 几何层错误
#[derive(Debug, Error)]
pub enum GeoError {
    /// 拓扑错误（单要素可恢复）
    #[error("topology error: {0}")]
    Topology(String),

    /// 投影计算失败
    #[error("projection error: {0}")]
    Projection(String),

    /// 不支持的 EPSG 代码
    #[error("unsupported EPSG code: {0}")]
    UnsupportedCrs(u32),

    /// 无效几何（不可恢复）
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl GeoError {
    /// 拓扑错误
    pub fn topology(message: impl Into<String>) -> Self {
        Self::Topology(message.into())
    }

    /// 投影错误
    pub fn projection(message: impl Into<String>) -> Self {
        Self::Projection(message.into())
    }

    /// 无效几何
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry(message.into())
    }

    /// 是否为可恢复错误
    ///
    /// 可恢复错误只影响单个要素，调用方应跳过该要素继续处理；
    /// 其余错误必须向上传播并终止所在任务。
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Topology(_))
    }
}
