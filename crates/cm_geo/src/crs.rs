// crates/cm_geo/src/crs.rs

//! 坐标参考系统 (CRS) 定义
//!
//! 以 EPSG 代码标识坐标参考系统，并关联对应的投影实现。
//!
//! # 示例
//!
//! ```
//! use cm_geo::crs::Crs;
//!
//! let wgs84 = Crs::wgs84();
//! assert!(wgs84.is_geographic());
//!
//! let moll = Crs::mollweide();
//! assert!(!moll.is_geographic());
//! ```

use crate::error::GeoResult;
use crate::projection::Projection;
use serde::{Deserialize, Serialize};

/// WGS84 地理坐标的 EPSG 代码
pub const EPSG_WGS84: u32 = 4326;

/// Web Mercator 的 EPSG 代码
pub const EPSG_WEB_MERCATOR: u32 = 3857;

/// Mollweide 等积投影的代码 (ESRI:54009)
pub const EPSG_MOLLWEIDE: u32 = 54009;

/// 坐标参考系统
///
/// 只记录 EPSG 代码；投影实现通过 [`Crs::projection`] 获取。
/// 集合在一次匹配运行期间的 CRS 是固定的。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    /// EPSG 代码
    code: u32,
}

impl Crs {
    /// 从 EPSG 代码创建
    ///
    /// # Errors
    /// 代码不受支持时返回错误
    pub fn from_epsg(code: u32) -> GeoResult<Self> {
        // 提前验证代码可解析为投影
        Projection::from_epsg(code)?;
        Ok(Self { code })
    }

    /// WGS84 地理坐标 (EPSG:4326)
    #[must_use]
    pub const fn wgs84() -> Self {
        Self { code: EPSG_WGS84 }
    }

    /// Web Mercator (EPSG:3857)
    #[must_use]
    pub const fn web_mercator() -> Self {
        Self {
            code: EPSG_WEB_MERCATOR,
        }
    }

    /// Mollweide 等积投影 (ESRI:54009)
    ///
    /// 匹配引擎在地理坐标输入下计算面积/长度时使用的工作投影。
    #[must_use]
    pub const fn mollweide() -> Self {
        Self {
            code: EPSG_MOLLWEIDE,
        }
    }

    /// 获取 EPSG 代码
    #[inline]
    #[must_use]
    pub const fn epsg(&self) -> u32 {
        self.code
    }

    /// 是否为地理坐标系（经纬度，角度单位）
    #[inline]
    #[must_use]
    pub const fn is_geographic(&self) -> bool {
        self.code == EPSG_WGS84
    }

    /// 获取对应的投影实现
    ///
    /// # Errors
    /// 代码不受支持时返回错误（`from_epsg` 创建的实例不会触发）
    pub fn projection(&self) -> GeoResult<Projection> {
        Projection::from_epsg(self.code)
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.code)
    }
}

// ============================================================================
// 测试
// ============================================================================
