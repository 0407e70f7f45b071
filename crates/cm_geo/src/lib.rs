// crates/cm_geo/src/lib.rs

//! CartaMatch 地理空间处理模块
//!
//! 提供坐标参考系统 (CRS)、投影转换、几何清理、叠加度量和空间索引。
//!
//! # 模块
//!
//! - `crs`: 坐标参考系统定义（EPSG 代码）
//! - `projection`: 纯 Rust 投影转换（地理坐标、Web Mercator、Mollweide）
//! - `geometry`: 几何种类分类与包围盒
//! - `clean`: 几何修复与拓扑校验
//! - `overlap`: 相交度量与面积/长度计算
//! - `spatial_index`: 基于 R-tree 的包围盒空间索引
//! - `transform`: 跨 CRS 几何重投影
//!
//! # 示例
//!
//! ```
//! use cm_geo::prelude::*;
//!
//! let wgs84 = Crs::wgs84();
//! assert!(wgs84.is_geographic());
//!
//! // WGS84 -> Mollweide 等积投影
//! let proj = Projection::from_epsg(54009).unwrap();
//! let (x, y) = proj.forward(0.0, 0.0).unwrap();
//! assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod clean;
pub mod crs;
pub mod error;
pub mod geometry;
pub mod overlap;
pub mod projection;
pub mod spatial_index;
pub mod transform;

/// 预导入模块
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{GeoError, GeoResult};
    pub use crate::geometry::GeometryKind;
    pub use crate::projection::Projection;
    pub use crate::spatial_index::{BoundingBox, SpatialIndex};
    pub use crate::transform::{reproject, skip_reprojection};
}

pub use crs::Crs;
pub use error::{GeoError, GeoResult};
pub use geometry::GeometryKind;
pub use projection::Projection;
pub use spatial_index::{BoundingBox, SpatialIndex};
