// crates/cm_geo/src/transform.rs

//! 坐标变换
//!
//! 在两个 CRS 之间重投影几何：先经源投影反算回地理坐标，
//! 再经目标投影正算。地理坐标系本身视为恒等的"反算"。

use crate::crs::Crs;
use crate::error::GeoResult;
use geo::{Geometry, MapCoords};

/// 判断是否可以跳过重投影
///
/// 启发式判断：EPSG 代码相同，或二者均为地理坐标系。
/// 不识别代码不同但定义等价的坐标系。
#[must_use]
pub fn skip_reprojection(source: &Crs, target: &Crs) -> bool {
    source.epsg() == target.epsg() || (source.is_geographic() && target.is_geographic())
}

/// 将几何从源 CRS 重投影到目标 CRS
///
/// 源与目标等价时原样返回克隆，不做逐点换算。
///
/// # Errors
/// - CRS 不受支持：`GeoError::UnsupportedCrs`
/// - 坐标非有限或超出投影定义域：`GeoError::Projection`
pub fn reproject(
    geom: &Geometry<f64>,
    source: &Crs,
    target: &Crs,
) -> GeoResult<Geometry<f64>> {
    if skip_reprojection(source, target) {
        return Ok(geom.clone());
    }

    let src_proj = source.projection()?;
    let dst_proj = target.projection()?;

    geom.try_map_coords(|coord| {
        let (lon, lat) = src_proj.inverse(coord.x, coord.y)?;
        let (x, y) = dst_proj.forward(lon, lat)?;
        Ok(geo::coord! { x: x, y: y })
    })
}

/// 源 CRS 到等积工作投影的便捷封装
///
/// 地理坐标系投到摩尔威德等积投影；已投影的坐标系保持不变，
/// 其度量按原投影单位解释。
pub fn to_equal_area(geom: &Geometry<f64>, source: &Crs) -> GeoResult<Geometry<f64>> {
    if source.is_geographic() {
        reproject(geom, source, &Crs::mollweide())
    } else {
        Ok(geom.clone())
    }
}

// ============================================================================
// 测试
// ============================================================================
