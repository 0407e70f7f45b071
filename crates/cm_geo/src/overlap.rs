// crates/cm_geo/src/overlap.rs

//! 叠加度量
//!
//! 按几何种类计算两类度量：
//! - [`intersection_measure`]: 源几何与面状目标几何的相交量
//!   （点 -> 落入数量，线 -> 裁剪长度，面 -> 相交面积）
//! - [`area_or_length`]: 几何自身的度量（点 -> 计数，线 -> 长度，面 -> 面积）
//!
//! 度量单位与输入坐标单位一致（工作投影下为米）。

use crate::error::{GeoError, GeoResult};
use crate::geometry::{as_multi_line_string, as_multi_point, as_multi_polygon, GeometryKind};
use geo::{Area, BooleanOps, Contains, Euclidean, Geometry, Length};

/// 度量判零阈值
///
/// 低于该值的相交量视为数值噪声，不计入结果。
pub const MEASURE_EPSILON: f64 = 1e-12;

/// 计算源几何与面状目标几何的相交度量
///
/// 返回 `Ok(None)` 表示没有有效相交（或相交量低于阈值）。
///
/// # Errors
/// - 目标不是面类型：`GeoError::InvalidGeometry`（致命，调用方应在
///   任务开始前校验目标图层种类）
/// - 布尔运算对病态输入失败：`GeoError::Topology`（可恢复）
pub fn intersection_measure(
    source: &Geometry<f64>,
    kind: GeometryKind,
    target: &Geometry<f64>,
) -> GeoResult<Option<f64>> {
    let target_mp = as_multi_polygon(target)?;

    let measure = match kind {
        GeometryKind::Point => {
            let points = as_multi_point(source)?;
            let inside = points.0.iter().filter(|p| target_mp.contains(*p)).count();
            inside as f64
        }
        GeometryKind::Line => {
            let lines = as_multi_line_string(source)?;
            let clipped = catch_topology(|| target_mp.clip(&lines, false))?;
            clipped.length::<Euclidean>()
        }
        GeometryKind::Polygon => {
            let source_mp = as_multi_polygon(source)?;
            let intersection = catch_topology(|| source_mp.intersection(&target_mp))?;
            intersection.unsigned_area()
        }
    };

    if measure > MEASURE_EPSILON {
        Ok(Some(measure))
    } else {
        Ok(None)
    }
}

/// 计算几何自身的度量
///
/// 点按计数约定取点数（单点为 1.0），线取长度，面取面积。
///
/// # Errors
/// 几何与声明的种类不符时返回 `GeoError::InvalidGeometry`
pub fn area_or_length(geom: &Geometry<f64>, kind: GeometryKind) -> GeoResult<f64> {
    match kind {
        GeometryKind::Point => Ok(as_multi_point(geom)?.0.len() as f64),
        GeometryKind::Line => Ok(as_multi_line_string(geom)?.length::<Euclidean>()),
        GeometryKind::Polygon => Ok(as_multi_polygon(geom)?.unsigned_area()),
    }
}

/// 将布尔叠加中的 panic 转换为可恢复的拓扑错误
///
/// 叠加实现对个别病态输入会 panic；按单要素拓扑错误处理，
/// 由调用方跳过该要素。
fn catch_topology<T>(op: impl FnOnce() -> T) -> GeoResult<T> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(op))
        .map_err(|_| GeoError::topology("boolean overlay failed"))
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, LineString, MultiPoint, Point, Polygon};

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]
    }

    #[test]
    fn test_polygon_intersection_area() {
        // 两个单位正方形横向重叠 0.5
        let a = Geometry::Polygon(square(0.0, 0.0, 1.0));
        let b = Geometry::Polygon(square(0.5, 0.0, 1.0));
        let m = intersection_measure(&a, GeometryKind::Polygon, &b)
            .unwrap()
            .unwrap();
        assert!((m - 0.5).abs() < 1e-9, "area = {m}");
    }

    #[test]
    fn test_disjoint_polygons_yield_none() {
        let a = Geometry::Polygon(square(0.0, 0.0, 1.0));
        let b = Geometry::Polygon(square(5.0, 5.0, 1.0));
        assert!(intersection_measure(&a, GeometryKind::Polygon, &b)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_line_clip_length() {
        let line: Geometry<f64> =
            LineString::from(vec![(-1.0, 0.5), (2.0, 0.5)]).into();
        let target = Geometry::Polygon(square(0.0, 0.0, 1.0));
        let m = intersection_measure(&line, GeometryKind::Line, &target)
            .unwrap()
            .unwrap();
        assert!((m - 1.0).abs() < 1e-9, "length = {m}");
    }

    #[test]
    fn test_point_containment_count() {
        let pts: Geometry<f64> = MultiPoint(vec![
            Point::new(0.5, 0.5),
            Point::new(0.9, 0.1),
            Point::new(5.0, 5.0),
        ])
        .into();
        let target = Geometry::Polygon(square(0.0, 0.0, 1.0));
        let m = intersection_measure(&pts, GeometryKind::Point, &target)
            .unwrap()
            .unwrap();
        assert!((m - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_outside_yields_none() {
        let p: Geometry<f64> = Point::new(5.0, 5.0).into();
        let target = Geometry::Polygon(square(0.0, 0.0, 1.0));
        assert!(intersection_measure(&p, GeometryKind::Point, &target)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_non_polygonal_target_is_fatal() {
        let a = Geometry::Polygon(square(0.0, 0.0, 1.0));
        let line: Geometry<f64> =
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]).into();
        let err = intersection_measure(&a, GeometryKind::Polygon, &line).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_area_or_length() {
        let tri: Geometry<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ]
        .into();
        assert!((area_or_length(&tri, GeometryKind::Polygon).unwrap() - 2.0).abs() < 1e-12);

        let line: Geometry<f64> =
            LineString::from(vec![(0.0, 0.0), (3.0, 4.0)]).into();
        assert!((area_or_length(&line, GeometryKind::Line).unwrap() - 5.0).abs() < 1e-12);

        let p: Geometry<f64> = Point::new(1.0, 1.0).into();
        assert!((area_or_length(&p, GeometryKind::Point).unwrap() - 1.0).abs() < 1e-12);
    }
}
