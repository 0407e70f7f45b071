// crates/cm_geo/src/clean.rs

//! 几何修复与拓扑校验
//!
//! 度量之前每个源几何都要经过 [`clean`]：
//! - 拒绝非有限坐标
//! - 去除环/线中的连续重复点
//! - 自动闭合未闭合的环
//! - 丢弃畸变环（去重后不足 3 个独立顶点）
//! - 拒绝自相交的环（返回可恢复的拓扑错误，调用方跳过该要素）
//!
//! 拓扑错误是单要素级别的可恢复信号，见 [`GeoError::is_recoverable`]。

use crate::error::{GeoError, GeoResult};
use geo::{Coord, CoordsIter, Geometry, LineString, MultiPolygon, Polygon};

/// 修复几何，无法修复时返回拓扑错误
///
/// # Errors
/// - 非有限坐标、空几何：`GeoError::Topology`（可恢复）
/// - 环自相交：`GeoError::Topology`（可恢复）
/// - 不支持的几何类型：`GeoError::InvalidGeometry`（致命）
pub fn clean(geom: &Geometry<f64>) -> GeoResult<Geometry<f64>> {
    check_finite(geom)?;

    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) | Geometry::Line(_) => Ok(geom.clone()),
        Geometry::LineString(ls) => Ok(Geometry::LineString(clean_line(ls)?)),
        Geometry::MultiLineString(mls) => {
            let parts: Vec<LineString<f64>> = mls
                .0
                .iter()
                .map(clean_line)
                .collect::<GeoResult<Vec<_>>>()?;
            Ok(Geometry::MultiLineString(geo::MultiLineString(parts)))
        }
        Geometry::Polygon(p) => Ok(Geometry::Polygon(clean_polygon(p)?)),
        Geometry::MultiPolygon(mp) => {
            let mut polys = Vec::with_capacity(mp.0.len());
            for p in &mp.0 {
                polys.push(clean_polygon(p)?);
            }
            if polys.is_empty() {
                return Err(GeoError::topology("multipolygon empty after cleaning"));
            }
            Ok(Geometry::MultiPolygon(MultiPolygon(polys)))
        }
        Geometry::Rect(r) => Ok(Geometry::Polygon(r.to_polygon())),
        Geometry::Triangle(t) => Ok(Geometry::Polygon(t.to_polygon())),
        Geometry::GeometryCollection(_) => Err(GeoError::invalid_geometry(
            "geometry collections are not supported",
        )),
    }
}

/// 拒绝非有限坐标
fn check_finite(geom: &Geometry<f64>) -> GeoResult<()> {
    for c in geom.coords_iter() {
        if !c.x.is_finite() || !c.y.is_finite() {
            return Err(GeoError::topology(format!(
                "non-finite coordinate ({}, {})",
                c.x, c.y
            )));
        }
    }
    Ok(())
}

/// 清理线：去重，至少 2 个顶点
fn clean_line(ls: &LineString<f64>) -> GeoResult<LineString<f64>> {
    let coords = dedup_consecutive(&ls.0);
    if coords.len() < 2 {
        return Err(GeoError::topology("degenerate line: fewer than 2 vertices"));
    }
    Ok(LineString(coords))
}

/// 清理面：逐环去重、闭合、校验
fn clean_polygon(p: &Polygon<f64>) -> GeoResult<Polygon<f64>> {
    let exterior = clean_ring(p.exterior())?
        .ok_or_else(|| GeoError::topology("degenerate exterior ring"))?;

    let mut interiors = Vec::new();
    for ring in p.interiors() {
        // 畸变内环直接丢弃，不影响整体
        if let Some(cleaned) = clean_ring(ring)? {
            interiors.push(cleaned);
        }
    }

    Ok(Polygon::new(exterior, interiors))
}

/// 清理单个环
///
/// 返回 `Ok(None)` 表示环畸变应被丢弃；自相交返回拓扑错误。
fn clean_ring(ring: &LineString<f64>) -> GeoResult<Option<LineString<f64>>> {
    let mut coords = dedup_consecutive(&ring.0);

    // 去掉重复的闭合点再计数独立顶点
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        return Ok(None);
    }

    // 重新闭合
    coords.push(coords[0]);
    let closed = LineString(coords);

    if ring_self_intersects(&closed) {
        return Err(GeoError::topology("ring self-intersection"));
    }

    Ok(Some(closed))
}

/// 去除连续重复坐标
fn dedup_consecutive(coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for &c in coords {
        if out.last() != Some(&c) {
            out.push(c);
        }
    }
    out
}

// ============================================================================
// 环自相交检测
// ============================================================================

/// 检测闭合环的自相交（真相交，不含相邻线段的公共端点）
///
/// O(n²) 线段两两检测；清理阶段对典型要素规模足够。
fn ring_self_intersects(ring: &LineString<f64>) -> bool {
    let n = ring.0.len() - 1; // 线段数
    if n < 4 {
        return false;
    }
    for i in 0..n {
        for j in (i + 1)..n {
            // 跳过相邻线段（含首尾相邻）
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (a1, a2) = (ring.0[i], ring.0[i + 1]);
            let (b1, b2) = (ring.0[j], ring.0[j + 1]);
            if segments_properly_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// 两线段是否真相交（交点在两线段内部）
fn segments_properly_intersect(
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// 三点定向：>0 左转，<0 右转，=0 共线
#[inline]
fn orientation(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn unit_square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]
    }

    #[test]
    fn test_valid_square_passes() {
        let geom = Geometry::Polygon(unit_square());
        let cleaned = clean(&geom).unwrap();
        match cleaned {
            Geometry::Polygon(p) => assert_eq!(p.exterior().0.len(), 5),
            other => panic!("unexpected geometry: {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_ring_is_closed() {
        let open = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
            vec![],
        );
        let cleaned = clean(&Geometry::Polygon(open)).unwrap();
        match cleaned {
            Geometry::Polygon(p) => {
                assert_eq!(p.exterior().0.first(), p.exterior().0.last());
            }
            other => panic!("unexpected geometry: {other:?}"),
        }
    }

    #[test]
    fn test_bowtie_rejected_as_recoverable() {
        // 自相交的 "蝴蝶结" 多边形
        let bowtie = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (1.0, 1.0),
                (1.0, 0.0),
                (0.0, 1.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        let err = clean(&Geometry::Polygon(bowtie)).unwrap_err();
        assert!(err.is_recoverable(), "expected recoverable error: {err}");
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let bad = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (f64::NAN, 0.0),
                (1.0, 1.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        let err = clean(&Geometry::Polygon(bad)).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_degenerate_ring_rejected() {
        let sliver = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]),
            vec![],
        );
        assert!(clean(&Geometry::Polygon(sliver)).is_err());
    }

    #[test]
    fn test_duplicate_points_removed() {
        let dup = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (0.0, 0.0),
                (1.0, 0.0),
                (1.0, 1.0),
                (1.0, 1.0),
                (0.0, 1.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        let cleaned = clean(&Geometry::Polygon(dup)).unwrap();
        match cleaned {
            Geometry::Polygon(p) => assert_eq!(p.exterior().0.len(), 5),
            other => panic!("unexpected geometry: {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_interior_ring_dropped() {
        let square = Polygon::new(
            unit_square().exterior().clone(),
            vec![LineString::from(vec![(0.2, 0.2), (0.3, 0.2), (0.2, 0.2)])],
        );
        let cleaned = clean(&Geometry::Polygon(square)).unwrap();
        match cleaned {
            Geometry::Polygon(p) => assert!(p.interiors().is_empty()),
            other => panic!("unexpected geometry: {other:?}"),
        }
    }

    #[test]
    fn test_line_cleaning() {
        let ls = LineString::from(vec![(0.0, 0.0), (0.0, 0.0), (3.0, 4.0)]);
        let cleaned = clean(&Geometry::LineString(ls)).unwrap();
        match cleaned {
            Geometry::LineString(l) => assert_eq!(l.0.len(), 2),
            other => panic!("unexpected geometry: {other:?}"),
        }
    }

    #[test]
    fn test_single_point_line_rejected() {
        let ls = LineString::from(vec![(1.0, 1.0), (1.0, 1.0)]);
        assert!(clean(&Geometry::LineString(ls)).is_err());
    }
}
