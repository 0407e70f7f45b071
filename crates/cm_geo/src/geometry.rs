// crates/cm_geo/src/geometry.rs

//! 几何种类分类与多部件归一化
//!
//! 匹配引擎只区分三种几何种类：点、线、面。单部件与多部件几何
//! 归入同一种类，度量前统一提升为多部件形式。

use crate::error::{GeoError, GeoResult};
use crate::spatial_index::BoundingBox;
use geo::{BoundingRect, Geometry, MultiLineString, MultiPoint, MultiPolygon};
use serde::{Deserialize, Serialize};

/// 几何种类
///
/// 封闭枚举：每个度量操作对三种种类做穷尽匹配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    /// 点 (Point / MultiPoint)
    Point,
    /// 线 (LineString / MultiLineString)
    Line,
    /// 面 (Polygon / MultiPolygon)
    Polygon,
}

impl GeometryKind {
    /// 从几何对象分类
    ///
    /// GeometryCollection 等混合类型不属于任何种类，返回 None。
    #[must_use]
    pub fn from_geometry(geom: &Geometry<f64>) -> Option<Self> {
        match geom {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Some(Self::Point),
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
                Some(Self::Line)
            }
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_)
            | Geometry::Triangle(_) => Some(Self::Polygon),
            Geometry::GeometryCollection(_) => None,
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Point => write!(f, "point"),
            Self::Line => write!(f, "line"),
            Self::Polygon => write!(f, "polygon"),
        }
    }
}

// ============================================================================
// 多部件归一化
// ============================================================================

/// 提升为 MultiPolygon
///
/// # Errors
/// 几何不是面类型时返回错误
pub fn as_multi_polygon(geom: &Geometry<f64>) -> GeoResult<MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon(p) => Ok(MultiPolygon(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Ok(mp.clone()),
        Geometry::Rect(r) => Ok(MultiPolygon(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Ok(MultiPolygon(vec![t.to_polygon()])),
        other => Err(GeoError::invalid_geometry(format!(
            "expected polygonal geometry, got {}",
            kind_name(other)
        ))),
    }
}

/// 提升为 MultiLineString
///
/// # Errors
/// 几何不是线类型时返回错误
pub fn as_multi_line_string(geom: &Geometry<f64>) -> GeoResult<MultiLineString<f64>> {
    match geom {
        Geometry::LineString(ls) => Ok(MultiLineString(vec![ls.clone()])),
        Geometry::MultiLineString(mls) => Ok(mls.clone()),
        Geometry::Line(l) => Ok(MultiLineString(vec![(*l).into()])),
        other => Err(GeoError::invalid_geometry(format!(
            "expected line geometry, got {}",
            kind_name(other)
        ))),
    }
}

/// 提升为 MultiPoint
///
/// # Errors
/// 几何不是点类型时返回错误
pub fn as_multi_point(geom: &Geometry<f64>) -> GeoResult<MultiPoint<f64>> {
    match geom {
        Geometry::Point(p) => Ok(MultiPoint(vec![*p])),
        Geometry::MultiPoint(mp) => Ok(mp.clone()),
        other => Err(GeoError::invalid_geometry(format!(
            "expected point geometry, got {}",
            kind_name(other)
        ))),
    }
}

/// 计算几何的包围盒
///
/// 空几何（无坐标）返回 None。
#[must_use]
pub fn bounding_box(geom: &Geometry<f64>) -> Option<BoundingBox> {
    let rect = geom.bounding_rect()?;
    Some(BoundingBox::new(
        rect.min().x,
        rect.min().y,
        rect.max().x,
        rect.max().y,
    ))
}

/// 几何类型名（用于错误信息）
fn kind_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

// ============================================================================
// 测试
// ============================================================================
