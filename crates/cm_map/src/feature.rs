// crates/cm_map/src/feature.rs

//! 要素定义

use cm_geo::geometry::{self, GeometryKind};
use cm_geo::spatial_index::BoundingBox;
use geo::Geometry;
use serde_json::{Map, Value};

/// 属性表类型
pub type Properties = Map<String, Value>;

/// 单个地理要素
///
/// 由几何体和任意 JSON 属性组成。属性在匹配过程中原样携带，
/// 引擎不做解释。
#[derive(Debug, Clone)]
pub struct Feature {
    /// 几何体
    pub geometry: Geometry<f64>,
    /// 属性表
    pub properties: Properties,
}

impl Feature {
    /// 创建不带属性的要素
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry,
            properties: Properties::new(),
        }
    }

    /// 创建带属性的要素
    pub fn with_properties(geometry: Geometry<f64>, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// 要素几何种类
    ///
    /// 几何集合等无法归类的类型返回 `None`。
    pub fn kind(&self) -> Option<GeometryKind> {
        GeometryKind::from_geometry(&self.geometry)
    }

    /// 要素包围盒
    ///
    /// 空几何返回 `None`。
    pub fn bounds(&self) -> Option<BoundingBox> {
        geometry::bounding_box(&self.geometry)
    }
}

impl From<Geometry<f64>> for Feature {
    fn from(geometry: Geometry<f64>) -> Self {
        Self::new(geometry)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Point};

    #[test]
    fn test_feature_kind() {
        let f = Feature::new(Point::new(1.0, 2.0).into());
        assert_eq!(f.kind(), Some(GeometryKind::Point));

        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let f = Feature::new(poly.into());
        assert_eq!(f.kind(), Some(GeometryKind::Polygon));
    }

    #[test]
    fn test_feature_bounds() {
        let f = Feature::new(Point::new(3.0, 4.0).into());
        let b = f.bounds().unwrap();
        assert_eq!(b.min_x, 3.0);
        assert_eq!(b.max_y, 4.0);
    }

    #[test]
    fn test_properties_carried() {
        let mut props = Properties::new();
        props.insert("name".into(), Value::String("站点A".into()));
        let f = Feature::with_properties(Point::new(0.0, 0.0).into(), props);
        assert_eq!(f.properties["name"], "站点A");
    }
}
