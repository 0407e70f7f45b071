// crates/cm_map/src/collection.rs

//! 要素集合
//!
//! 集合内所有要素必须是同一几何种类，种类在构造时推导并校验。

use crate::feature::Feature;
use crate::FeatureId;
use cm_foundation::error::{CmError, CmResult};
use cm_geo::crs::Crs;
use cm_geo::geometry::GeometryKind;
use cm_geo::spatial_index::SpatialIndex;

/// 同种类要素的集合
///
/// 携带集合级 CRS；要素本身不记录坐标系。
#[derive(Debug, Clone)]
pub struct FeatureCollection {
    features: Vec<Feature>,
    crs: Crs,
    kind: GeometryKind,
}

impl FeatureCollection {
    /// 构造要素集合
    ///
    /// 以首个要素推导几何种类，校验其余要素与之一致。
    ///
    /// # Errors
    /// - 集合为空：`CmError::Validation`
    /// - 含无法归类的几何（如几何集合）：`CmError::Validation`
    /// - 几何种类不一致：`CmError::Validation`
    pub fn new(features: Vec<Feature>, crs: Crs) -> CmResult<Self> {
        let first = features
            .first()
            .ok_or_else(|| CmError::validation("要素集合不能为空"))?;
        let kind = first
            .kind()
            .ok_or_else(|| CmError::validation("要素 0 的几何无法归类"))?;

        for (i, feature) in features.iter().enumerate().skip(1) {
            match feature.kind() {
                Some(k) if k == kind => {}
                Some(k) => {
                    return Err(CmError::validation(format!(
                        "要素 {i} 的几何种类 {k} 与集合种类 {kind} 不一致"
                    )));
                }
                None => {
                    return Err(CmError::validation(format!("要素 {i} 的几何无法归类")));
                }
            }
        }

        Ok(Self {
            features,
            crs,
            kind,
        })
    }

    /// 要素数量
    pub fn size(&self) -> usize {
        self.features.len()
    }

    /// 按索引取要素
    ///
    /// # Errors
    /// 索引越界返回 `CmError::IndexOutOfBounds`
    pub fn get(&self, id: FeatureId) -> CmResult<&Feature> {
        CmError::check_index("Feature", id, self.features.len())?;
        Ok(&self.features[id])
    }

    /// 集合几何种类
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// 集合坐标参考系统
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// 迭代 (索引, 要素)
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &Feature)> {
        self.features.iter().enumerate()
    }

    /// 为集合建立包围盒空间索引
    ///
    /// 索引项为要素索引；无包围盒的空几何不入索引。
    pub fn build_spatial_index(&self) -> SpatialIndex<FeatureId> {
        let entries: Vec<_> = self
            .features
            .iter()
            .enumerate()
            .filter_map(|(id, f)| f.bounds().map(|b| (b, id)))
            .collect();
        SpatialIndex::bulk_load(entries)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Point};

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

    #[test]
    fn test_collection_derives_kind() {
        let coll =
            FeatureCollection::new(vec![square(0.0, 0.0), square(2.0, 0.0)], Crs::wgs84())
                .unwrap();
        assert_eq!(coll.kind(), GeometryKind::Polygon);
        assert_eq!(coll.size(), 2);
    }

    #[test]
    fn test_empty_collection_rejected() {
        assert!(FeatureCollection::new(vec![], Crs::wgs84()).is_err());
    }

    #[test]
    fn test_mixed_kinds_rejected() {
        let err = FeatureCollection::new(
            vec![square(0.0, 0.0), Feature::new(Point::new(0.0, 0.0).into())],
            Crs::wgs84(),
        )
        .unwrap_err();
        assert!(matches!(err, CmError::Validation(_)));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let coll = FeatureCollection::new(vec![square(0.0, 0.0)], Crs::wgs84()).unwrap();
        assert!(coll.get(0).is_ok());
        assert!(matches!(
            coll.get(1),
            Err(CmError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_spatial_index_query() {
        let coll = FeatureCollection::new(
            vec![square(0.0, 0.0), square(10.0, 10.0)],
            Crs::wgs84(),
        )
        .unwrap();
        let index = coll.build_spatial_index();
        let hits = index.query_bounds(&cm_geo::spatial_index::BoundingBox::new(
            0.5, 0.5, 0.6, 0.6,
        ));
        assert_eq!(hits, vec![0]);
    }
}
