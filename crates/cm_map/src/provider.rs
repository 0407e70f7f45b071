// crates/cm_map/src/provider.rs

//! 图层提供者
//!
//! 匹配引擎通过 [`MapProvider`] 访问图层。`describe` 用于调度前的
//! 轻量校验，`load` 在工作线程内加载完整要素集合。

use crate::collection::FeatureCollection;
use crate::feature::Feature;
use cm_foundation::error::{CmError, CmResult};
use cm_geo::crs::Crs;
use cm_geo::geometry::GeometryKind;
use geojson::GeoJson;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 图层摘要信息
#[derive(Debug, Clone, Copy)]
pub struct MapInfo {
    /// 要素数量
    pub size: usize,
    /// 几何种类
    pub kind: GeometryKind,
    /// 坐标参考系统
    pub crs: Crs,
}

/// 图层提供者接口
///
/// 实现必须可跨线程共享：每个工作线程独立调用 `load`。
pub trait MapProvider: Send + Sync {
    /// 图层摘要（数量、种类、CRS）
    fn describe(&self) -> CmResult<MapInfo>;

    /// 加载完整要素集合
    fn load(&self) -> CmResult<FeatureCollection>;
}

/// 共享图层引用
pub type MapRef = Arc<dyn MapProvider>;

// ============================================================================
// 内存图层
// ============================================================================

/// 内存中的图层，load 返回集合的克隆
#[derive(Debug, Clone)]
pub struct InMemorySource {
    collection: FeatureCollection,
}

impl InMemorySource {
    /// 包装一个已构造的要素集合
    pub fn new(collection: FeatureCollection) -> Self {
        Self { collection }
    }
}

impl MapProvider for InMemorySource {
    fn describe(&self) -> CmResult<MapInfo> {
        Ok(MapInfo {
            size: self.collection.size(),
            kind: self.collection.kind(),
            crs: self.collection.crs(),
        })
    }

    fn load(&self) -> CmResult<FeatureCollection> {
        Ok(self.collection.clone())
    }
}

// ============================================================================
// GeoJSON 图层
// ============================================================================

/// GeoJSON 文件图层
///
/// GeoJSON 规范坐标为 WGS84；来源不符时用 [`GeoJsonSource::with_crs`]
/// 显式声明。
#[derive(Debug, Clone)]
pub struct GeoJsonSource {
    path: PathBuf,
    crs: Crs,
}

impl GeoJsonSource {
    /// 以 WGS84 打开 GeoJSON 文件
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            crs: Crs::wgs84(),
        }
    }

    /// 以指定 CRS 打开 GeoJSON 文件
    pub fn with_crs(path: impl Into<PathBuf>, crs: Crs) -> Self {
        Self {
            path: path.into(),
            crs,
        }
    }

    /// 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self) -> CmResult<FeatureCollection> {
        if !self.path.exists() {
            return Err(CmError::file_not_found(&self.path));
        }
        let text = std::fs::read_to_string(&self.path)?;
        let geojson: GeoJson = text
            .parse()
            .map_err(|e: geojson::Error| CmError::serialization(e.to_string()))?;

        let features = match geojson {
            GeoJson::FeatureCollection(fc) => fc
                .features
                .into_iter()
                .enumerate()
                .map(|(i, f)| convert_feature(i, f))
                .collect::<CmResult<Vec<_>>>()?,
            GeoJson::Feature(f) => vec![convert_feature(0, f)?],
            GeoJson::Geometry(g) => vec![Feature::new(convert_geometry(0, g)?)],
        };

        FeatureCollection::new(features, self.crs)
    }
}

impl MapProvider for GeoJsonSource {
    fn describe(&self) -> CmResult<MapInfo> {
        let collection = self.parse()?;
        Ok(MapInfo {
            size: collection.size(),
            kind: collection.kind(),
            crs: collection.crs(),
        })
    }

    fn load(&self) -> CmResult<FeatureCollection> {
        self.parse()
    }
}

fn convert_feature(index: usize, feature: geojson::Feature) -> CmResult<Feature> {
    let geometry = feature
        .geometry
        .ok_or_else(|| CmError::invalid_input(format!("要素 {index} 缺少几何")))?;
    Ok(Feature::with_properties(
        convert_geometry(index, geometry)?,
        feature.properties.unwrap_or_default(),
    ))
}

fn convert_geometry(index: usize, geometry: geojson::Geometry) -> CmResult<geo::Geometry<f64>> {
    geo::Geometry::<f64>::try_from(geometry)
        .map_err(|e| CmError::invalid_input(format!("要素 {index} 几何无效: {e}")))
}

// ============================================================================
// 测试
// ============================================================================
