// crates/cm_map/src/lib.rs

//! CartaMatch 图层数据模块
//!
//! 提供要素、要素集合与图层提供者抽象。匹配引擎通过
//! [`provider::MapProvider`] 访问图层，不关心数据来自内存还是文件。
//!
//! # 模块
//!
//! - `feature`: 单个要素（几何 + 属性）
//! - `collection`: 同种类要素的集合，带 CRS 与空间索引构建
//! - `provider`: 图层提供者 trait 及内存/GeoJSON 实现

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod collection;
pub mod feature;
pub mod provider;

/// 要素在图层中的位置索引
///
/// 匹配结果以该索引标识要素，与图层迭代顺序一致。
pub type FeatureId = usize;

pub use collection::FeatureCollection;
pub use feature::Feature;
pub use provider::{GeoJsonSource, InMemorySource, MapInfo, MapProvider, MapRef};
