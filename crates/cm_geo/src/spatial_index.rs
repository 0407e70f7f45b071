// crates/cm_geo/src/spatial_index.rs

//! 空间索引实现
//!
//! 基于 R-tree 的包围盒空间索引，用于叠加匹配的候选查找。
//! 一次批量构建，构建后只读。
//!
//! # 示例
//!
//! ```
//! use cm_geo::spatial_index::{BoundingBox, SpatialIndex};
//!
//! let index = SpatialIndex::bulk_load(vec![
//!     (BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0usize),
//!     (BoundingBox::new(5.0, 5.0, 6.0, 6.0), 1usize),
//! ]);
//!
//! let hits = index.query_bounds(&BoundingBox::new(0.5, 0.5, 2.0, 2.0));
//! assert_eq!(hits, vec![0]);
//! ```

use rstar::{RTree, RTreeObject, AABB};

/// 边界框
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// 最小 x
    pub min_x: f64,
    /// 最小 y
    pub min_y: f64,
    /// 最大 x
    pub max_x: f64,
    /// 最大 y
    pub max_y: f64,
}

impl BoundingBox {
    /// 创建新的边界框
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// 检查两个边界框是否相交
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// 合并两个边界框
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// 计算宽度
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// 计算高度
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// 计算面积
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

// ============================================================================
// R-tree 包装
// ============================================================================

/// 空间索引条目
#[derive(Debug, Clone)]
struct IndexedBounds<T> {
    bbox: BoundingBox,
    data: T,
}

impl<T> RTreeObject for IndexedBounds<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min_x, self.bbox.min_y],
            [self.bbox.max_x, self.bbox.max_y],
        )
    }
}

/// 空间索引
///
/// 基于 R-tree 的包围盒索引。每个条目是（包围盒, 数据）对，
/// 范围查询返回包围盒与查询框相交的所有条目数据。
pub struct SpatialIndex<T> {
    tree: RTree<IndexedBounds<T>>,
}

impl<T: Clone> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SpatialIndex<T> {
    /// 创建空的空间索引
    #[must_use]
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// 从条目集批量构建
    #[must_use]
    pub fn bulk_load(entries: Vec<(BoundingBox, T)>) -> Self {
        let entries: Vec<IndexedBounds<T>> = entries
            .into_iter()
            .map(|(bbox, data)| IndexedBounds { bbox, data })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// 插入条目
    pub fn insert(&mut self, bbox: BoundingBox, data: T) {
        self.tree.insert(IndexedBounds { bbox, data });
    }

    /// 查询与给定包围盒相交的条目
    #[must_use]
    pub fn query_bounds(&self, bbox: &BoundingBox) -> Vec<T> {
        let envelope = AABB::from_corners(
            [bbox.min_x, bbox.min_y],
            [bbox.max_x, bbox.max_y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data.clone())
            .collect()
    }

    /// 返回索引中的条目数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 检查索引是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_normalizes_corners() {
        let bbox = BoundingBox::new(10.0, 10.0, 0.0, 0.0);
        assert_eq!(bbox.min_x, 0.0);
        assert_eq!(bbox.max_x, 10.0);
        assert!((bbox.area() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_bounding_box_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        // 边界接触也算相交
        let d = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&d));
    }

    #[test]
    fn test_bounding_box_merge() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 20.0, 20.0);
        let merged = a.merge(&b);
        assert!((merged.max_x - 20.0).abs() < 1e-10);
        assert!((merged.min_x - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_query_returns_overlapping_entries() {
        let index = SpatialIndex::bulk_load(vec![
            (BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0usize),
            (BoundingBox::new(2.0, 0.0, 3.0, 1.0), 1usize),
            (BoundingBox::new(4.0, 0.0, 5.0, 1.0), 2usize),
        ]);
        assert_eq!(index.len(), 3);

        let mut hits = index.query_bounds(&BoundingBox::new(0.5, 0.0, 2.5, 1.0));
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn test_query_empty_index() {
        let index: SpatialIndex<usize> = SpatialIndex::new();
        assert!(index.is_empty());
        let hits = index.query_bounds(&BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_insert_then_query() {
        let mut index = SpatialIndex::new();
        index.insert(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 7usize);
        let hits = index.query_bounds(&BoundingBox::new(0.5, 0.5, 0.6, 0.6));
        assert_eq!(hits, vec![7]);
    }
}
