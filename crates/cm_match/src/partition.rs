// crates/cm_match/src/partition.rs

//! 任务划分
//!
//! 将要素索引列表切成大小大致均匀的块，每块构成一个任务。
//! 块大小随图层规模增长，使任务数趋于常数（约 200 个），
//! 同时保证小图层的块不小于 20。

use cm_map::FeatureId;

/// 块大小下限
pub const MIN_CHUNK_SIZE: usize = 20;

/// 大图层的目标任务数
pub const TARGET_JOB_COUNT: usize = 200;

/// 计算 (块大小, 任务数)
///
/// `size == 0` 时任务数为 0。
#[must_use]
pub fn partition(size: usize) -> (usize, usize) {
    let chunk = (size / TARGET_JOB_COUNT).max(MIN_CHUNK_SIZE);
    (chunk, size.div_ceil(chunk))
}

/// 按块大小切分索引列表
///
/// 除末块外每块恰好 `chunk_size` 个，保持输入顺序。
#[must_use]
pub fn split(ids: &[FeatureId], chunk_size: usize) -> Vec<Vec<FeatureId>> {
    ids.chunks(chunk_size.max(1))
        .map(<[FeatureId]>::to_vec)
        .collect()
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_layer_gets_zero_jobs() {
        assert_eq!(partition(0), (20, 0));
    }

    #[test]
    fn test_small_layer_uses_min_chunk() {
        assert_eq!(partition(50), (20, 3));
        assert_eq!(partition(20), (20, 1));
        assert_eq!(partition(1), (20, 1));
    }

    #[test]
    fn test_large_layer_targets_200_jobs() {
        assert_eq!(partition(10_000), (50, 200));
        assert_eq!(partition(1_000_000), (5_000, 200));
    }

    #[test]
    fn test_chunks_cover_all_ids() {
        for size in [0usize, 1, 19, 20, 21, 50, 4001, 10_000] {
            let ids: Vec<FeatureId> = (0..size).collect();
            let (chunk, jobs) = partition(size);
            let split = split(&ids, chunk);
            assert_eq!(split.len(), jobs, "size = {size}");
            let total: usize = split.iter().map(Vec::len).sum();
            assert_eq!(total, size, "size = {size}");
            let flat: Vec<FeatureId> = split.into_iter().flatten().collect();
            assert_eq!(flat, ids, "size = {size}");
        }
    }

    #[test]
    fn test_only_last_chunk_is_short() {
        let ids: Vec<FeatureId> = (0..50).collect();
        let split = split(&ids, 20);
        assert_eq!(split[0].len(), 20);
        assert_eq!(split[1].len(), 20);
        assert_eq!(split[2].len(), 10);
    }
}
