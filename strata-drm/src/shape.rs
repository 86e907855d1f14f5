use log::debug;
use strata_engine::{KeyKind, RowCollection, RowKey};
use strata_error::{StrataExpect as _, StrataResult, strata_err};

use crate::CheckpointedMatrix;

/// The coupled row statistics of an integer-keyed matrix.
///
/// `nrow`, the missing-rows flag and the fix-up amount are derived from the
/// same aggregates and memoized together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShape {
    pub(crate) nrow: u64,
    pub(crate) missing: bool,
    pub(crate) fix_extra: u64,
}

/// One-pass key aggregates: entry count, maximum key (-1 when empty), and the
/// 64-bit key sum.
#[derive(Debug, Clone, Copy)]
struct KeyStats {
    count: i64,
    max_key: i64,
    key_sum: i64,
}

impl KeyStats {
    const ZERO: KeyStats = KeyStats {
        count: 0,
        max_key: -1,
        key_sum: 0,
    };

    fn observe(self, key: i64) -> KeyStats {
        KeyStats {
            count: self.count + 1,
            max_key: self.max_key.max(key),
            key_sum: self.key_sum + key,
        }
    }

    fn merge(self, other: KeyStats) -> KeyStats {
        KeyStats {
            count: self.count + other.count,
            max_key: self.max_key.max(other.max_key),
            key_sum: self.key_sum + other.key_sum,
        }
    }

    /// Whether the keys cover exactly `0..count`, each once.
    ///
    /// `max_key + 1 == count` alone misses duplicate patterns like
    /// `{0, 2, 2}`; the Gauss-sum clause catches those. Zero rows are
    /// trivially consistent.
    fn is_dense_range(&self) -> bool {
        self.count == 0
            || (self.max_key + 1 == self.count && self.key_sum == self.count * (self.count - 1) / 2)
    }
}

impl<K: RowKey, C: RowCollection<K>> CheckpointedMatrix<K, C> {
    /// The column count, inferred on first access as the maximum declared
    /// row length across all partitions.
    ///
    /// Sparse rows may not represent trailing zeros, so no single row can be
    /// trusted; the union of lengths requires a full fold.
    pub fn ncol(&self) -> StrataResult<u32> {
        if let Some(&ncol) = self.ncol.get() {
            return Ok(ncol);
        }
        let ncol = self.compute_ncol()?;
        Ok(*self.ncol.get_or_init(|| ncol))
    }

    fn compute_ncol(&self) -> StrataResult<u32> {
        debug!("inferring ncol over {} partitions", self.rows().num_partitions());
        let max_len = self.rows().fold(
            0usize,
            |acc, (_, row)| acc.max(row.dense_len()),
            |a, b| a.max(b),
        )?;
        u32::try_from(max_len).map_err(
            |_| strata_err!(DimensionOverflow: "column count {max_len} exceeds the 32-bit range"),
        )
    }

    /// The row count, inferred on first access.
    pub fn nrow(&self) -> StrataResult<u64> {
        Ok(self.row_shape()?.nrow)
    }

    /// Whether the integer-key row space has gaps or duplicates relative to a
    /// dense `0..nrow` range. Forces `nrow` on first access; always `false`
    /// for non-integer keys.
    pub fn can_have_missing_rows(&self) -> StrataResult<bool> {
        Ok(self.row_shape()?.missing)
    }

    /// The gap between `max_key + 1` and the actual entry count, for
    /// downstream row fix-up passes. Opaque metadata; zero when the key
    /// range is dense or the keys are not integers.
    pub fn int_fix_extra(&self) -> StrataResult<u64> {
        Ok(self.row_shape()?.fix_extra)
    }

    fn row_shape(&self) -> StrataResult<RowShape> {
        if let Some(&shape) = self.shape.get() {
            return Ok(shape);
        }
        let shape = self.compute_row_shape()?;
        Ok(*self.shape.get_or_init(|| shape))
    }

    fn compute_row_shape(&self) -> StrataResult<RowShape> {
        // The aggregates below must all see one pinned snapshot; re-running
        // the upstream pipeline per pass could disagree on a
        // non-deterministic source.
        self.cache()?;
        match K::KIND {
            KeyKind::Int => {
                let stats = self.rows().fold(
                    KeyStats::ZERO,
                    |acc, (key, _)| {
                        let key = key
                            .int_key()
                            .strata_expect("int-kind key must carry a row index");
                        acc.observe(key)
                    },
                    KeyStats::merge,
                )?;
                let nrow = u64::try_from(stats.max_key + 1).map_err(|_| {
                    strata_err!(ComputeError: "all integer row keys negative, max observed {}",
                        stats.max_key)
                })?;
                let shape = RowShape {
                    nrow,
                    missing: !stats.is_dense_range(),
                    fix_extra: u64::try_from((stats.max_key + 1 - stats.count).max(0))
                        .unwrap_or(0),
                };
                debug!(
                    "inferred nrow={} missing={} fix_extra={} from {} entries",
                    shape.nrow, shape.missing, shape.fix_extra, stats.count
                );
                Ok(shape)
            }
            KeyKind::Long | KeyKind::Text | KeyKind::Opaque => {
                let count = self.rows().count()?;
                debug!("inferred nrow={count} by entry count");
                Ok(RowShape {
                    nrow: count,
                    missing: false,
                    fix_extra: 0,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strata_engine::LocalCollection;
    use strata_matrix::RowVec;

    use super::*;

    fn int_matrix(
        keys: &[i32],
        partitions: usize,
    ) -> CheckpointedMatrix<i32, LocalCollection<i32>> {
        let pairs = keys
            .iter()
            .map(|&k| (k, RowVec::dense(vec![f64::from(k), 0.0])))
            .collect();
        CheckpointedMatrix::new(LocalCollection::from_pairs(pairs, partitions).unwrap())
    }

    #[test]
    fn dense_key_range_is_consistent() {
        let m = int_matrix(&[0, 1, 2, 3, 4], 2);
        assert_eq!(m.nrow().unwrap(), 5);
        assert!(!m.can_have_missing_rows().unwrap());
        assert_eq!(m.int_fix_extra().unwrap(), 0);
    }

    #[test]
    fn key_gap_is_detected_and_measured() {
        let m = int_matrix(&[0, 1, 3], 2);
        assert_eq!(m.nrow().unwrap(), 4);
        assert!(m.can_have_missing_rows().unwrap());
        assert_eq!(m.int_fix_extra().unwrap(), 1);
    }

    #[rstest]
    #[case(&[0, 1, 1])]
    // maxKey+1 == rowCount holds by coincidence; only the Gauss sum flags it.
    #[case(&[0, 2, 2])]
    fn duplicate_keys_are_detected(#[case] keys: &[i32]) {
        let m = int_matrix(keys, 2);
        assert!(m.can_have_missing_rows().unwrap());
    }

    #[test]
    fn empty_matrix_is_consistent() {
        let m = int_matrix(&[], 1);
        assert_eq!(m.nrow().unwrap(), 0);
        assert!(!m.can_have_missing_rows().unwrap());
        assert_eq!(m.int_fix_extra().unwrap(), 0);
    }

    #[test]
    fn shape_inference_pins_the_snapshot_once() {
        let m = int_matrix(&[0, 1, 2], 2);
        let _ = m.nrow().unwrap();
        let _ = m.can_have_missing_rows().unwrap();
        let _ = m.int_fix_extra().unwrap();
        let _ = m.nrow().unwrap();
        assert_eq!(m.rows().persist_calls(), 1);
    }

    #[test]
    fn ncol_is_the_union_of_row_lengths() {
        let pairs = vec![
            (0i32, RowVec::sparse(2, vec![(1, 5.0)]).unwrap()),
            (1i32, RowVec::dense(vec![1.0, 2.0, 3.0, 4.0])),
            (2i32, RowVec::sparse(1, vec![]).unwrap()),
        ];
        let m = CheckpointedMatrix::new(LocalCollection::from_pairs(pairs, 3).unwrap());
        assert_eq!(m.ncol().unwrap(), 4);
    }

    #[test]
    fn ncol_of_empty_matrix_is_zero() {
        let m = int_matrix(&[], 1);
        assert_eq!(m.ncol().unwrap(), 0);
    }

    #[test]
    fn text_keys_count_entries() {
        let pairs = vec![
            ("a".to_string(), RowVec::dense(vec![1.0])),
            ("b".to_string(), RowVec::dense(vec![2.0])),
        ];
        let m = CheckpointedMatrix::new(LocalCollection::from_pairs(pairs, 2).unwrap());
        assert_eq!(m.nrow().unwrap(), 2);
        assert!(!m.can_have_missing_rows().unwrap());
    }

    #[test]
    fn long_keys_count_entries_without_positional_semantics() {
        let pairs = vec![
            (10i64, RowVec::dense(vec![1.0])),
            (99i64, RowVec::dense(vec![2.0])),
        ];
        let m = CheckpointedMatrix::new(LocalCollection::from_pairs(pairs, 1).unwrap());
        assert_eq!(m.nrow().unwrap(), 2);
        assert_eq!(m.int_fix_extra().unwrap(), 0);
    }

    #[test]
    fn out_of_range_keys_flip_the_advisory_flag() {
        // The consistency check is advisory metadata, not an error.
        let m = int_matrix(&[-1, 0], 1);
        assert_eq!(m.nrow().unwrap(), 1);
        assert!(m.can_have_missing_rows().unwrap());
    }

    #[test]
    fn all_negative_keys_cannot_name_a_row_count() {
        let m = int_matrix(&[-3, -2], 1);
        assert!(m.nrow().is_err());
    }
}
