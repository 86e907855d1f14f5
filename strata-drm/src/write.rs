use log::debug;
use strata_engine::{RowCollection, RowKey, RowSink, check_writable};
use strata_error::StrataResult;

use crate::CheckpointedMatrix;

impl<K: RowKey, C: RowCollection<K>> CheckpointedMatrix<K, C> {
    /// Stream every row into a row-oriented store with its key in tagged
    /// serializable form.
    ///
    /// The key-type mapping is checked once up front, not per row.
    pub fn write_to<S: RowSink>(&self, sink: &mut S) -> StrataResult<()> {
        check_writable::<K>()?;
        let pairs = self.rows().collect_rows()?;
        debug!("writing {} rows with {}-tagged keys", pairs.len(), K::KIND);
        for (key, row) in &pairs {
            sink.append(key.to_writable()?, row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use strata_engine::{Bytes, KeyKind, LocalCollection, VecSink, Writable};
    use strata_error::StrataError;
    use strata_matrix::RowVec;

    use super::*;

    #[test]
    fn int_keys_write_int_tagged_cells() {
        let pairs = vec![
            (0i32, RowVec::dense(vec![1.0])),
            (1i32, RowVec::dense(vec![2.0])),
        ];
        let m = CheckpointedMatrix::new(LocalCollection::from_pairs(pairs, 1).unwrap());
        let mut sink = VecSink::new();
        m.write_to(&mut sink).unwrap();
        assert_eq!(sink.rows().len(), 2);
        assert!(sink.rows().iter().all(|(key, _)| key.kind() == KeyKind::Int));
    }

    #[test]
    fn long_text_and_opaque_keys_keep_their_tags() {
        let m = CheckpointedMatrix::new(
            LocalCollection::from_pairs(vec![(7i64, RowVec::dense(vec![1.0]))], 1).unwrap(),
        );
        let mut sink = VecSink::new();
        m.write_to(&mut sink).unwrap();
        assert_eq!(sink.rows()[0].0, Writable::Long(7));

        let m = CheckpointedMatrix::new(
            LocalCollection::from_pairs(vec![("k".to_string(), RowVec::dense(vec![1.0]))], 1)
                .unwrap(),
        );
        let mut sink = VecSink::new();
        m.write_to(&mut sink).unwrap();
        assert_eq!(sink.rows()[0].0, Writable::Text("k".to_string()));

        let m = CheckpointedMatrix::new(
            LocalCollection::from_pairs(vec![(Bytes(vec![9]), RowVec::dense(vec![1.0]))], 1)
                .unwrap(),
        );
        let mut sink = VecSink::new();
        m.write_to(&mut sink).unwrap();
        assert_eq!(sink.rows()[0].0, Writable::Bytes(vec![9]));
    }

    #[test]
    fn unwritable_key_type_fails_before_any_append() {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        struct Unmapped;

        impl RowKey for Unmapped {
            const KIND: KeyKind = KeyKind::Opaque;

            fn label(&self) -> String {
                "?".to_string()
            }
        }

        let m = CheckpointedMatrix::new(
            LocalCollection::from_pairs(vec![(Unmapped, RowVec::dense(vec![1.0]))], 1).unwrap(),
        );
        let mut sink = VecSink::new();
        let err = m.write_to(&mut sink).unwrap_err();
        assert!(matches!(err, StrataError::UnsupportedKeyType(..)));
        assert!(sink.rows().is_empty());
    }
}
