use strata_error::StrataResult;
use strata_matrix::RowVec;

use crate::Writable;

/// A row-oriented persistent store accepting a stream of tagged-key cells.
///
/// Strata's only obligation toward the store is the key tagging; everything
/// else about the on-disk format belongs to the implementation.
pub trait RowSink {
    fn append(&mut self, key: Writable, row: &RowVec) -> StrataResult<()>;
}

/// An in-memory sink for tests.
#[derive(Debug, Default)]
pub struct VecSink {
    rows: Vec<(Writable, RowVec)>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[(Writable, RowVec)] {
        &self.rows
    }
}

impl RowSink for VecSink {
    fn append(&mut self, key: Writable, row: &RowVec) -> StrataResult<()> {
        self.rows.push((key, row.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_records_appends_in_order() {
        let mut sink = VecSink::new();
        sink.append(Writable::Int(0), &RowVec::dense(vec![1.0]))
            .unwrap();
        sink.append(Writable::Int(1), &RowVec::dense(vec![2.0]))
            .unwrap();
        assert_eq!(sink.rows().len(), 2);
        assert_eq!(sink.rows()[1].0, Writable::Int(1));
    }
}
