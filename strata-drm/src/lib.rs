//! Checkpointed distributed row matrices.
//!
//! A [`CheckpointedMatrix`] is the physical, already-executable end of the
//! expression DAG: a partitioned collection of `(key, row)` pairs plus lazily
//! derived shape. It owns the cache lifecycle, the integer-key consistency
//! check, and the collection path that gathers the distributed rows into one
//! in-core [`strata_matrix::Matrix`].

mod checkpointed;
mod collect;
mod evaluate;
mod shape;
mod write;

pub use checkpointed::*;
pub use shape::*;
