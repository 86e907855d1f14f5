//! Logical matrix expression nodes.
//!
//! Expression nodes form a shared, acyclic DAG describing *what* matrix to
//! produce. They carry shape and partitioning metadata but perform no
//! computation; an external compiler turns the DAG into engine pipelines and
//! wraps the result as a checkpointed matrix.

use std::fmt::{Debug, Display};
use std::sync::Arc;

use strata_engine::PartitioningTag;
use strata_error::StrataResult;

mod scalar_op;

pub use scalar_op::*;

pub type ExprRef = Arc<dyn MatrixExpr>;

/// A node in the logical matrix DAG.
pub trait MatrixExpr: Debug + Display + Send + Sync {
    /// Row count of the result. Physical leaves may lazily force a
    /// distributed pass to answer; logical nodes delegate.
    fn nrow(&self) -> StrataResult<u64>;

    /// Column count of the result.
    fn ncol(&self) -> StrataResult<u32>;

    /// Physical-layout tag of the result. Equal tags guarantee identical
    /// partitioning; unequal tags say nothing.
    fn partitioning_tag(&self) -> PartitioningTag;

    /// Whether the result's integer-key row space may have gaps or
    /// duplicates. Physical leaves may force their shape statistics to
    /// answer.
    fn can_have_missing_rows(&self) -> StrataResult<bool>;

    fn children(&self) -> Vec<&ExprRef>;
}
