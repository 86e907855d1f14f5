use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque identifier for the physical partitioning of a collection.
///
/// Equal tags guarantee identical partitioning; unequal tags say nothing.
/// Downstream consumers may use equality to skip a repartition step, never as
/// a correctness guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitioningTag(u64);

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

impl PartitioningTag {
    /// A tag no existing collection carries.
    pub fn fresh() -> Self {
        Self(NEXT_TAG.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for PartitioningTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
