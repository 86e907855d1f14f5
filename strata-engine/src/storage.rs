use std::fmt::{Display, Formatter};

/// The storage tier a pinned collection is held in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageTier {
    #[default]
    Memory,
    MemoryAndDisk,
    Disk,
}

impl Display for StorageTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageTier::Memory => "memory",
            StorageTier::MemoryAndDisk => "memory+disk",
            StorageTier::Disk => "disk",
        };
        f.write_str(name)
    }
}
