//! Aliases for the hash collections used across the strata crates.

pub mod hash_map {
    pub type HashMap<K, V> = hashbrown::HashMap<K, V>;
    pub type Entry<'a, K, V, S> = hashbrown::hash_map::Entry<'a, K, V, S>;
}
