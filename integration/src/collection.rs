/// Fast `IndexMap` using the FNV hasher, for the small string/enum keys
/// common in trading systems (symbols, venue names, strategy names).
pub type FnvIndexMap<K, V> = indexmap::IndexMap<K, V, fnv::FnvBuildHasher>;

/// Fast `IndexSet` using the FNV hasher.
pub type FnvIndexSet<T> = indexmap::IndexSet<T, fnv::FnvBuildHasher>;
