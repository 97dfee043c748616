//! Fast hash-map/set aliases backed by `rustc-hash`'s FxHash.
//!
//! The reference graph and the file graph are both built and torn down once
//! per analysis run; the speed of the hasher matters far more than DoS
//! resistance for paths and symbol names that never cross a trust boundary.

use rustc_hash::FxHasher;
use std::collections::{HashMap, HashSet};
use std::hash::BuildHasherDefault;

pub type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;
pub type FxHashSet<T> = HashSet<T, BuildHasherDefault<FxHasher>>;
