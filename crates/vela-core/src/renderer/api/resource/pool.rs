// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Storage for backend-side resource state.

use crate::renderer::error::{GraphicsError, GraphicsResult};
use slotmap::{Key, SlotMap};

/// A generation-checked store of backend resources of one kind.
///
/// Lookups with a null, stale or already-removed key fail with
/// [`GraphicsError::InvalidOperation`] instead of returning a different resource.
#[derive(Debug)]
pub struct ResourcePool<K: Key, V> {
    kind: &'static str,
    slots: SlotMap<K, V>,
}

impl<K: Key, V> ResourcePool<K, V> {
    /// Creates an empty pool; `kind` names the resource in error messages.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            slots: SlotMap::with_key(),
        }
    }

    /// The resource kind this pool stores.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Stores a resource and returns its key.
    pub fn insert(&mut self, value: V) -> K {
        self.slots.insert(value)
    }

    /// Stores a resource built from its own key.
    pub fn insert_with_key(&mut self, f: impl FnOnce(K) -> V) -> K {
        self.slots.insert_with_key(f)
    }

    /// Whether `key` refers to a live resource.
    pub fn contains(&self, key: K) -> bool {
        self.slots.contains_key(key)
    }

    /// Resolves `key`.
    pub fn get(&self, key: K) -> GraphicsResult<&V> {
        let kind = self.kind;
        self.slots.get(key).ok_or_else(|| Self::stale(kind))
    }

    /// Resolves `key` mutably.
    pub fn get_mut(&mut self, key: K) -> GraphicsResult<&mut V> {
        let kind = self.kind;
        self.slots.get_mut(key).ok_or_else(|| Self::stale(kind))
    }

    /// Removes the resource behind `key`; the key is dead afterwards.
    pub fn remove(&mut self, key: K) -> GraphicsResult<V> {
        let kind = self.kind;
        self.slots.remove(key).ok_or_else(|| Self::stale(kind))
    }

    /// The number of live resources.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool holds no resources.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over live resources.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.slots.iter()
    }

    /// Removes every resource, yielding them.
    pub fn drain(&mut self) -> impl Iterator<Item = (K, V)> + '_ {
        self.slots.drain()
    }

    fn stale(kind: &'static str) -> GraphicsError {
        GraphicsError::InvalidOperation(format!(
            "{kind} handle is null, stale or already destroyed"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::resource::BufferId;

    #[test]
    fn removed_key_is_rejected_even_after_slot_reuse() {
        let mut pool: ResourcePool<BufferId, u32> = ResourcePool::new("buffer");
        let first = pool.insert(1);
        pool.remove(first).unwrap();
        let second = pool.insert(2);

        assert!(matches!(
            pool.get(first),
            Err(GraphicsError::InvalidOperation(_))
        ));
        assert_eq!(*pool.get(second).unwrap(), 2);
        assert!(pool.remove(first).is_err());
    }

    #[test]
    fn null_key_never_resolves() {
        let pool: ResourcePool<BufferId, u32> = ResourcePool::new("buffer");
        let err = pool.get(BufferId::default()).unwrap_err();
        assert_eq!(
            err,
            GraphicsError::InvalidOperation(
                "buffer handle is null, stale or already destroyed".to_string()
            )
        );
    }
}
