use slotmap::new_key_type;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

new_key_type! {
    /// Generational index of a resource record in the cache arena
    pub struct ResourceId;
}

/// Typed reference to a cached resource
///
/// A handle stands for exactly one reference count. It is deliberately not
/// `Clone`: take another reference with `AssetStore::clone_handle` and give
/// each one back with `AssetStore::destroy`. Handles dropped without being
/// destroyed keep their resource alive and show up in the leak report.
pub struct AssetHandle<T> {
    id: ResourceId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AssetHandle<T> {
    pub(crate) fn new(id: ResourceId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Arena id of the referenced resource
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Whether both handles reference the same resource
    pub fn same_resource(&self, other: &AssetHandle<T>) -> bool {
        self.id == other.id
    }
}

impl<T> fmt::Debug for AssetHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for AssetHandle<T> {}

impl<T> Hash for AssetHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    struct Marker;

    #[test]
    fn test_handle_identity() {
        let mut arena: SlotMap<ResourceId, ()> = SlotMap::with_key();
        let a = arena.insert(());
        let b = arena.insert(());

        let first: AssetHandle<Marker> = AssetHandle::new(a);
        let second: AssetHandle<Marker> = AssetHandle::new(a);
        let other: AssetHandle<Marker> = AssetHandle::new(b);

        assert!(first.same_resource(&second));
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.id(), a);
    }
}
