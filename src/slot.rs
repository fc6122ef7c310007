use std::any::{type_name, Any};
use std::hash::Hash;
use std::marker::PhantomData;

use foldhash::{HashMap, HashMapExt};

use crate::error::HetError;
use crate::sequence::Sequence;

/// Copies one payload value; absent for move-only payloads
pub(crate) type Copier<T> = Option<fn(&T) -> T>;

/// Type-erased operations on one stored type.
///
/// Every registered type of a container is held behind this interface, so generic
/// container operations (copy, size, emptiness, erased dispatch) work without knowing
/// the stored types.
pub(crate) trait ErasedSlot: Any {
    fn type_name(&self) -> &'static str;

    /// Number of elements held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produces an independent copy of this slot
    fn duplicate(&self) -> Result<Box<dyn ErasedSlot>, HetError>;

    fn is_cloneable(&self) -> bool;

    /// Moves the contents out, leaving this slot empty
    fn take(&mut self) -> Box<dyn ErasedSlot>;

    /// Calls `f` with every element as `(key, value)`. Slots without keys pass `&()`.
    fn for_each_erased(&self, f: &mut dyn FnMut(&dyn Any, &dyn Any));

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn ErasedSlot {
    pub(crate) fn downcast_ref<S: ErasedSlot>(&self) -> Option<&S> {
        self.as_any().downcast_ref::<S>()
    }

    pub(crate) fn downcast_mut<S: ErasedSlot>(&mut self) -> Option<&mut S> {
        self.as_any_mut().downcast_mut::<S>()
    }
}

/// Exactly one value of type `T`
pub(crate) struct ScalarSlot<T> {
    pub(crate) value: Option<T>,
    pub(crate) copier: Copier<T>,
}

impl<T: 'static> ScalarSlot<T> {
    pub(crate) fn new(value: T, copier: Copier<T>) -> Self {
        Self {
            value: Some(value),
            copier,
        }
    }
}

impl<T: 'static> ErasedSlot for ScalarSlot<T> {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn len(&self) -> usize {
        usize::from(self.value.is_some())
    }

    fn duplicate(&self) -> Result<Box<dyn ErasedSlot>, HetError> {
        let copy = self.copier.ok_or(HetError::NotCloneable(type_name::<T>()))?;
        Ok(Box::new(ScalarSlot {
            value: self.value.as_ref().map(copy),
            copier: self.copier,
        }))
    }

    fn is_cloneable(&self) -> bool {
        self.copier.is_some()
    }

    fn take(&mut self) -> Box<dyn ErasedSlot> {
        Box::new(ScalarSlot {
            value: self.value.take(),
            copier: self.copier,
        })
    }

    fn for_each_erased(&self, f: &mut dyn FnMut(&dyn Any, &dyn Any)) {
        if let Some(value) = &self.value {
            f(&(), value);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The fraction of one type inside a sequence container
pub(crate) struct SequenceSlot<S, T> {
    pub(crate) items: S,
    pub(crate) copier: Copier<T>,
}

impl<S: Sequence<T>, T: 'static> SequenceSlot<S, T> {
    /// An empty fraction with room for at least one element
    pub(crate) fn try_new(capacity: usize, copier: Copier<T>) -> Result<Self, HetError> {
        let mut items = S::default();
        items.try_reserve(capacity.max(1))?;
        Ok(Self { items, copier })
    }
}

impl<S: Sequence<T>, T: 'static> ErasedSlot for SequenceSlot<S, T> {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn duplicate(&self) -> Result<Box<dyn ErasedSlot>, HetError> {
        let copy = self.copier.ok_or(HetError::NotCloneable(type_name::<T>()))?;
        let mut items = S::default();
        items.try_reserve(self.items.len())?;
        for item in self.items.iter() {
            items.push_back(copy(item));
        }
        Ok(Box::new(SequenceSlot {
            items,
            copier: self.copier,
        }))
    }

    fn is_cloneable(&self) -> bool {
        self.copier.is_some()
    }

    fn take(&mut self) -> Box<dyn ErasedSlot> {
        Box::new(SequenceSlot {
            items: std::mem::take(&mut self.items),
            copier: self.copier,
        })
    }

    fn for_each_erased(&self, f: &mut dyn FnMut(&dyn Any, &dyn Any)) {
        for item in self.items.iter() {
            f(&(), item);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Key to value map of one (key type, value type) pair
pub(crate) struct MapSlot<K, V> {
    pub(crate) entries: HashMap<K, V>,
    pub(crate) copier: Copier<V>,
    _key: PhantomData<fn() -> K>,
}

impl<K, V> MapSlot<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: 'static,
{
    /// An empty map with room for one entry
    pub(crate) fn try_new(copier: Copier<V>) -> Result<Self, HetError> {
        let mut entries = HashMap::new();
        entries.try_reserve(1)?;
        Ok(Self {
            entries,
            copier,
            _key: PhantomData,
        })
    }
}

impl<K, V> ErasedSlot for MapSlot<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: 'static,
{
    fn type_name(&self) -> &'static str {
        type_name::<V>()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn duplicate(&self) -> Result<Box<dyn ErasedSlot>, HetError> {
        let copy = self.copier.ok_or(HetError::NotCloneable(type_name::<V>()))?;
        let mut entries = HashMap::new();
        entries.try_reserve(self.entries.len())?;
        for (key, value) in &self.entries {
            entries.insert(key.clone(), copy(value));
        }
        Ok(Box::new(MapSlot {
            entries,
            copier: self.copier,
            _key: PhantomData,
        }))
    }

    fn is_cloneable(&self) -> bool {
        self.copier.is_some()
    }

    fn take(&mut self) -> Box<dyn ErasedSlot> {
        Box::new(MapSlot {
            entries: std::mem::take(&mut self.entries),
            copier: self.copier,
            _key: PhantomData,
        })
    }

    fn for_each_erased(&self, f: &mut dyn FnMut(&dyn Any, &dyn Any)) {
        for (key, value) in &self.entries {
            f(key, value);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
