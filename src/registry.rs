use std::fmt::Debug;
use std::hash::Hash;

use foldhash::fast::RandomState;
use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::builder::DropPolicy;
use crate::error::HetError;
use crate::id::ContainerId;
use crate::slot::ErasedSlot;

pub(crate) type Slots<I> = IndexMap<I, Box<dyn ErasedSlot>, RandomState>;

/// The per-instance operation table: one erased slot per registered type, kept in
/// registration order.
///
/// `I` identifies a slot: the payload `TypeId` for value and sequence stores, a
/// `(key TypeId, value TypeId)` pair for the key-value store.
pub(crate) struct TypeRegistry<I> {
    id: ContainerId,
    slots: Slots<I>,
    drop_policy: DropPolicy,
}

impl<I> TypeRegistry<I>
where
    I: Copy + Eq + Hash + Debug,
{
    pub(crate) fn new(type_capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            id: ContainerId::next(),
            slots: IndexMap::with_capacity_and_hasher(type_capacity, RandomState::default()),
            drop_policy,
        }
    }

    pub(crate) fn id(&self) -> ContainerId {
        self.id
    }

    pub(crate) fn drop_policy(&self) -> DropPolicy {
        self.drop_policy
    }

    /// Number of registered types
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn contains(&self, slot_id: &I) -> bool {
        self.slots.contains_key(slot_id)
    }

    pub(crate) fn get<S: ErasedSlot>(&self, slot_id: &I) -> Option<&S> {
        self.slots.get(slot_id)?.downcast_ref::<S>()
    }

    pub(crate) fn get_mut<S: ErasedSlot>(&mut self, slot_id: &I) -> Option<&mut S> {
        self.slots.get_mut(slot_id)?.downcast_mut::<S>()
    }

    pub(crate) fn get_erased(&self, slot_id: &I) -> Option<&dyn ErasedSlot> {
        self.slots.get(slot_id).map(|slot| &**slot)
    }

    /// Returns the slot for `slot_id`, creating it with `make` on first use.
    ///
    /// Registering an already present id leaves the table unchanged. If `make` fails
    /// nothing is registered.
    pub(crate) fn register<S: ErasedSlot>(
        &mut self,
        slot_id: I,
        make: impl FnOnce() -> Result<S, HetError>,
    ) -> Result<&mut S, HetError> {
        if !self.slots.contains_key(&slot_id) {
            self.slots.try_reserve(1)?;
        }

        let container = self.id;
        let slot = match self.slots.entry(slot_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let slot = entry.insert(Box::new(make()?));
                trace!(
                    container = %container,
                    type_name = slot.type_name(),
                    "registered type"
                );
                slot
            }
        };

        let type_name = slot.type_name();
        slot.downcast_mut::<S>()
            .ok_or(HetError::ValueNotFound(type_name))
    }

    /// Drops the slot for `slot_id` and everything it holds
    pub(crate) fn remove(&mut self, slot_id: &I) -> Option<Box<dyn ErasedSlot>> {
        let slot = self.slots.shift_remove(slot_id)?;
        trace!(
            container = %self.id,
            type_name = slot.type_name(),
            len = slot.len(),
            "erased type"
        );
        Some(slot)
    }

    /// Sum of all slot lengths
    pub(crate) fn total_len(&self) -> Result<usize, HetError> {
        self.slots
            .values()
            .try_fold(0usize, |total, slot| total.checked_add(slot.len()))
            .ok_or(HetError::Overflow)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.values().all(|slot| slot.is_empty())
    }

    pub(crate) fn type_names(&self) -> Vec<&'static str> {
        self.slots.values().map(|slot| slot.type_name()).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&I, &dyn ErasedSlot)> + '_ {
        self.slots.iter().map(|(slot_id, slot)| (slot_id, &**slot))
    }

    pub(crate) fn clear(&mut self) {
        debug!(container = %self.id, types = self.slots.len(), "cleared");
        self.slots.clear();
    }

    /// Copies every slot into a fresh table. Fails without side effects if any slot is
    /// move-only.
    pub(crate) fn duplicate_slots(&self) -> Result<Slots<I>, HetError> {
        let mut slots = IndexMap::with_capacity_and_hasher(0, RandomState::default());
        slots.try_reserve(self.slots.len())?;
        for (slot_id, slot) in &self.slots {
            slots.insert(*slot_id, slot.duplicate()?);
        }
        Ok(slots)
    }

    /// Copies cloneable slots and moves move-only slots out. Moved slots are deregistered
    /// from this table; copies happen first so a failed copy leaves it untouched.
    pub(crate) fn absorb_slots(&mut self) -> Result<Slots<I>, HetError> {
        let mut copies = Vec::new();
        copies.try_reserve(self.slots.len())?;
        for slot in self.slots.values() {
            copies.push(if slot.is_cloneable() {
                Some(slot.duplicate()?)
            } else {
                None
            });
        }

        let mut slots = IndexMap::with_capacity_and_hasher(0, RandomState::default());
        slots.try_reserve(self.slots.len())?;
        for ((slot_id, slot), copy) in self.slots.iter_mut().zip(copies) {
            slots.insert(*slot_id, copy.unwrap_or_else(|| slot.take()));
        }
        self.slots.retain(|_, slot| slot.is_cloneable());
        Ok(slots)
    }

    /// Replaces the whole table, dropping the previous slots
    pub(crate) fn replace_slots(&mut self, slots: Slots<I>, source: ContainerId) {
        debug!(
            container = %self.id,
            source = %source,
            types = slots.len(),
            "assigned"
        );
        self.slots = slots;
    }

    /// A new registry with a fresh id holding a copy of every slot
    pub(crate) fn try_clone(&self) -> Result<Self, HetError> {
        let slots = self.duplicate_slots()?;
        let clone = Self {
            id: ContainerId::next(),
            slots,
            drop_policy: self.drop_policy,
        };
        debug!(container = %clone.id, source = %self.id, "cloned");
        Ok(clone)
    }
}

impl<I> Drop for TypeRegistry<I> {
    fn drop(&mut self) {
        if self.drop_policy == DropPolicy::MustNotDropItems && !std::thread::panicking() {
            let held = self.slots.values().any(|slot| !slot.is_empty());
            assert!(
                !held,
                "container {} dropped while still holding items with DropPolicy::MustNotDropItems",
                self.id
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::any::{Any, TypeId};

    use super::*;
    use crate::slot::{ScalarSlot, SequenceSlot};

    /// Reports `usize::MAX` elements without holding any
    pub(crate) struct SaturatedSlot;

    impl ErasedSlot for SaturatedSlot {
        fn type_name(&self) -> &'static str {
            "saturated"
        }

        fn len(&self) -> usize {
            usize::MAX
        }

        fn duplicate(&self) -> Result<Box<dyn ErasedSlot>, HetError> {
            Ok(Box::new(SaturatedSlot))
        }

        fn is_cloneable(&self) -> bool {
            true
        }

        fn take(&mut self) -> Box<dyn ErasedSlot> {
            Box::new(SaturatedSlot)
        }

        fn for_each_erased(&self, _: &mut dyn FnMut(&dyn Any, &dyn Any)) {}

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn registry() -> TypeRegistry<TypeId> {
        TypeRegistry::new(0, DropPolicy::default())
    }

    #[test]
    fn test_total_len_overflow() -> Result<(), HetError> {
        let mut reg = registry();
        reg.register(TypeId::of::<u8>(), || Ok(SaturatedSlot))?;
        assert_eq!(reg.total_len()?, usize::MAX);

        reg.register(TypeId::of::<u16>(), || Ok(SaturatedSlot))?;
        assert_eq!(reg.total_len(), Err(HetError::Overflow));
        assert_eq!(reg.len(), 2);
        Ok(())
    }

    #[test]
    fn test_failed_make_registers_nothing() {
        let mut reg = registry();
        let result = reg.register(TypeId::of::<u8>(), || {
            Err::<ScalarSlot<u8>, _>(HetError::OutOfMemory)
        });
        assert!(matches!(result, Err(HetError::OutOfMemory)));
        assert_eq!(reg.len(), 0);
        assert!(!reg.contains(&TypeId::of::<u8>()));
    }

    #[test]
    fn test_register_is_idempotent() -> Result<(), HetError> {
        let mut reg = registry();
        reg.register(TypeId::of::<i32>(), || Ok(ScalarSlot::new(1i32, None)))?;
        reg.register(TypeId::of::<i32>(), || Ok(ScalarSlot::new(2i32, None)))?;
        assert_eq!(reg.len(), 1);
        assert_eq!(
            reg.get::<ScalarSlot<i32>>(&TypeId::of::<i32>())
                .and_then(|s| s.value),
            Some(1)
        );
        Ok(())
    }

    #[test]
    fn test_registration_order_is_kept() -> Result<(), HetError> {
        let mut reg = registry();
        reg.register(TypeId::of::<u8>(), || Ok(ScalarSlot::new(1u8, None)))?;
        reg.register(TypeId::of::<char>(), || Ok(ScalarSlot::new('a', None)))?;
        reg.register(TypeId::of::<bool>(), || Ok(ScalarSlot::new(true, None)))?;
        assert_eq!(reg.type_names(), vec!["u8", "char", "bool"]);

        reg.remove(&TypeId::of::<char>());
        assert_eq!(reg.type_names(), vec!["u8", "bool"]);
        Ok(())
    }

    #[test]
    fn test_total_len_and_emptiness() -> Result<(), HetError> {
        let mut reg = registry();
        assert!(reg.is_empty());
        let ints = reg.register(TypeId::of::<i32>(), || {
            SequenceSlot::<Vec<i32>, i32>::try_new(0, None)
        })?;
        ints.items.extend([1, 2, 3]);
        reg.register(TypeId::of::<u8>(), || Ok(ScalarSlot::new(0u8, None)))?;
        assert_eq!(reg.total_len()?, 4);
        assert!(!reg.is_empty());

        reg.clear();
        assert_eq!(reg.len(), 0);
        assert!(reg.is_empty());
        Ok(())
    }

    #[test]
    fn test_clone_gets_new_id() -> Result<(), HetError> {
        let mut reg = registry();
        reg.register(TypeId::of::<i32>(), || Ok(ScalarSlot::new(1i32, Some(i32::clone))))?;
        let clone = reg.try_clone()?;
        assert_ne!(clone.id(), reg.id());
        assert_eq!(clone.len(), 1);
        Ok(())
    }

    #[test]
    fn test_absorb_moves_move_only_slots() -> Result<(), HetError> {
        let mut reg = registry();
        reg.register(TypeId::of::<Box<u8>>(), || Ok(ScalarSlot::new(Box::new(1u8), None)))?;
        reg.register(TypeId::of::<i32>(), || Ok(ScalarSlot::new(1i32, Some(i32::clone))))?;
        assert!(reg.duplicate_slots().is_err());

        let slots = reg.absorb_slots()?;
        assert_eq!(slots.len(), 2);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.type_names(), vec!["i32"]);
        Ok(())
    }

    #[test]
    #[should_panic]
    fn test_must_not_drop_items_panics() {
        let mut reg: TypeRegistry<TypeId> = TypeRegistry::new(0, DropPolicy::MustNotDropItems);
        let _ = reg.register(TypeId::of::<i32>(), || Ok(ScalarSlot::new(1i32, None)));
    }

    #[test]
    fn test_must_not_drop_items_allows_empty() {
        let mut reg: TypeRegistry<TypeId> = TypeRegistry::new(0, DropPolicy::MustNotDropItems);
        let _ = reg.register(TypeId::of::<i32>(), || Ok(ScalarSlot::new(1i32, None)));
        reg.clear();
    }
}
