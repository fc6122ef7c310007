use std::any::{type_name, TypeId};
use std::fmt::{self, Debug};
use std::hash::Hash;

use foldhash::HashMap;

use crate::builder::{DropPolicy, HeteroKeyValueBuilder};
use crate::error::HetError;
use crate::id::ContainerId;
use crate::matching::MatchTypes;
use crate::registry::TypeRegistry;
use crate::slot::{Copier, MapSlot};
use crate::tuple::{EntrySet, FetchTuple, TypeList};
use crate::visit::{EntryVisitor, VisitEntries, VisitorReturn};

/// Requirements on key types of a [`HeteroKeyValue`]
pub trait MapKey: Clone + Eq + Hash + Debug + 'static {}

impl<K: Clone + Eq + Hash + Debug + 'static> MapKey for K {}

/// Slot identity: (key type, value type)
type SlotId = (TypeId, TypeId);

fn slot_id<K: 'static, V: 'static>() -> SlotId {
    (TypeId::of::<K>(), TypeId::of::<V>())
}

/// A store holding one key-to-value map per (key type, value type) pair
///
/// Values of different types may share a key without interfering: `1 -> "one"` and
/// `1 -> 1.0` live in different maps. Writing an existing key of a map overwrites it.
///
/// Operations name the value type first and let the key type be inferred from the key.
///
/// # Examples
///
/// ```
/// use sovran_hetero::{HeteroKeyValue, HetError};
///
/// # fn main() -> Result<(), HetError> {
/// let mut kv = HeteroKeyValue::new();
/// kv.add(1u32, String::from("one"))?;
/// kv.add(1u32, 1.0f64)?;
/// kv.add("pi", 2.5f64)?;
///
/// assert_eq!(kv.value::<String, _>(&1u32)?, "one");
/// assert_eq!(*kv.value::<f64, _>(&"pi")?, 2.5);
/// assert!(matches!(
///     kv.value::<String, _>(&2u32),
///     Err(HetError::KeyNotFound(_))
/// ));
/// assert_eq!(kv.size()?, 3);
/// # Ok(())
/// # }
/// ```
pub struct HeteroKeyValue {
    registry: TypeRegistry<SlotId>,
}

impl HeteroKeyValue {
    pub fn new() -> Self {
        Self::new_inner(0, DropPolicy::default())
    }

    /// Creates a builder for configuring a key-value store
    pub fn builder() -> HeteroKeyValueBuilder {
        HeteroKeyValueBuilder::new()
    }

    pub(crate) fn new_inner(type_capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            registry: TypeRegistry::new(type_capacity, drop_policy),
        }
    }

    /// Creates a store holding each `(key, value)` pair of the tuple
    ///
    /// ```
    /// use sovran_hetero::HeteroKeyValue;
    ///
    /// let kv = HeteroKeyValue::with_entries(((1u8, 'a'), ("name", String::from("n"))))?;
    /// assert_eq!(*kv.value::<char, _>(&1u8)?, 'a');
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn with_entries<L: EntrySet>(entries: L) -> Result<Self, HetError> {
        let mut kv = Self::new();
        entries.add_to(&mut kv)?;
        Ok(kv)
    }

    pub fn id(&self) -> ContainerId {
        self.registry.id()
    }

    pub fn drop_policy(&self) -> DropPolicy {
        self.registry.drop_policy()
    }

    fn map<K: MapKey, V: 'static>(&self) -> Option<&HashMap<K, V>> {
        self.registry
            .get::<MapSlot<K, V>>(&slot_id::<K, V>())
            .map(|slot| &slot.entries)
    }

    fn map_mut<K: MapKey, V: 'static>(&mut self) -> Option<&mut HashMap<K, V>> {
        self.registry
            .get_mut::<MapSlot<K, V>>(&slot_id::<K, V>())
            .map(|slot| &mut slot.entries)
    }

    fn insert<K: MapKey, V: 'static>(
        &mut self,
        key: K,
        value: V,
        copier: Copier<V>,
    ) -> Result<(), HetError> {
        let slot = self
            .registry
            .register(slot_id::<K, V>(), || MapSlot::<K, V>::try_new(copier))?;
        slot.entries.try_reserve(1)?;
        if copier.is_some() {
            slot.copier = copier;
        }
        slot.entries.insert(key, value);
        Ok(())
    }

    /// Maps `key` to `value`, replacing any value of the same type under that key
    ///
    /// # Errors
    ///
    /// Returns `HetError::OutOfMemory` if the store cannot grow.
    pub fn add<K: MapKey, V: Clone + 'static>(&mut self, key: K, value: V) -> Result<(), HetError> {
        self.insert(key, value, Some(V::clone as fn(&V) -> V))
    }

    /// Maps `key` to a value that cannot be cloned
    pub fn add_unique<K: MapKey, V: 'static>(&mut self, key: K, value: V) -> Result<(), HetError> {
        self.insert(key, value, None)
    }

    /// Adds each `(key, value)` pair of the tuple
    pub fn add_entries<L: EntrySet>(&mut self, entries: L) -> Result<(), HetError> {
        entries.add_to(self)
    }

    /// Replaces the whole content with the pairs of the tuple
    pub fn assign_entries<L: EntrySet>(&mut self, entries: L) -> Result<(), HetError> {
        self.clear();
        entries.add_to(self)
    }

    /// The `V` stored under `key`
    ///
    /// # Errors
    ///
    /// - Returns `HetError::ValueNotFound` if no `V` was ever stored under a `K` key
    /// - Returns `HetError::KeyNotFound` if the map exists but `key` is not in it
    pub fn value<V: 'static, K: MapKey>(&self, key: &K) -> Result<&V, HetError> {
        self.map::<K, V>()
            .ok_or(HetError::ValueNotFound(type_name::<V>()))?
            .get(key)
            .ok_or_else(|| HetError::KeyNotFound(format!("{:?}", key)))
    }

    /// Mutable access to the `V` stored under `key`
    ///
    /// # Errors
    ///
    /// Same as [`value`](Self::value).
    pub fn value_mut<V: 'static, K: MapKey>(&mut self, key: &K) -> Result<&mut V, HetError> {
        self.map_mut::<K, V>()
            .ok_or(HetError::ValueNotFound(type_name::<V>()))?
            .get_mut(key)
            .ok_or_else(|| HetError::KeyNotFound(format!("{:?}", key)))
    }

    pub fn get<V: 'static, K: MapKey>(&self, key: &K) -> Option<&V> {
        self.map::<K, V>()?.get(key)
    }

    pub fn get_mut<V: 'static, K: MapKey>(&mut self, key: &K) -> Option<&mut V> {
        self.map_mut::<K, V>()?.get_mut(key)
    }

    /// Calls `f` with the `V` stored under `key`
    pub fn with<V, K, F, R>(&self, key: &K, f: F) -> Result<R, HetError>
    where
        V: 'static,
        K: MapKey,
        F: FnOnce(&V) -> R,
    {
        self.value::<V, K>(key).map(f)
    }

    /// Calls `f` with mutable access to the `V` stored under `key`
    pub fn with_mut<V, K, F, R>(&mut self, key: &K, f: F) -> Result<R, HetError>
    where
        V: 'static,
        K: MapKey,
        F: FnOnce(&mut V) -> R,
    {
        self.value_mut::<V, K>(key).map(f)
    }

    /// The `V` under `key`, storing `default` there first if absent
    ///
    /// ```
    /// use sovran_hetero::HeteroKeyValue;
    ///
    /// let mut kv = HeteroKeyValue::new();
    /// for word in ["a", "b", "a"] {
    ///     *kv.value_or_add(word, 0usize)? += 1;
    /// }
    /// assert_eq!(*kv.value::<usize, _>(&"a")?, 2);
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn value_or_add<K: MapKey, V: Clone + 'static>(
        &mut self,
        key: K,
        default: V,
    ) -> Result<&mut V, HetError> {
        if !self.contains_key::<V, K>(&key) {
            self.add(key.clone(), default)?;
        }
        self.value_mut::<V, K>(&key)
    }

    /// Whether a `K -> V` map exists, even an empty one
    pub fn contains<K: MapKey, V: 'static>(&self) -> bool {
        self.registry.contains(&slot_id::<K, V>())
    }

    /// Whether a `V` is stored under `key`
    pub fn contains_key<V: 'static, K: MapKey>(&self, key: &K) -> bool {
        self.map::<K, V>().is_some_and(|map| map.contains_key(key))
    }

    /// Removes the `V` stored under `key`. Returns whether there was one.
    pub fn erase_value<V: 'static, K: MapKey>(&mut self, key: &K) -> bool {
        self.map_mut::<K, V>()
            .and_then(|map| map.remove(key))
            .is_some()
    }

    /// Drops the whole `K -> V` map. Returns whether it existed.
    pub fn erase_map<K: MapKey, V: 'static>(&mut self) -> bool {
        self.registry.remove(&slot_id::<K, V>()).is_some()
    }

    /// Keys of the `K -> V` map, in no particular order
    pub fn keys<K: MapKey, V: 'static>(&self) -> impl Iterator<Item = &K> + '_ {
        self.map::<K, V>().into_iter().flat_map(|map| map.keys())
    }

    /// Total number of entries over all maps
    ///
    /// # Errors
    ///
    /// Returns `HetError::Overflow` if the sum does not fit in `usize`.
    pub fn size(&self) -> Result<usize, HetError> {
        self.registry.total_len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Removes every entry and every map
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Binds a visit over the `K -> T` maps of the listed value types
    ///
    /// ```
    /// use sovran_hetero::{HeteroKeyValue, VisitorReturn};
    ///
    /// let mut kv = HeteroKeyValue::new();
    /// kv.add(7u8, String::from("seven"))?;
    /// kv.add(7u16, String::from("other key type"))?;
    ///
    /// let mut seen = Vec::new();
    /// kv.visit::<u8, (String,)>().call(&mut |key: &u8, value: &String| {
    ///     seen.push(format!("{key}={value}"));
    ///     VisitorReturn::Continue
    /// });
    /// assert_eq!(seen, vec!["7=seven"]);
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn visit<K: MapKey, L>(&self) -> VisitEntries<'_, K, L> {
        VisitEntries::new(self)
    }

    pub(crate) fn visit_entries_of<K, T, V>(&self, visitor: &mut V) -> VisitorReturn
    where
        K: MapKey,
        T: 'static,
        V: EntryVisitor<K, T> + ?Sized,
    {
        let Some(map) = self.map::<K, T>() else {
            return VisitorReturn::Continue;
        };
        for (key, value) in map {
            if visitor.visit(key, value).is_break() {
                return VisitorReturn::Break;
            }
        }
        VisitorReturn::Continue
    }

    /// Binds a match over the `K -> T` maps of the listed value types
    ///
    /// ```
    /// use sovran_hetero::{HeteroKeyValue, Matcher};
    ///
    /// let mut kv = HeteroKeyValue::new();
    /// kv.add(1i32, 10u64)?;
    /// kv.add(2i32, 'c')?;
    ///
    /// let mut numbers = 0;
    /// let mut rest = Vec::new();
    /// let mut m = Matcher::for_entries()
    ///     .on_entry(|key: &i32, value: &u64| numbers += *key as u64 * *value)
    ///     .otherwise_entry(|key: &i32, _| rest.push(*key));
    /// assert!(!kv.match_types::<i32, (u64, char, bool)>().call(&mut m));
    /// drop(m);
    /// assert_eq!((numbers, rest), (10, vec![2]));
    /// # Ok::<(), sovran_hetero::HetError>(())
    /// ```
    pub fn match_types<K: MapKey, L: TypeList>(&self) -> MatchTypes<'_, K> {
        MatchTypes::new(
            L::type_ids()
                .into_iter()
                .map(|value_id| {
                    let slot = self.registry.get_erased(&(TypeId::of::<K>(), value_id));
                    (value_id, slot)
                })
                .collect(),
        )
    }

    /// References to the values of every listed type stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `HetError::UnboundedValue` if any listed type has no value under `key`.
    pub fn to_tuple<L: FetchTuple, K: MapKey>(&self, key: &K) -> Result<L::Refs<'_>, HetError> {
        L::from_entries(self, key)
    }

    /// References to the `V`s stored under each of `keys`, in order
    ///
    /// # Errors
    ///
    /// Returns `HetError::UnboundedValue` if any key has no `V`.
    ///
    /// ```
    /// use sovran_hetero::{HeteroKeyValue, HetError};
    ///
    /// let kv = HeteroKeyValue::with_entries(((1u8, 'a'), (2u8, 'b')))?;
    /// assert_eq!(kv.to_vector::<char, _>(&[2u8, 1])?, vec![&'b', &'a']);
    /// assert!(matches!(kv.to_vector::<char, _>(&[1u8, 3]), Err(HetError::UnboundedValue(_))));
    /// # Ok::<(), HetError>(())
    /// ```
    pub fn to_vector<V: 'static, K: MapKey>(&self, keys: &[K]) -> Result<Vec<&V>, HetError> {
        keys.iter()
            .map(|key| {
                self.get::<V, K>(key)
                    .ok_or(HetError::UnboundedValue(type_name::<V>()))
            })
            .collect()
    }

    /// Creates an independent copy with a new identity
    ///
    /// # Errors
    ///
    /// Returns `HetError::NotCloneable` if any value was stored with
    /// [`add_unique`](Self::add_unique).
    pub fn try_clone(&self) -> Result<Self, HetError> {
        Ok(Self {
            registry: self.registry.try_clone()?,
        })
    }

    /// Replaces the content of `self` with a copy of `other`. On error `self` is left
    /// unchanged.
    pub fn assign(&mut self, other: &HeteroKeyValue) -> Result<(), HetError> {
        let slots = other.registry.duplicate_slots()?;
        self.registry.replace_slots(slots, other.id());
        Ok(())
    }

    /// Replaces the content of `self` with the content of `other`, copying cloneable maps
    /// and moving move-only maps out of `other`
    pub fn assign_from(&mut self, other: &mut HeteroKeyValue) -> Result<(), HetError> {
        let slots = other.registry.absorb_slots()?;
        self.registry.replace_slots(slots, other.id());
        Ok(())
    }
}

impl Default for HeteroKeyValue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeteroKeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeteroKeyValue")
            .field("id", &self.id())
            .field("maps", &self.registry.len())
            .field("size", &self.size().ok())
            .finish()
    }
}
