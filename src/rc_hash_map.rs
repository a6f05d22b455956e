use core::{
	borrow::Borrow,
	hash::{BuildHasher, Hash},
};
use hashbrown::{
	hash_map::{DefaultHashBuilder, DrainFilter, Entry},
	HashMap,
};
use num_traits::{CheckedAdd, CheckedSub, One, Zero};

/// A map whose entries are reference-counted by `C`, and only dropped in bulk through [`drain_weak`](`RcHashMap::drain_weak`).
///
/// Entries whose count dropped to zero stay available for reuse until then.
pub struct RcHashMap<K, C, V, S = DefaultHashBuilder>(HashMap<K, (C, V), S>)
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: BuildHasher;
impl<K, C, V, S> Default for RcHashMap<K, C, V, S>
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: Default + BuildHasher,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, C, V, S> RcHashMap<K, C, V, S>
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: BuildHasher,
{
	#[must_use]
	pub fn new() -> Self
	where
		S: Default,
	{
		Self(HashMap::with_hasher(S::default()))
	}

	/// Increments the count for `k`, inserting `v()` with a count of one if there is no entry yet.
	pub fn increment_or_insert_with<F: FnOnce() -> V>(&mut self, k: K, v: F) -> Result<&mut V, CountSaturatedError> {
		match self.0.entry(k) {
			Entry::Occupied(occupied) => {
				let (c, v) = occupied.into_mut();
				*c = c.checked_add(&C::one()).ok_or(CountSaturatedError)?;
				Ok(v)
			}
			Entry::Vacant(vacant) => {
				let (_, v) = vacant.insert((C::one(), v()));
				Ok(v)
			}
		}
	}

	/// Decrements the count for `k` without dropping the entry.
	///
	/// Fails if the count is already zero.
	pub fn weak_decrement<Q: ?Sized>(&mut self, k: &Q) -> Result<Option<&mut V>, CountSaturatedError>
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		match self.0.get_mut(k) {
			Some((c, v)) => {
				*c = c.checked_sub(&C::one()).ok_or(CountSaturatedError)?;
				Ok(Some(v))
			}
			None => Ok(None),
		}
	}

	pub fn drain_weak(&mut self) -> DrainWeak<'_, K, C, V> {
		DrainWeak(self.0.drain_filter(is_weak::<K, C, V> as fn(&K, &mut (C, V)) -> bool))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn capacity(&self) -> usize {
		self.0.capacity()
	}
}

fn is_weak<K, C: Zero, V>(_: &K, (c, _): &mut (C, V)) -> bool {
	c.is_zero()
}

/// Yields the entries of an [`RcHashMap`] whose count is zero, removing them.
pub struct DrainWeak<'a, K, C, V>(DrainFilter<'a, K, (C, V), fn(&K, &mut (C, V)) -> bool>);
impl<'a, K, C, V> Iterator for DrainWeak<'a, K, C, V> {
	type Item = (K, V);

	fn next(&mut self) -> Option<Self::Item> {
		self.0.next().map(|(k, (_, v))| (k, v))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.0.size_hint()
	}
}

/// A count would have overflowed, or dropped below zero.
#[derive(Debug)]
pub struct CountSaturatedError;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn weak_entries_survive_until_drained() {
		let mut map = RcHashMap::<&str, u8, u32>::new();
		*map.increment_or_insert_with("a", || 1).unwrap() += 10;
		map.increment_or_insert_with("a", || unreachable!()).unwrap();
		map.increment_or_insert_with("b", || 2).unwrap();

		assert_eq!(map.weak_decrement("a").unwrap().copied(), Some(11));
		assert_eq!(map.weak_decrement("b").unwrap().copied(), Some(2));
		assert_eq!(map.drain_weak().collect::<Vec<_>>(), [("b", 2)]);
		assert_eq!(map.len(), 1);

		assert!(map.weak_decrement("a").is_ok());
		assert!(map.weak_decrement("a").is_err());
		assert_eq!(map.drain_weak().count(), 1);
		assert_eq!(map.len(), 0);
	}

	#[test]
	fn count_saturates() {
		let mut map = RcHashMap::<u8, u8, ()>::new();
		for _ in 0..u8::MAX {
			map.increment_or_insert_with(0, || ()).unwrap();
		}
		assert!(map.increment_or_insert_with(0, || ()).is_err());
	}
}
