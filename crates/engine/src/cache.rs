//! Per-(document, feature) computation cache.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

use crate::cancel::CancelGroup;
use crate::merge::Cancelled;

/// Shared handle to one merged computation.
///
/// Every caller asking for the same fingerprint receives a clone of the
/// same future; awaiting any clone drives the computation for all.
pub type MergedFuture<T> = Shared<BoxFuture<'static, Result<Vec<T>, Cancelled>>>;

/// Memoizes the latest merged computation for one (document, feature
/// kind) slot, keyed by a trigger fingerprint.
///
/// At most one computation is live per slot. An equal fingerprint reuses
/// the stored future, completed or not, so overlapping UI events never
/// duplicate remote calls. A different fingerprint cancels the previous
/// group and replaces the record; check-and-replace is atomic with
/// respect to concurrent `request` calls.
pub struct FeatureCache<K, T> {
	live: Mutex<Option<Live<K, T>>>,
}

struct Live<K, T> {
	fingerprint: K,
	group: CancelGroup,
	future: MergedFuture<T>,
}

impl<K, T> FeatureCache<K, T> {
	/// Create an empty cache slot.
	pub fn new() -> Self {
		Self {
			live: Mutex::new(None),
		}
	}

	/// Cancel the live computation and drop the record.
	///
	/// Used for explicit external cancellation (the user moved away).
	/// The next `request` with any fingerprint starts fresh.
	pub fn cancel(&self) {
		if let Some(record) = self.live.lock().take() {
			record.group.cancel();
		}
	}

	/// Whether a record is currently stored.
	pub fn has_live(&self) -> bool {
		self.live.lock().is_some()
	}
}

impl<K: PartialEq, T> FeatureCache<K, T> {
	/// Return the computation for `fingerprint`, starting one if needed.
	///
	/// `compute` builds the merged future under a fresh group. It runs
	/// synchronously while the slot lock is held and must not block:
	/// selection and dispatch are pure bookkeeping, the I/O happens
	/// inside the returned future.
	pub fn request<F>(&self, fingerprint: K, compute: F) -> MergedFuture<T>
	where
		T: Clone,
		F: FnOnce(&CancelGroup) -> BoxFuture<'static, Result<Vec<T>, Cancelled>>,
	{
		let mut live = self.live.lock();

		if let Some(record) = live.as_ref()
			&& record.fingerprint == fingerprint
		{
			return record.future.clone();
		}

		if let Some(previous) = live.take() {
			previous.group.cancel();
		}

		let group = CancelGroup::new();
		let future = compute(&group).shared();
		*live = Some(Live {
			fingerprint,
			group,
			future: future.clone(),
		});
		future
	}

	/// Fingerprint of the live record, if any.
	pub fn fingerprint(&self) -> Option<K>
	where
		K: Clone,
	{
		self.live.lock().as_ref().map(|record| record.fingerprint.clone())
	}
}

impl<K, T> Default for FeatureCache<K, T> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use futures::FutureExt;

	use super::*;

	fn ready(items: Vec<u32>) -> BoxFuture<'static, Result<Vec<u32>, Cancelled>> {
		std::future::ready(Ok(items)).boxed()
	}

	#[tokio::test]
	async fn test_equal_fingerprint_reuses_computation() {
		let cache = FeatureCache::<u64, u32>::new();
		let computed = Arc::new(AtomicUsize::new(0));

		let counted = |items: Vec<u32>| {
			let computed = computed.clone();
			move |_: &CancelGroup| {
				computed.fetch_add(1, Ordering::SeqCst);
				ready(items)
			}
		};

		let first = cache.request(5, counted(vec![1]));
		let second = cache.request(5, counted(vec![2]));

		assert!(first.ptr_eq(&second));
		assert_eq!(computed.load(Ordering::SeqCst), 1);
		assert_eq!(first.await, Ok(vec![1]));
	}

	#[tokio::test]
	async fn test_completed_record_stays_cached() {
		let cache = FeatureCache::<u64, u32>::new();

		let first = cache.request(5, |_| ready(vec![1]));
		assert_eq!(first.await, Ok(vec![1]));

		let again = cache.request(5, |_| ready(vec![9]));
		assert_eq!(again.await, Ok(vec![1]));
	}

	#[tokio::test]
	async fn test_changed_fingerprint_cancels_previous_group() {
		let cache = FeatureCache::<u64, u32>::new();
		let first_group = Arc::new(Mutex::new(None::<CancelGroup>));

		let capture = first_group.clone();
		let _first = cache.request(5, move |group| {
			*capture.lock() = Some(group.clone());
			std::future::pending().boxed()
		});

		let second = cache.request(9, |_| ready(vec![2]));

		let captured = first_group.lock().clone().unwrap();
		assert!(captured.is_cancelled());
		assert_eq!(cache.fingerprint(), Some(9));
		assert_eq!(second.await, Ok(vec![2]));
	}

	#[test]
	fn test_cancel_drops_record() {
		let cache = FeatureCache::<u64, u32>::new();
		let _live = cache.request(5, |_| std::future::pending().boxed());

		assert!(cache.has_live());
		cache.cancel();
		assert!(!cache.has_live());
		assert_eq!(cache.fingerprint(), None);
	}

	#[tokio::test]
	async fn test_request_after_cancel_starts_fresh() {
		let cache = FeatureCache::<u64, u32>::new();
		let computed = Arc::new(AtomicUsize::new(0));

		let counted = || {
			let computed = computed.clone();
			move |_: &CancelGroup| {
				computed.fetch_add(1, Ordering::SeqCst);
				ready(vec![1])
			}
		};

		let _first = cache.request(5, counted());
		cache.cancel();
		let second = cache.request(5, counted());

		assert_eq!(computed.load(Ordering::SeqCst), 2);
		assert_eq!(second.await, Ok(vec![1]));
	}
}
