//! Lazily materialized result slots.

use std::sync::OnceLock;
use std::time::Duration;

use parking_lot::Mutex;

use crate::Error;
use crate::cache::MergedFuture;
use crate::progress::ProgressSignal;
use crate::wait::{WaitOutcome, wait_merged};

/// State of one lazy slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState<T> {
	/// The backing computation finished and this index holds a value.
	Ready(T),
	/// The backing computation finished; nothing exists at this index.
	KnownAbsent,
	/// The backing computation has not settled yet.
	NotYetKnown,
}

type Thunk<T> = Box<dyn FnOnce() -> MergedFuture<T> + Send>;

/// A fixed number of placeholder result slots over one shared computation.
///
/// UI layers eagerly construct an affordance per candidate slot but only
/// a fraction are ever invoked, so the backing computation is paid for on
/// the first `slot_at` call rather than at construction. All slots share
/// the one computation; probing many slots costs one fan-out total.
pub struct LazySlots<T> {
	capacity: usize,
	backing: OnceLock<MergedFuture<T>>,
	thunk: Mutex<Option<Thunk<T>>>,
}

impl<T: Clone> LazySlots<T> {
	/// Create a provider with `capacity` slots backed by `thunk`.
	///
	/// `thunk` typically requests a computation from a feature cache. It
	/// runs at most once, on the first slot access, regardless of how
	/// many slots race to materialize it.
	pub fn new(capacity: usize, thunk: impl FnOnce() -> MergedFuture<T> + Send + 'static) -> Self {
		Self {
			capacity,
			backing: OnceLock::new(),
			thunk: Mutex::new(Some(Box::new(thunk))),
		}
	}

	/// The fixed number of slots.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Whether the backing computation has been materialized.
	pub fn materialized(&self) -> bool {
		self.backing.get().is_some()
	}

	fn backing(&self) -> &MergedFuture<T> {
		self.backing.get_or_init(|| {
			let thunk = self
				.thunk
				.lock()
				.take()
				.expect("thunk consumed only by single initialization");
			thunk()
		})
	}

	/// Inspect slot `index` without blocking.
	///
	/// Materializes the backing computation on first use but does not
	/// drive it; a slot stays `NotYetKnown` until some caller awaits the
	/// shared future (for instance through [`Self::wait_for`]).
	pub fn slot_at(&self, index: usize) -> crate::Result<SlotState<T>> {
		if index >= self.capacity {
			return Err(Error::SlotOutOfRange {
				index,
				capacity: self.capacity,
			});
		}

		Ok(match self.backing().peek() {
			Some(Ok(items)) => match items.get(index) {
				Some(item) => SlotState::Ready(item.clone()),
				None => SlotState::KnownAbsent,
			},
			// A cancelled backing never produces values; show empty slots.
			Some(Err(_)) => SlotState::KnownAbsent,
			None => SlotState::NotYetKnown,
		})
	}

	/// Wait (bounded) for slot `index` to settle.
	///
	/// Checks `signal` cooperatively and abandons the wait when it fires
	/// or the deadline passes, reporting `NotYetKnown`. The backing
	/// computation keeps running either way; a later call can pick up its
	/// result.
	pub async fn wait_for(
		&self,
		index: usize,
		signal: &dyn ProgressSignal,
		timeout: Duration,
	) -> crate::Result<SlotState<T>> {
		if index >= self.capacity {
			return Err(Error::SlotOutOfRange {
				index,
				capacity: self.capacity,
			});
		}

		let backing = self.backing().clone();
		Ok(match wait_merged(backing, signal, timeout).await {
			WaitOutcome::Completed(items) => match items.into_iter().nth(index) {
				Some(item) => SlotState::Ready(item),
				None => SlotState::KnownAbsent,
			},
			WaitOutcome::Cancelled => SlotState::KnownAbsent,
			WaitOutcome::Abandoned => SlotState::NotYetKnown,
		})
	}
}
