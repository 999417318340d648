//! Keyed debounce scheduling.
//!
//! [`Debouncer`] keeps at most one armed timer per key. Scheduling a key that
//! already has a pending timer cancels that timer and arms a fresh one, so a
//! burst of requests arriving faster than the delay runs exactly one task:
//! the one handed to the last request.
//!
//! # Table hygiene
//!
//! A timer removes its own entry from the table right before running its
//! task, and only if the entry still carries the timer's ticket. Replaced or
//! cancelled timers never touch the table, and fired timers never linger.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{GenerationClock, TaskClass, spawn};

/// Default quiet period before a debounced task runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
struct PendingTimer {
	ticket: u64,
	cancel: CancellationToken,
}

type TimerTable<K> = Arc<Mutex<HashMap<K, PendingTimer>>>;

/// Coalesces bursts of requests per key into a single delayed task.
pub struct Debouncer<K> {
	timers: TimerTable<K>,
	tickets: GenerationClock,
	class: TaskClass,
}

impl<K> fmt::Debug for Debouncer<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Debouncer")
			.field("pending", &self.timers.lock().len())
			.field("class", &self.class)
			.finish()
	}
}

impl<K> Default for Debouncer<K>
where
	K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
{
	fn default() -> Self {
		Self::new(TaskClass::Background)
	}
}

impl<K> Debouncer<K>
where
	K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
{
	/// Creates an empty debouncer whose tasks are spawned with `class`.
	pub fn new(class: TaskClass) -> Self {
		Self {
			timers: Arc::new(Mutex::new(HashMap::new())),
			tickets: GenerationClock::new(),
			class,
		}
	}

	/// Schedules `task` to run once `delay` elapses without another request for `key`.
	///
	/// Any pending timer for `key` is cancelled first. Outside a tokio runtime
	/// the timer runs on the shared worker runtime (see [`spawn`]).
	pub fn schedule<F>(&self, key: K, delay: Duration, task: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let ticket = self.tickets.next();
		let cancel = CancellationToken::new();
		let deadline = tokio::time::Instant::now() + delay;

		let previous = self.timers.lock().insert(
			key.clone(),
			PendingTimer {
				ticket,
				cancel: cancel.clone(),
			},
		);
		if let Some(previous) = previous {
			previous.cancel.cancel();
			trace!(key = ?key, replaced = previous.ticket, ticket, "worker.debounce.replaced");
		}

		let timers = Arc::clone(&self.timers);
		spawn(self.class, async move {
			tokio::select! {
				biased;
				_ = cancel.cancelled() => return,
				_ = tokio::time::sleep_until(deadline) => {}
			}

			{
				let mut timers = timers.lock();
				match timers.get(&key) {
					Some(current) if current.ticket == ticket => {
						timers.remove(&key);
					}
					_ => return,
				}
			}

			trace!(key = ?key, ticket, "worker.debounce.fired");
			task.await;
		});
	}

	/// Cancels the pending timer for `key`. Returns true if one was pending.
	pub fn cancel(&self, key: &K) -> bool {
		match self.timers.lock().remove(key) {
			Some(timer) => {
				timer.cancel.cancel();
				true
			}
			None => false,
		}
	}

	/// Cancels every pending timer.
	pub fn cancel_all(&self) -> usize {
		let drained: Vec<_> = self.timers.lock().drain().map(|(_, timer)| timer).collect();
		for timer in &drained {
			timer.cancel.cancel();
		}
		drained.len()
	}

	/// Returns true if `key` has an armed timer.
	pub fn is_pending(&self, key: &K) -> bool {
		self.timers.lock().contains_key(key)
	}

	/// Number of armed timers.
	pub fn pending_count(&self) -> usize {
		self.timers.lock().len()
	}
}

impl<K> Drop for Debouncer<K> {
	fn drop(&mut self) {
		for (_, timer) in self.timers.lock().drain() {
			timer.cancel.cancel();
		}
	}
}
