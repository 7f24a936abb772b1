//! Scheduler subsystem. Handles deferred and periodic async tasks with
//! keyed deduplication and retry with exponential backoff.

use async_trait::async_trait;
use chrono::{Timelike, Utc};
use parking_lot::Mutex;
use std::{
	fmt::Debug,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
	time::Duration,
};
use tokio::sync::Notify;

use crate::prelude::*;

pub type TaskId = u64;

/// Longest the run loop sleeps without re-checking the queue
const IDLE_POLL_SECS: u64 = 60;

#[async_trait]
pub trait Task<S: Clone>: Send + Sync + Debug {
	fn kind() -> &'static str
	where
		Self: Sized;

	fn kind_of(&self) -> &'static str;

	async fn run(&self, state: &S) -> IgResult<()>;
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
	wait_min_max: (u64, u64),
	times: u16,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self { wait_min_max: (60, 3600), times: 10 }
	}
}

impl RetryPolicy {
	/// Create a new RetryPolicy with custom min/max backoff and number of retries
	pub fn new(wait_min_max: (u64, u64), times: u16) -> Self {
		Self { wait_min_max, times }
	}

	/// Calculate exponential backoff in seconds: min * (2^attempt), capped at max
	pub fn calculate_backoff(&self, attempt_count: u16) -> u64 {
		let (min, max) = self.wait_min_max;
		let backoff = min.saturating_mul(1u64 << u64::from(attempt_count.min(32)));
		backoff.min(max)
	}

	/// Check if we should continue retrying
	pub fn should_retry(&self, attempt_count: u16) -> bool {
		attempt_count < self.times
	}
}

struct Entry<S: Clone> {
	id: TaskId,
	task: Arc<dyn Task<S>>,
	key: Option<String>,
	next_at: Timestamp,
	retry: Option<RetryPolicy>,
	attempts: u16,
	daily_at: Option<(u8, u8)>,
}

pub struct Scheduler<S: Clone> {
	queue: Mutex<Vec<Entry<S>>>,
	last_id: AtomicU64,
	notify: Notify,
}

impl<S: Clone + Send + Sync + 'static> Scheduler<S> {
	pub fn new() -> Arc<Self> {
		Arc::new(Self { queue: Mutex::new(Vec::new()), last_id: AtomicU64::new(0), notify: Notify::new() })
	}

	/// Fluent scheduling API:
	/// `scheduler.task(t).key("email:1").with_retry(policy).schedule()`
	pub fn task(self: &Arc<Self>, task: Arc<dyn Task<S>>) -> TaskSchedulerBuilder<S> {
		TaskSchedulerBuilder::new(Arc::clone(self), task)
	}

	/// Starts the run loop. Called once after the state is fully built.
	pub fn start(self: &Arc<Self>, state: S) {
		let scheduler = Arc::clone(self);
		tokio::spawn(async move {
			loop {
				let now = Timestamp::now();
				let due: Vec<Entry<S>> = {
					let mut queue = scheduler.queue.lock();
					let mut due = Vec::new();
					let mut i = 0;
					while i < queue.len() {
						if queue[i].next_at <= now {
							due.push(queue.swap_remove(i));
						} else {
							i += 1;
						}
					}
					due
				};

				for entry in due {
					scheduler.spawn_task(state.clone(), entry);
				}

				let wait = {
					let queue = scheduler.queue.lock();
					queue
						.iter()
						.map(|e| (e.next_at.0 - Timestamp::now().0).max(0) as u64)
						.min()
						.unwrap_or(IDLE_POLL_SECS)
						.min(IDLE_POLL_SECS)
				};

				tokio::select! {
					() = tokio::time::sleep(Duration::from_secs(wait.max(1))) => {}
					() = scheduler.notify.notified() => {}
				}
			}
		});
	}

	fn spawn_task(self: &Arc<Self>, state: S, mut entry: Entry<S>) {
		let scheduler = Arc::clone(self);
		tokio::spawn(async move {
			let kind = entry.task.kind_of();
			debug!("Running task {} ({})", entry.id, kind);

			match entry.task.run(&state).await {
				Ok(()) => {
					if let Some((hour, minute)) = entry.daily_at {
						entry.attempts = 0;
						entry.next_at = next_daily_occurrence(hour, minute);
						scheduler.requeue(entry);
					}
				}
				Err(err) => {
					warn!("Task {} ({}) failed: {}", entry.id, kind, err);
					let retry = entry.retry.clone();
					match retry {
						Some(policy) if policy.should_retry(entry.attempts) => {
							let backoff = policy.calculate_backoff(entry.attempts);
							entry.attempts += 1;
							entry.next_at = Timestamp::from_now(backoff as i64);
							info!(
								"Retrying task {} in {}s (attempt {})",
								entry.id, backoff, entry.attempts
							);
							scheduler.requeue(entry);
						}
						_ => {
							// Periodic tasks survive a failed run
							if let Some((hour, minute)) = entry.daily_at {
								entry.attempts = 0;
								entry.next_at = next_daily_occurrence(hour, minute);
								scheduler.requeue(entry);
							} else {
								error!("Task {} ({}) exhausted its retries", entry.id, kind);
							}
						}
					}
				}
			}
		});
	}

	fn requeue(&self, entry: Entry<S>) {
		self.queue.lock().push(entry);
		self.notify.notify_one();
	}

	fn enqueue(
		&self,
		task: Arc<dyn Task<S>>,
		key: Option<String>,
		next_at: Timestamp,
		retry: Option<RetryPolicy>,
		daily_at: Option<(u8, u8)>,
	) -> TaskId {
		let mut queue = self.queue.lock();

		// Keyed tasks replace a pending entry with the same key
		if let Some(ref key) = key {
			if let Some(existing) = queue.iter_mut().find(|e| e.key.as_deref() == Some(key)) {
				existing.task = task;
				existing.next_at = next_at;
				existing.retry = retry;
				existing.attempts = 0;
				existing.daily_at = daily_at;
				self.notify.notify_one();
				return existing.id;
			}
		}

		let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
		queue.push(Entry { id, task, key, next_at, retry, attempts: 0, daily_at });
		drop(queue);
		self.notify.notify_one();
		id
	}

	/// Number of pending entries (test/introspection hook)
	pub fn pending(&self) -> usize {
		self.queue.lock().len()
	}
}

/// Next `hour:minute` UTC, today or tomorrow
fn next_daily_occurrence(hour: u8, minute: u8) -> Timestamp {
	let now = Utc::now();
	let today = now
		.with_hour(u32::from(hour))
		.and_then(|t| t.with_minute(u32::from(minute)))
		.and_then(|t| t.with_second(0))
		.unwrap_or(now);

	if today > now {
		Timestamp(today.timestamp())
	} else {
		Timestamp(today.timestamp() + 86400)
	}
}

// TaskSchedulerBuilder - Fluent API for task scheduling
//*******************************************************
pub struct TaskSchedulerBuilder<S: Clone> {
	scheduler: Arc<Scheduler<S>>,
	task: Arc<dyn Task<S>>,
	key: Option<String>,
	next_at: Option<Timestamp>,
	retry: Option<RetryPolicy>,
	daily_at: Option<(u8, u8)>,
}

impl<S: Clone + Send + Sync + 'static> TaskSchedulerBuilder<S> {
	fn new(scheduler: Arc<Scheduler<S>>, task: Arc<dyn Task<S>>) -> Self {
		Self { scheduler, task, key: None, next_at: None, retry: None, daily_at: None }
	}

	/// Set a string key for task deduplication
	pub fn key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Schedule after a relative delay (in seconds)
	pub fn schedule_after(mut self, seconds: i64) -> Self {
		self.next_at = Some(Timestamp::from_now(seconds));
		self
	}

	/// Enable automatic retry with exponential backoff
	pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
		self.retry = Some(policy);
		self
	}

	/// Run daily at the given UTC time.
	/// Example: `.daily_at(3, 0)` for 3 AM daily
	pub fn daily_at(mut self, hour: u8, minute: u8) -> Self {
		if hour <= 23 && minute <= 59 {
			self.daily_at = Some((hour, minute));
			self.next_at = Some(next_daily_occurrence(hour, minute));
		}
		self
	}

	pub async fn schedule(self) -> IgResult<TaskId> {
		let next_at = self.next_at.unwrap_or_else(Timestamp::now);
		Ok(self.scheduler.enqueue(self.task, self.key, next_at, self.retry, self.daily_at))
	}
}


// vim: ts=4
