//! Worker pool. Runs synchronous CPU-bound jobs (password hashing) on
//! dedicated threads, keeping them off the async runtime.

use flume::{Receiver, Sender};
use futures::channel::oneshot;
use std::{sync::Arc, thread};

use crate::prelude::*;

#[derive(Debug)]
pub struct WorkerPool {
	tx: Sender<Box<dyn FnOnce() + Send>>,
}

impl WorkerPool {
	pub fn new(threads: usize) -> Self {
		let (tx, rx) = flume::unbounded();
		let rx: JobQueue = Arc::new(rx);

		for _ in 0..threads.max(1) {
			let rx = Arc::clone(&rx);
			thread::spawn(move || worker_loop(&rx));
		}

		Self { tx }
	}

	/// Submit a closure, returns a Future for its result
	pub fn run<F, T>(&self, f: F) -> impl std::future::Future<Output = IgResult<T>>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		let (res_tx, res_rx) = oneshot::channel();

		let job = Box::new(move || {
			let result = f();
			let _ignore = res_tx.send(result);
		});

		if self.tx.send(job).is_err() {
			error!("Failed to send job to worker queue");
		}

		async move {
			res_rx.await.map_err(|_| {
				error!("Worker dropped result channel (task may have panicked)");
				Error::Internal("worker task failed".into())
			})
		}
	}

	/// Like `run`, but flattens `IgResult<IgResult<T>>` into `IgResult<T>`.
	/// Use when the closure itself returns `IgResult<T>`.
	pub fn try_run<F, T>(&self, f: F) -> impl std::future::Future<Output = IgResult<T>>
	where
		F: FnOnce() -> IgResult<T> + Send + 'static,
		T: Send + 'static,
	{
		let fut = self.run(f);
		async move { fut.await? }
	}
}

type JobQueue = Arc<Receiver<Box<dyn FnOnce() + Send>>>;

fn worker_loop(rx: &JobQueue) {
	while let Ok(job) = rx.recv() {
		if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
			error!("Worker thread caught panic: {:?}", e);
		}
	}
}


// vim: ts=4
