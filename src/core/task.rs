//! Background request execution polled from the UI thread

use std::future::Future;

use eframe::egui;
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Outcome of polling a [`Pending`] task
#[derive(Debug, PartialEq, Eq)]
pub enum TaskStatus<T> {
    /// Still running
    Running,
    /// Finished with a value
    Ready(T),
    /// The task went away without producing a value
    Lost,
}

/// Handle to a value being produced on the runtime
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Pending<T> {
    /// Check for a result without blocking
    pub fn poll(&mut self) -> TaskStatus<T> {
        match self.rx.try_recv() {
            Ok(value) => TaskStatus::Ready(value),
            Err(TryRecvError::Empty) => TaskStatus::Running,
            Err(TryRecvError::Closed) => TaskStatus::Lost,
        }
    }
}

/// Spawns futures on the app runtime and wakes the UI when they finish
#[derive(Clone)]
pub struct Spawner {
    handle: Handle,
    ctx: egui::Context,
}

impl Spawner {
    pub fn new(handle: Handle, ctx: egui::Context) -> Self {
        Self { handle, ctx }
    }

    /// Run `fut` in the background
    pub fn spawn<T, F>(&self, fut: F) -> Pending<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let ctx = self.ctx.clone();
        self.handle.spawn(async move {
            let value = fut.await;
            if tx.send(value).is_err() {
                tracing::debug!("Discarding result for a view that was left");
            }
            ctx.request_repaint();
        });
        Pending { rx }
    }
}
