//! Animation-frame waits.
//!
//! Each wait is a single-resolution future backed by a
//! [`futures::channel::oneshot`] channel. The host drives frames by
//! calling [`FrameScheduler::tick`].

use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::trace;

/// Pending waits for the next animation frame
#[derive(Debug, Default)]
pub struct FrameScheduler {
    frame: u64,
    waiters: Vec<oneshot::Sender<u64>>,
}

impl FrameScheduler {
    /// Create a scheduler at frame zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames ticked so far
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of waits not yet resolved
    #[must_use]
    pub fn pending(&self) -> usize {
        self.waiters.len()
    }

    /// Future resolved with the frame number on the next [`tick`](Self::tick)
    pub fn request_frame(&mut self) -> NextFrame {
        let (tx, rx) = oneshot::channel();
        self.waiters.push(tx);
        NextFrame { rx }
    }

    /// Advance one frame and resolve every wait registered before this call
    pub fn tick(&mut self) -> u64 {
        self.frame += 1;
        let waiters = std::mem::take(&mut self.waiters);
        trace!(frame = self.frame, resolved = waiters.len(), "animation frame");
        for tx in waiters {
            // A dropped receiver just means nobody is waiting any more.
            let _ = tx.send(self.frame);
        }
        self.frame
    }
}

/// Wait for one animation frame.
///
/// Resolves to `Some(frame)`, or `None` if the scheduler was dropped first.
#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct NextFrame {
    rx: oneshot::Receiver<u64>,
}

impl Future for NextFrame {
    type Output = Option<u64>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::FutureExt;

    #[test]
    fn test_unresolved_before_tick() {
        let mut scheduler = FrameScheduler::new();
        let mut wait = scheduler.request_frame();
        assert_eq!((&mut wait).now_or_never(), None);
        scheduler.tick();
        assert_eq!(block_on(wait), Some(1));
    }

    #[test]
    fn test_tick_resolves_all_pending() {
        let mut scheduler = FrameScheduler::new();
        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        assert_eq!(scheduler.pending(), 2);
        scheduler.tick();
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(block_on(a), Some(1));
        assert_eq!(block_on(b), Some(1));
    }

    #[test]
    fn test_later_request_waits_for_next_tick() {
        let mut scheduler = FrameScheduler::new();
        scheduler.tick();
        let wait = scheduler.request_frame();
        assert_eq!(scheduler.tick(), 2);
        assert_eq!(block_on(wait), Some(2));
    }

    #[test]
    fn test_dropped_scheduler_resolves_none() {
        let mut scheduler = FrameScheduler::new();
        let wait = scheduler.request_frame();
        drop(scheduler);
        assert_eq!(block_on(wait), None);
    }

    #[test]
    fn test_dropped_wait_is_harmless() {
        let mut scheduler = FrameScheduler::new();
        drop(scheduler.request_frame());
        assert_eq!(scheduler.tick(), 1);
    }
}
