//! Rolling-window limit on job starts.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Limits how many jobs may start within one rolling window.
///
/// Independent of the concurrency bound: even with free executors, no more
/// than `max_starts` jobs begin inside any window-sized interval.
pub(crate) struct StartThrottle {
    max_starts: usize,
    window: Duration,
    starts: Mutex<VecDeque<Instant>>,
}

impl StartThrottle {
    /// Creates a throttle allowing `max_starts` starts per `window`.
    pub fn new(max_starts: usize, window: Duration) -> Self {
        Self {
            max_starts: max_starts.max(1),
            window,
            starts: Mutex::new(VecDeque::new()),
        }
    }

    /// Waits until another job may start, then records the start.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut starts = self
                    .starts
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);

                let now = Instant::now();
                while let Some(oldest) = starts.front() {
                    if now.duration_since(*oldest) >= self.window {
                        starts.pop_front();
                    } else {
                        break;
                    }
                }

                if starts.len() < self.max_starts {
                    starts.push_back(now);
                    return;
                }

                match starts.front() {
                    Some(oldest) => self.window.saturating_sub(now.duration_since(*oldest)),
                    None => return,
                }
            };

            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn allows_a_full_window_immediately() {
        let throttle = StartThrottle::new(5, Duration::from_secs(1));

        let before = Instant::now();
        for _ in 0..5 {
            throttle.acquire().await;
        }
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn sixth_start_waits_for_the_window() {
        let throttle = StartThrottle::new(5, Duration::from_secs(1));

        for _ in 0..5 {
            throttle.acquire().await;
        }

        let before = Instant::now();
        throttle.acquire().await;
        assert!(before.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn window_frees_up_over_time() {
        let throttle = StartThrottle::new(2, Duration::from_secs(1));

        throttle.acquire().await;
        throttle.acquire().await;
        tokio::time::advance(Duration::from_secs(2)).await;

        let before = Instant::now();
        throttle.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
