/// Inter-batch throttling shared by every sweep
use super::shutdown::ShutdownSignal;
use std::time::Duration;

#[derive(Clone)]
pub struct BatchPacer {
    delay: Duration,
    shutdown: ShutdownSignal,
}

impl BatchPacer {
    pub fn new(delay: Duration, shutdown: ShutdownSignal) -> Self {
        Self { delay, shutdown }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Pause after batch `index` (0-based) of `total`.
    ///
    /// No delay follows the final batch. Returns `false` when the sweep
    /// should stop because shutdown was requested.
    pub async fn pause(&self, index: usize, total: usize) -> bool {
        if self.shutdown.is_triggered() {
            return false;
        }
        if index + 1 >= total || self.delay.is_zero() {
            return true;
        }

        tokio::select! {
            _ = tokio::time::sleep(self.delay) => true,
            _ = self.shutdown.cancelled() => false,
        }
    }
}

/// Split `items` into consecutive chunks of at most `size` (minimum 1)
pub fn chunk_mints(items: &[String], size: usize) -> Vec<&[String]> {
    items.chunks(size.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mints(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Mint{}", i)).collect()
    }

    #[test]
    fn test_chunking_covers_every_mint_once() {
        for (n, b) in [(0, 50), (1, 50), (50, 50), (51, 50), (120, 50), (7, 3)] {
            let items = mints(n);
            let chunks = chunk_mints(&items, b);
            assert_eq!(chunks.len(), (n + b - 1) / b, "n={} b={}", n, b);
            let flat: Vec<String> = chunks.concat();
            assert_eq!(flat, items);
        }
        assert_eq!(chunk_mints(&mints(3), 0).len(), 3);
    }

    #[tokio::test]
    async fn test_no_delay_after_final_batch() {
        tokio::time::pause();
        let pacer = BatchPacer::new(Duration::from_millis(500), ShutdownSignal::new());
        let start = tokio::time::Instant::now();

        assert!(pacer.pause(0, 2).await);
        let after_first = start.elapsed();
        assert!(after_first >= Duration::from_millis(500));

        assert!(pacer.pause(1, 2).await);
        assert_eq!(start.elapsed(), after_first);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_sleep() {
        tokio::time::pause();
        let shutdown = ShutdownSignal::new();
        let pacer = BatchPacer::new(Duration::from_secs(60), shutdown.clone());

        let trigger = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            shutdown.trigger();
        });

        let start = tokio::time::Instant::now();
        assert!(!pacer.pause(0, 3).await);
        assert!(start.elapsed() < Duration::from_secs(60));
        trigger.await.unwrap();

        // Once triggered, even the final batch reports stop
        assert!(!pacer.pause(2, 3).await);
    }
}
