//! Encode progress reported through `tracing`.

use tri_fractal::{Channel, EncodeProgress, TreeStats, TriangleId};

/// Logs every processed triangle at trace level and a summary line at info
/// level every `interval` triangles.
#[derive(Debug)]
pub struct LogProgress {
    interval: usize,
    processed: usize,
}

impl LogProgress {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            processed: 0,
        }
    }

    /// Triangles processed across all channels so far.
    pub fn processed(&self) -> usize {
        self.processed
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl EncodeProgress for LogProgress {
    fn channel_started(&mut self, channel: Channel) {
        tracing::info!(?channel, "Encoding channel");
    }

    fn triangle_processed(
        &mut self,
        channel: Channel,
        id: TriangleId,
        terminal: bool,
        pending: usize,
        total: usize,
    ) {
        self.processed += 1;
        let done = total.saturating_sub(pending);
        let percent = if total == 0 {
            100.0
        } else {
            done as f64 * 100.0 / total as f64
        };
        tracing::trace!(
            ?channel,
            id = id.raw(),
            action = if terminal { "terminal" } else { "subdivided" },
            pending,
            total,
            "Triangle processed"
        );
        if self.processed % self.interval == 0 {
            tracing::info!(
                ?channel,
                pending,
                total,
                percent = format_args!("{percent:.1}"),
                "Encoding progress"
            );
        }
    }

    fn channel_finished(&mut self, channel: Channel, stats: &TreeStats) {
        tracing::info!(?channel, %stats, "Channel finished");
    }
}
