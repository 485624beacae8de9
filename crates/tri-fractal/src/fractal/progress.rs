//! Encode progress reporting.

use crate::image::Channel;
use crate::tree::TreeStats;
use crate::triangle::TriangleId;

/// Receives events while [`FractalImage::encode`](super::FractalImage::encode)
/// runs. Every method has an empty default.
pub trait EncodeProgress {
    /// A channel's tree is about to be encoded.
    fn channel_started(&mut self, _channel: Channel) {}

    /// One triangle was accepted (`terminal`) or subdivided. `pending`
    /// triangles remain queued out of `total` created so far.
    fn triangle_processed(
        &mut self,
        _channel: Channel,
        _id: TriangleId,
        _terminal: bool,
        _pending: usize,
        _total: usize,
    ) {
    }

    /// A channel's tree is complete.
    fn channel_finished(&mut self, _channel: Channel, _stats: &TreeStats) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl EncodeProgress for NoProgress {}
