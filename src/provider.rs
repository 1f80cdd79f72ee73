//! Frame source trait for driving a session without the simulator's callback

use crate::Result;

/// Something that can move a host to its next frame.
///
/// The simulator calls the session itself once per frame; a frame source
/// stands in for that callback when a [`FrameDriver`](crate::driver::FrameDriver)
/// runs the session instead. Each source handles its own pacing.
#[async_trait::async_trait]
pub trait FrameSource: Send + 'static {
    /// Advance to the next frame.
    ///
    /// Returns:
    /// - `Ok(true)` - a new frame is current and can be queried
    /// - `Ok(false)` - no more frames (normal termination)
    /// - `Err(e)` - the source failed
    async fn advance(&mut self) -> Result<bool>;

    /// Native frame rate in Hz
    fn tick_rate(&self) -> f64;
}
