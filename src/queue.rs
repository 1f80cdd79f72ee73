//! Sample hand-off channel between the sampler and the writer
//!
//! Unbounded and strictly FIFO. The sending half never blocks, so it is safe
//! to push from the host's synchronous frame callback; the receiving half
//! blocks its thread until a message arrives.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

use crate::types::Sample;
use crate::{DumpError, Result};

/// Payload carried by the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A captured frame to persist
    Sample(Box<Sample>),
    /// Flush, close the file and stop
    Terminate,
}

/// Create a connected sender/receiver pair sharing one depth gauge.
pub fn sample_channel() -> (SampleSender, SampleReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));
    (SampleSender { tx, depth: Arc::clone(&depth) }, SampleReceiver { rx, depth })
}

/// Producer half, owned by the session.
#[derive(Debug)]
pub struct SampleSender {
    tx: mpsc::UnboundedSender<Message>,
    depth: Arc<AtomicUsize>,
}

impl SampleSender {
    /// Queue a sample for the writer
    pub fn push(&self, sample: Sample) -> Result<()> {
        self.send(Message::Sample(Box::new(sample)))
    }

    /// Ask the writer to drain and stop
    pub fn terminate(&self) -> Result<()> {
        self.send(Message::Terminate)
    }

    fn send(&self, message: Message) -> Result<()> {
        self.depth.fetch_add(1, Ordering::AcqRel);
        self.tx.send(message).map_err(|_| {
            self.depth.fetch_sub(1, Ordering::AcqRel);
            DumpError::WriterStopped
        })
    }

    /// Messages pushed but not yet taken by the writer.
    ///
    /// Zero once the writer is gone: anything still queued was dropped with it.
    pub fn depth(&self) -> usize {
        if self.tx.is_closed() {
            return 0;
        }
        self.depth.load(Ordering::Acquire)
    }

    /// Whether the receiving half is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, owned by the writer thread.
#[derive(Debug)]
pub struct SampleReceiver {
    rx: mpsc::UnboundedReceiver<Message>,
    depth: Arc<AtomicUsize>,
}

impl SampleReceiver {
    /// Block the current thread until the next message.
    ///
    /// Returns `None` once every sender is dropped and the queue is empty.
    /// Must not be called from inside an async context.
    pub fn blocking_next(&mut self) -> Option<Message> {
        let message = self.rx.blocking_recv()?;
        self.depth.fetch_sub(1, Ordering::AcqRel);
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::frame_at;

    #[test]
    fn messages_arrive_in_push_order() {
        let (tx, mut rx) = sample_channel();
        for position in [0.1, 0.2, 0.3] {
            tx.push(frame_at(position)).unwrap();
        }
        tx.terminate().unwrap();
        assert_eq!(tx.depth(), 4);

        let mut seen = Vec::new();
        while let Some(Message::Sample(sample)) = rx.blocking_next() {
            seen.push(sample.normalized_spline_position);
        }
        assert_eq!(seen, vec![0.1, 0.2, 0.3]);
        assert_eq!(tx.depth(), 0);
    }

    #[test]
    fn push_after_receiver_drop_reports_writer_stopped() {
        let (tx, rx) = sample_channel();
        drop(rx);
        assert!(tx.is_closed());
        assert!(matches!(tx.push(frame_at(0.5)), Err(DumpError::WriterStopped)));
        assert_eq!(tx.depth(), 0);
    }

    #[test]
    fn depth_resets_when_receiver_drops_with_messages_queued() {
        let (tx, rx) = sample_channel();
        tx.push(frame_at(0.1)).unwrap();
        tx.push(frame_at(0.2)).unwrap();
        assert_eq!(tx.depth(), 2);

        drop(rx);
        assert!(tx.is_closed());
        assert_eq!(tx.depth(), 0);
    }

    #[test]
    fn receiver_sees_end_when_sender_drops() {
        let (tx, mut rx) = sample_channel();
        tx.push(frame_at(0.5)).unwrap();
        drop(tx);
        assert!(matches!(rx.blocking_next(), Some(Message::Sample(_))));
        assert!(rx.blocking_next().is_none());
    }
}
