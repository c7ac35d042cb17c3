use std::collections::VecDeque;
use thiserror::Error;

/// Returned when appending would grow a buffer past its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("connection buffer would exceed {limit} bytes")]
pub struct BufferOverflow {
    pub limit: usize,
}

/// Bytes received from a socket that have not been parsed into a frame yet.
///
/// Appends go to the tail and frames are taken from the head. A buffer can be
/// given a byte limit so a peer that never completes a frame cannot grow it
/// without bound.
#[derive(Debug, Default, Clone)]
pub struct ConnectionBuffer {
    bytes: VecDeque<u8>,
    limit: Option<usize>,
}

impl ConnectionBuffer {
    /// Creates an unbounded buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer that refuses to hold more than `limit` bytes
    pub fn with_limit(limit: usize) -> Self {
        Self {
            bytes: VecDeque::new(),
            limit: Some(limit),
        }
    }

    /// Appends received bytes to the tail
    ///
    /// Nothing is appended when the result would exceed the limit.
    pub fn append(&mut self, data: &[u8]) -> Result<(), BufferOverflow> {
        if let Some(limit) = self.limit {
            if self.bytes.len() + data.len() > limit {
                return Err(BufferOverflow { limit });
            }
        }
        self.bytes.extend(data);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Looks at the byte `index` positions from the head without consuming it
    pub fn peek(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Removes and returns exactly `n` bytes from the head
    ///
    /// Returns `None` and leaves the buffer untouched when fewer than `n`
    /// bytes are buffered.
    pub fn take_exactly(&mut self, n: usize) -> Option<Vec<u8>> {
        if self.bytes.len() < n {
            return None;
        }
        Some(self.bytes.drain(..n).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_exactly_preserves_order() {
        let mut buffer = ConnectionBuffer::new();
        buffer.append(&[1, 2]).unwrap();
        buffer.append(&[3]).unwrap();

        assert_eq!(buffer.take_exactly(2), Some(vec![1, 2]));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.take_exactly(1), Some(vec![3]));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_insufficient_data_leaves_buffer_untouched() {
        let mut buffer = ConnectionBuffer::new();
        buffer.append(&[9]).unwrap();

        assert_eq!(buffer.take_exactly(2), None);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.peek(0), Some(9));
        assert_eq!(buffer.peek(1), None);
    }

    #[test]
    fn test_take_zero_bytes() {
        let mut buffer = ConnectionBuffer::new();
        assert_eq!(buffer.take_exactly(0), Some(vec![]));
    }

    #[test]
    fn test_limit_rejects_whole_append() {
        let mut buffer = ConnectionBuffer::with_limit(4);
        buffer.append(&[1, 2, 3]).unwrap();

        let err = buffer.append(&[4, 5]).unwrap_err();
        assert_eq!(err, BufferOverflow { limit: 4 });
        assert_eq!(buffer.len(), 3);

        buffer.append(&[4]).unwrap();
        assert_eq!(buffer.len(), 4);
    }
}
