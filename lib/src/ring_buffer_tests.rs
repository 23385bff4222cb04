//! Tests for the fixed-capacity ring buffer.
//!
//! Covers:
//! - push/pop FIFO ordering and wraparound across the array boundary
//! - try_push rejection when full, push_overwrite eviction of the oldest
//! - peek and reset behavior

use crate::ring_buffer::RingBuffer;

#[test]
fn test_new_buffer_is_empty() {
    let buf: RingBuffer<u8, 4> = RingBuffer::new();
    assert!(buf.is_empty(), "fresh buffer is empty");
    assert!(!buf.is_full(), "fresh buffer is not full");
    assert_eq!(buf.len(), 0, "fresh buffer has len 0");
    assert_eq!(buf.capacity(), 4, "capacity matches const parameter");
}

#[test]
fn test_fifo_ordering() {
    let mut buf: RingBuffer<u32, 8> = RingBuffer::new();
    for v in [10, 20, 30] {
        assert!(buf.try_push(v), "push succeeds below capacity");
    }
    assert_eq!(buf.len(), 3, "len tracks pushes");
    assert_eq!(buf.try_pop(), Some(10), "pop returns oldest first");
    assert_eq!(buf.try_pop(), Some(20), "pop returns second oldest");
    assert_eq!(buf.try_pop(), Some(30), "pop returns newest last");
    assert_eq!(buf.try_pop(), None, "pop on empty returns None");
}

#[test]
fn test_wraparound() {
    let mut buf: RingBuffer<u32, 4> = RingBuffer::new();
    // Advance head/tail past the array boundary a few times.
    for round in 0..3u32 {
        for v in 0..4u32 {
            assert!(buf.try_push(round * 10 + v), "push within capacity");
        }
        assert!(buf.is_full(), "full after four pushes");
        for v in 0..4u32 {
            assert_eq!(buf.try_pop(), Some(round * 10 + v), "FIFO across wrap");
        }
        assert!(buf.is_empty(), "empty after draining");
    }
}

#[test]
fn test_try_push_rejects_when_full() {
    let mut buf: RingBuffer<u8, 2> = RingBuffer::new();
    assert!(buf.try_push(1), "first push fits");
    assert!(buf.try_push(2), "second push fits");
    assert!(!buf.try_push(3), "third push rejected at capacity");
    assert_eq!(buf.len(), 2, "rejected push does not change len");
    assert_eq!(buf.try_pop(), Some(1), "contents unchanged by rejected push");
}

#[test]
fn test_push_overwrite_evicts_oldest() {
    let mut buf: RingBuffer<u8, 2> = RingBuffer::new();
    buf.push_overwrite(1);
    buf.push_overwrite(2);
    buf.push_overwrite(3);
    assert_eq!(buf.len(), 2, "overwrite keeps len at capacity");
    assert_eq!(buf.try_pop(), Some(2), "oldest element was evicted");
    assert_eq!(buf.try_pop(), Some(3), "newest element survives");
}

#[test]
fn test_peek_does_not_consume() {
    let mut buf: RingBuffer<u8, 4> = RingBuffer::new();
    assert_eq!(buf.peek(), None, "peek on empty returns None");
    buf.try_push(7);
    assert_eq!(buf.peek(), Some(&7), "peek sees oldest");
    assert_eq!(buf.peek(), Some(&7), "peek is repeatable");
    assert_eq!(buf.len(), 1, "peek does not consume");
    assert_eq!(buf.try_pop(), Some(7), "pop still returns the element");
}

#[test]
fn test_reset_clears_contents() {
    let mut buf: RingBuffer<u8, 4> = RingBuffer::new();
    buf.try_push(1);
    buf.try_push(2);
    buf.reset();
    assert!(buf.is_empty(), "reset empties the buffer");
    assert_eq!(buf.try_pop(), None, "no stale elements after reset");
}

#[test]
fn test_new_with_const_init() {
    let buf: RingBuffer<u8, 3> = RingBuffer::new_with(0xff);
    assert!(buf.is_empty(), "new_with starts logically empty");
    assert_eq!(buf.capacity(), 3, "capacity preserved");
}
