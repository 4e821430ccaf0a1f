//! Reusable string buffers for query assembly.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, PoisonError};

const MAX_IDLE: usize = 64;

/// A pool of cleared `String` buffers.
///
/// Cloning the pool shares the underlying buffers.
#[derive(Debug, Clone, Default)]
pub struct BufferPool {
    idle: Arc<Mutex<Vec<String>>>,
}

impl BufferPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a buffer from the pool, allocating one when none is idle.
    ///
    /// The buffer goes back to the pool when the guard is dropped.
    #[must_use]
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();
        PooledBuffer { buf, pool: self }
    }

    /// Number of idle buffers.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release(&self, mut buf: String) {
        buf.clear();
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < MAX_IDLE {
            idle.push(buf);
        }
    }
}

/// A buffer borrowed from a [`BufferPool`].
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buf: String,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_returns_cleared() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.acquire();
            buf.push_str("SELECT 1");
            assert_eq!(pool.idle(), 0);
        }
        assert_eq!(pool.idle(), 1);
        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= "SELECT 1".len());
    }

    #[test]
    fn test_released_on_early_return() {
        fn render(pool: &BufferPool, fail: bool) -> Result<String, ()> {
            let mut buf = pool.acquire();
            buf.push_str("partial");
            if fail {
                return Err(());
            }
            Ok(buf.as_str().to_owned())
        }
        let pool = BufferPool::new();
        assert!(render(&pool, true).is_err());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_clones_share_buffers() {
        let pool = BufferPool::new();
        let other = pool.clone();
        drop(other.acquire());
        assert_eq!(pool.idle(), 1);
    }
}
