//! Time-boxed memoization of the raw load step.
//!
//! The fetch coordinates never vary within a run (one spreadsheet, one
//! worksheet), so the cache is a single slot with a TTL rather than a keyed
//! map. Owning the slot here keeps the caching policy next to the loader
//! instead of in ambient global state.

use std::time::{Duration, Instant};

use crate::error::AppError;

/// A single-value memo that expires after `ttl`.
#[derive(Debug)]
pub struct MemoSlot<T> {
    ttl: Duration,
    state: Option<(Instant, T)>,
}

impl<T: Clone> MemoSlot<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, state: None }
    }

    /// Return the cached value if it is still fresh, otherwise run `fetch`
    /// and cache its result. A failed fetch leaves the slot empty, so the
    /// next call retries; there is no retry inside a single call.
    pub fn get_with(&mut self, fetch: impl FnOnce() -> Result<T, AppError>) -> Result<T, AppError> {
        if let Some((stamp, value)) = &self.state {
            if stamp.elapsed() < self.ttl {
                return Ok(value.clone());
            }
        }

        self.state = None;
        let value = fetch()?;
        self.state = Some((Instant::now(), value.clone()));
        Ok(value)
    }

    /// Drop the cached value so the next `get_with` fetches again.
    pub fn invalidate(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_call_within_ttl_does_not_refetch() {
        let mut slot = MemoSlot::new(Duration::from_secs(3600));
        let mut calls = 0u32;

        for _ in 0..3 {
            let v = slot
                .get_with(|| {
                    calls += 1;
                    Ok(7)
                })
                .unwrap();
            assert_eq!(v, 7);
        }

        assert_eq!(calls, 1);
    }

    #[test]
    fn zero_ttl_refetches_every_call() {
        let mut slot = MemoSlot::new(Duration::ZERO);
        let mut calls = 0u32;

        for _ in 0..3 {
            slot.get_with(|| {
                calls += 1;
                Ok(())
            })
            .unwrap();
        }

        assert_eq!(calls, 3);
    }

    #[test]
    fn failed_fetch_leaves_slot_empty() {
        let mut slot: MemoSlot<i32> = MemoSlot::new(Duration::from_secs(3600));

        let err = slot.get_with(|| Err(AppError::upstream("boom")));
        assert!(err.is_err());

        let mut calls = 0u32;
        let v = slot
            .get_with(|| {
                calls += 1;
                Ok(1)
            })
            .unwrap();
        assert_eq!(v, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn invalidate_forces_refetch() {
        let mut slot = MemoSlot::new(Duration::from_secs(3600));
        let mut calls = 0u32;

        slot.get_with(|| {
            calls += 1;
            Ok(1)
        })
        .unwrap();
        slot.invalidate();
        slot.get_with(|| {
            calls += 1;
            Ok(2)
        })
        .unwrap();

        assert_eq!(calls, 2);
    }
}
