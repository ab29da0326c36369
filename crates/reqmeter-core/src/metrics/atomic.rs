use std::sync::atomic::{AtomicU64, Ordering};

/// `f64` stored as raw bits in an `AtomicU64`.
#[derive(Debug, Default)]
pub(crate) struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub(crate) fn new(v: f64) -> Self {
        Self { bits: AtomicU64::new(v.to_bits()) }
    }

    pub(crate) fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, v: f64) {
        self.bits.store(v.to_bits(), Ordering::Release);
    }

    /// CAS-loop add. Returns the new value.
    pub(crate) fn add(&self, delta: f64) -> f64 {
        let mut cur = self.bits.load(Ordering::Acquire);
        loop {
            let next = f64::from_bits(cur) + delta;
            match self.bits.compare_exchange_weak(
                cur,
                next.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => cur = actual,
            }
        }
    }

    /// CAS-loop add that refuses to go below `floor`.
    /// Returns the rejected candidate on failure.
    pub(crate) fn add_floored(&self, delta: f64, floor: f64) -> Result<f64, f64> {
        let mut cur = self.bits.load(Ordering::Acquire);
        loop {
            let next = f64::from_bits(cur) + delta;
            if next < floor {
                return Err(next);
            }
            match self.bits.compare_exchange_weak(
                cur,
                next.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(next),
                Err(actual) => cur = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn concurrent_adds_are_not_lost() {
        let v = Arc::new(AtomicF64::new(0.0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let v = Arc::clone(&v);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        v.add(1.0);
                    }
                })
            })
            .collect();
        for h in handles {
            let _ = h.join();
        }
        assert_eq!(v.load(), 8000.0);
    }

    #[test]
    fn floor_is_respected() {
        let v = AtomicF64::new(1.0);
        assert_eq!(v.add_floored(-1.0, 0.0), Ok(0.0));
        assert_eq!(v.add_floored(-1.0, 0.0), Err(-1.0));
        assert_eq!(v.load(), 0.0);
    }
}
