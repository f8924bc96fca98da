//! Atomic primitives.
//!
//! The six C++11-style memory orders named by [`MemoryOrder`] map onto
//! `std::sync::atomic::Ordering`'s five; `Consume` has no
//! load-dependency-chain primitive on this target and degrades to
//! `Acquire`, which is always at least as strong.

use std::sync::atomic::{
    AtomicBool, AtomicI32, AtomicI64, AtomicU32, AtomicU64, Ordering as StdOrdering,
};

/// One of the six C++11-style memory orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOrder {
    /// No ordering constraint beyond atomicity.
    Relaxed,
    /// Data-dependent ordering. Degrades to [`Self::Acquire`] — Rust has
    /// no standalone consume primitive.
    Consume,
    /// Synchronizes-with a paired release on this location.
    Acquire,
    /// Synchronizes-with a paired acquire on this location.
    Release,
    /// Acquire on load, release on store.
    AcqRel,
    /// A single total order over all `SeqCst` operations.
    SeqCst,
}

impl MemoryOrder {
    const fn to_std(self) -> StdOrdering {
        match self {
            Self::Relaxed => StdOrdering::Relaxed,
            Self::Consume | Self::Acquire => StdOrdering::Acquire,
            Self::Release => StdOrdering::Release,
            Self::AcqRel => StdOrdering::AcqRel,
            Self::SeqCst => StdOrdering::SeqCst,
        }
    }
}

macro_rules! atomic_wrapper_base {
    ($name:ident, $std:ty, $value:ty) => {
        /// A thin wrapper binding [`MemoryOrder`] to the underlying
        #[doc = concat!("`", stringify!($std), "`")]
        /// operations.
        #[derive(Debug, Default)]
        pub struct $name($std);

        impl $name {
            /// Create the atomic with an initial value.
            pub const fn new(value: $value) -> Self {
                Self(<$std>::new(value))
            }

            /// Load the current value.
            pub fn load(&self, order: MemoryOrder) -> $value {
                self.0.load(order.to_std())
            }

            /// Store a new value.
            pub fn store(&self, value: $value, order: MemoryOrder) {
                self.0.store(value, order.to_std());
            }

            /// Store a new value, returning the previous one.
            pub fn exchange(&self, value: $value, order: MemoryOrder) -> $value {
                self.0.swap(value, order.to_std())
            }

            /// Compare-and-swap: if the current value equals `current`,
            /// replace it with `new` and return `Ok(current)`; otherwise
            /// return `Err(actual)`.
            pub fn compare_exchange(
                &self,
                current: $value,
                new: $value,
                success: MemoryOrder,
                failure: MemoryOrder,
            ) -> Result<$value, $value> {
                self.0
                    .compare_exchange(current, new, success.to_std(), failure.to_std())
            }
        }
    };
}

macro_rules! atomic_wrapper_numeric {
    ($name:ident, $std:ty, $value:ty) => {
        atomic_wrapper_base!($name, $std, $value);

        impl $name {
            /// Add `value`, returning the previous value.
            pub fn fetch_add(&self, value: $value, order: MemoryOrder) -> $value {
                self.0.fetch_add(value, order.to_std())
            }

            /// Subtract `value`, returning the previous value.
            pub fn fetch_sub(&self, value: $value, order: MemoryOrder) -> $value {
                self.0.fetch_sub(value, order.to_std())
            }
        }
    };
}

atomic_wrapper_base!(AtomicBoolCell, AtomicBool, bool);
atomic_wrapper_numeric!(AtomicI32Cell, AtomicI32, i32);
atomic_wrapper_numeric!(AtomicU32Cell, AtomicU32, u32);
atomic_wrapper_numeric!(AtomicI64Cell, AtomicI64, i64);
atomic_wrapper_numeric!(AtomicU64Cell, AtomicU64, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_degrades_to_acquire() {
        assert_eq!(MemoryOrder::Consume.to_std(), StdOrdering::Acquire);
    }

    #[test]
    fn fetch_add_returns_previous_value() {
        let counter = AtomicU32Cell::new(5);
        assert_eq!(counter.fetch_add(3, MemoryOrder::Relaxed), 5);
        assert_eq!(counter.load(MemoryOrder::Relaxed), 8);
    }

    #[test]
    fn compare_exchange_fails_on_mismatch() {
        let flag = AtomicBoolCell::new(false);
        let result = flag.compare_exchange(
            true,
            true,
            MemoryOrder::SeqCst,
            MemoryOrder::SeqCst,
        );
        assert_eq!(result, Err(false));
        assert!(flag
            .compare_exchange(false, true, MemoryOrder::SeqCst, MemoryOrder::SeqCst)
            .is_ok());
    }
}
