//! Debug-only reentrancy guard.
//!
//! The map runs user code while its links can be transiently inconsistent:
//! `K: Hash`/`K: Eq` during chain probes, and value constructors passed to
//! `get_or_insert_with`. If that user code calls back into the same map,
//! the walk it interrupts may observe half-patched links. In debug builds
//! the guard turns such reentry into an immediate panic; in release builds
//! it compiles to nothing.
//!
//! The `PhantomData<*mut ()>` marker also keeps guarded containers
//! `!Send`/`!Sync`, in line with the single-threaded design.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map reentry tracker. Public operations hold a guard for their whole
/// body: `let _g = self.reentrancy.enter();`.
#[derive(Debug, Default)]
pub struct DebugReentrancy {
    #[cfg(debug_assertions)]
    entered: Cell<bool>,
    _nosend: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            entered: Cell::new(false),
            _nosend: PhantomData,
        }
    }

    /// Enter a guarded section. Panics in debug builds if a guard from the
    /// same tracker is still alive.
    #[inline]
    pub fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.entered.replace(true),
                "reentrancy detected: map operation started while another is in progress"
            );
            return ReentrancyGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return ReentrancyGuard { _z: PhantomData };
        }
    }
}

/// RAII guard returned by [`DebugReentrancy::enter`].
pub struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.entered.set(false);
    }
}
