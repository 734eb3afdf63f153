//! Per-surface reentrancy guard.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{GatewayError, GatewayResult};

/// Flag held while an operation of one surface executes.
#[derive(Debug)]
pub struct ReentrancyGuard {
    surface: &'static str,
    entered: AtomicBool,
}

impl ReentrancyGuard {
    /// Guard for `surface`.
    pub const fn new(surface: &'static str) -> Self {
        Self {
            surface,
            entered: AtomicBool::new(false),
        }
    }

    /// Surface name reported in errors.
    pub fn surface(&self) -> &'static str {
        self.surface
    }

    /// Whether an operation holds the guard.
    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }

    /// Enter the surface. The flag clears when the scope drops.
    pub fn enter(&self) -> GatewayResult<GuardScope<'_>> {
        self.entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GatewayError::Reentrancy {
                surface: self.surface,
            })?;
        Ok(GuardScope { guard: self })
    }
}

/// Clears the guard on every exit path.
#[derive(Debug)]
pub struct GuardScope<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}
