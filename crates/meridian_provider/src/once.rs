//! Once-per-process guards.

use parking_lot::Mutex;

/// Runs a fallible check until it first succeeds.
///
/// Concurrent callers serialize on the guard's mutex, so the check never runs
/// twice in parallel. A failed check is retried by the next caller.
///
/// # Example
///
/// ```
/// use meridian_provider::once::ValidationGuard;
///
/// static GUARD: ValidationGuard = ValidationGuard::new();
///
/// let mut runs = 0;
/// for _ in 0..3 {
///     GUARD.run_once(|| -> Result<(), ()> {
///         runs += 1;
///         Ok(())
///     })
///     .unwrap();
/// }
/// assert_eq!(runs, 1);
/// ```
#[derive(Debug, Default)]
pub struct ValidationGuard {
    validated: Mutex<bool>,
}

impl ValidationGuard {
    /// Creates a guard whose check has not run.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            validated: parking_lot::const_mutex(false),
        }
    }

    /// Runs `check` unless an earlier call succeeded.
    ///
    /// # Errors
    ///
    /// Returns the error of `check`.
    pub fn run_once<E>(&self, check: impl FnOnce() -> Result<(), E>) -> Result<(), E> {
        let mut validated = self.validated.lock();
        if *validated {
            return Ok(());
        }
        check()?;
        *validated = true;
        Ok(())
    }

    /// Returns `true` once a check has succeeded.
    #[must_use]
    pub fn is_validated(&self) -> bool {
        *self.validated.lock()
    }
}
