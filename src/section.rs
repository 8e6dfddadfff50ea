/// Scoped mutual exclusion against the USB completion interrupt.
///
/// Firmware implements this by masking the controller's interrupt for the duration of `f`, for
/// example:
///
/// ```ignore
/// struct UsbIrqMasked;
///
/// impl CriticalSection for UsbIrqMasked {
///     fn with<R>(&self, f: impl FnOnce() -> R) -> R {
///         cortex_m::interrupt::free(|_| f())
///     }
/// }
/// ```
///
/// Implementations do not need to be reentrant. The class never nests sections and never runs
/// application callbacks inside one.
pub trait CriticalSection {
    /// Runs `f` with the completion handlers excluded.
    fn with<R>(&self, f: impl FnOnce() -> R) -> R;
}

impl<T: CriticalSection + ?Sized> CriticalSection for &T {
    fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        (**self).with(f)
    }
}

/// [`CriticalSection`] backed by a spin lock.
///
/// For hosts where the completion handlers run on their own thread. On a single core where they
/// run in an interrupt that preempts the application, a completion arriving while the lock is
/// held spins forever; use an interrupt-masking section there.
#[derive(Default)]
pub struct SpinSection(spin::Mutex<()>);

impl SpinSection {
    pub const fn new() -> Self {
        SpinSection(spin::Mutex::new(()))
    }
}

impl CriticalSection for SpinSection {
    fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.0.lock();
        f()
    }
}
