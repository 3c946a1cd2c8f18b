//! ISR-safe engine wrapper using critical sections.
//!
//! Provides [`SharedEngine`] for synchronous ISR-safe access: the client
//! thread and the interrupt handlers funnel through the same critical
//! section, which realizes the short, non-sleeping channel lock the driver
//! requires between the two contexts.

use super::primitives::CriticalSectionCell;
use crate::driver::engine::Engine;

/// ISR-safe engine wrapper using critical sections.
///
/// All access goes through `critical_section::with()`, disabling interrupts
/// for the duration of the closure.
///
/// # Example
///
/// ```ignore
/// static DMAC: SharedEngine<16, 16, 16> = SharedEngine::new();
///
/// DMAC.with(|engine| {
///     engine.issue_pending(0).ok();
/// });
///
/// #[interrupt]
/// fn DMAC_CH0_IRQ() {
///     DMAC.with(|engine| engine.handle_channel_irq(0));
/// }
/// ```
pub struct SharedEngine<const CHANNELS: usize, const N_DESC: usize, const N_REQ: usize> {
    inner: CriticalSectionCell<Engine<'static, CHANNELS, N_DESC, N_REQ>>,
}

impl<const CHANNELS: usize, const N_DESC: usize, const N_REQ: usize>
    SharedEngine<CHANNELS, N_DESC, N_REQ>
{
    /// Create a new shared engine instance (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(Engine::new()),
        }
    }

    /// Execute a closure with exclusive access to the engine.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Engine<'static, CHANNELS, N_DESC, N_REQ>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Engine<'static, CHANNELS, N_DESC, N_REQ>) -> R,
    {
        self.inner.try_with(f)
    }

    /// Drain the completion pipeline, invoking every callback outside the
    /// critical section.
    ///
    /// Returns the number of transfers retired. Call from thread context
    /// (or a low-priority worker) after interrupts have been handled.
    pub fn run_completions(&self) -> usize {
        let mut retired = 0;
        while let Some(event) = self.with(|engine| engine.process_completions()) {
            event.invoke();
            retired += 1;
        }
        retired
    }
}

impl<const CHANNELS: usize, const N_DESC: usize, const N_REQ: usize> Default
    for SharedEngine<CHANNELS, N_DESC, N_REQ>
{
    fn default() -> Self {
        Self::new()
    }
}

/// Default shared engine configuration (16 channels, 16 descriptors, 16 requests).
pub type SharedEngineDefault = SharedEngine<16, 16, 16>;

/// Small shared engine configuration for memory-constrained systems.
pub type SharedEngineSmall = SharedEngine<8, 8, 8>;

/// Large shared engine configuration for deep per-channel pipelining.
pub type SharedEngineLarge = SharedEngine<16, 32, 32>;
