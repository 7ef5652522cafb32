//! Module interfaces
//!
//! Manoeuvres executed by a fixed-rate scheduler shall implement the items
//! in this module.

// ---------------------------------------------------------------------------
// MANOEUVRE LIFECYCLE
// ---------------------------------------------------------------------------

/// A manoeuvre driven one tick at a time by an external scheduler.
///
/// The scheduler guarantees that:
/// - `initialize` is called exactly once before the first `execute`,
/// - `execute` is called once per fixed tick while the manoeuvre is active,
/// - `is_finished` is polled after every `execute`,
/// - `end` is called exactly once, either when `is_finished` first returns
///   true or when the manoeuvre is cancelled.
///
/// None of these functions may block or fail, a manoeuvre that cannot make
/// progress simply never reports that it has finished.
pub trait Mnvr {
    /// Clear all manoeuvre state ready for the first tick.
    fn initialize(&mut self);

    /// Main cyclic processing, called once per tick.
    fn execute(&mut self);

    /// Returns true once the manoeuvre has completed.
    fn is_finished(&self) -> bool;

    /// Tear down the manoeuvre.
    ///
    /// # Inputs
    /// - `interrupted`: true if the manoeuvre was cancelled or timed out
    ///   rather than completing.
    fn end(&mut self, interrupted: bool);
}
