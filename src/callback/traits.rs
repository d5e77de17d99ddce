//! Core traits and types for the callback system
//!
//! - `CallbackContext` - training state passed to callbacks, including
//!   the epoch's mutable log record
//! - `CallbackAction` - actions a callback can request
//! - `TrainerCallback` - the trait all callbacks implement

use std::collections::BTreeMap;

use crate::error::Result;

/// Context passed to callbacks with current training state.
///
/// `logs` is the epoch's log record: a name-to-value mapping owned by
/// the surrounding training loop and augmented in place by callbacks
/// (metric evaluation merges its scores here).
#[derive(Clone, Debug, Default)]
pub struct CallbackContext {
    /// Current epoch (0-indexed)
    pub epoch: usize,
    /// Total epochs planned
    pub max_epochs: usize,
    /// Current step within epoch
    pub step: usize,
    /// Total steps in epoch
    pub steps_per_epoch: usize,
    /// Global step count
    pub global_step: usize,
    /// Current loss value
    pub loss: f32,
    /// Current learning rate
    pub lr: f32,
    /// Best loss seen so far
    pub best_loss: Option<f32>,
    /// Validation loss (if available)
    pub val_loss: Option<f32>,
    /// Training duration in seconds
    pub elapsed_secs: f64,
    /// Epoch log record, mutated in place by callbacks
    pub logs: BTreeMap<String, f64>,
}

/// Action to take after a callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Continue training normally
    Continue,
    /// Stop training (early stopping)
    Stop,
    /// Skip rest of current epoch
    SkipEpoch,
}

/// Trait for training callbacks
///
/// Implement this trait to hook into training events. All methods have
/// default no-op implementations, so you only need to implement the
/// events you care about. Hooks return a `Result` so a failing
/// callback (a broken evaluation pass, say) aborts the event and
/// propagates to the caller instead of being swallowed.
pub trait TrainerCallback: Send {
    /// Called before training starts
    fn on_train_begin(&mut self, _ctx: &mut CallbackContext) -> Result<CallbackAction> {
        Ok(CallbackAction::Continue)
    }

    /// Called after training ends
    fn on_train_end(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        Ok(())
    }

    /// Called before each epoch
    fn on_epoch_begin(&mut self, _ctx: &mut CallbackContext) -> Result<CallbackAction> {
        Ok(CallbackAction::Continue)
    }

    /// Called after each epoch
    fn on_epoch_end(&mut self, _ctx: &mut CallbackContext) -> Result<CallbackAction> {
        Ok(CallbackAction::Continue)
    }

    /// Called before each training step
    fn on_step_begin(&mut self, _ctx: &mut CallbackContext) -> Result<CallbackAction> {
        Ok(CallbackAction::Continue)
    }

    /// Called after each training step
    fn on_step_end(&mut self, _ctx: &mut CallbackContext) -> Result<CallbackAction> {
        Ok(CallbackAction::Continue)
    }

    /// Get callback name for logging
    fn name(&self) -> &'static str {
        "TrainerCallback"
    }
}
