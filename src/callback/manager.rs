//! Callback manager for dispatching events to multiple callbacks

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};
use crate::error::Result;

/// Manages multiple callbacks and dispatches events.
///
/// Dispatch short-circuits on the first `Stop` (or `SkipEpoch` at
/// epoch begin) and propagates the first error unchanged.
#[derive(Default)]
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    /// Create new callback manager
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Check if no callbacks are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Get number of callbacks
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Fire train begin event
    pub fn on_train_begin(&mut self, ctx: &mut CallbackContext) -> Result<CallbackAction> {
        for cb in &mut self.callbacks {
            if cb.on_train_begin(ctx)? == CallbackAction::Stop {
                return Ok(CallbackAction::Stop);
            }
        }
        Ok(CallbackAction::Continue)
    }

    /// Fire train end event
    pub fn on_train_end(&mut self, ctx: &mut CallbackContext) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_train_end(ctx)?;
        }
        Ok(())
    }

    /// Fire epoch begin event
    pub fn on_epoch_begin(&mut self, ctx: &mut CallbackContext) -> Result<CallbackAction> {
        for cb in &mut self.callbacks {
            match cb.on_epoch_begin(ctx)? {
                CallbackAction::Stop => return Ok(CallbackAction::Stop),
                CallbackAction::SkipEpoch => return Ok(CallbackAction::SkipEpoch),
                CallbackAction::Continue => {}
            }
        }
        Ok(CallbackAction::Continue)
    }

    /// Fire epoch end event
    pub fn on_epoch_end(&mut self, ctx: &mut CallbackContext) -> Result<CallbackAction> {
        for cb in &mut self.callbacks {
            if cb.on_epoch_end(ctx)? == CallbackAction::Stop {
                return Ok(CallbackAction::Stop);
            }
        }
        Ok(CallbackAction::Continue)
    }

    /// Fire step begin event
    pub fn on_step_begin(&mut self, ctx: &mut CallbackContext) -> Result<CallbackAction> {
        for cb in &mut self.callbacks {
            if cb.on_step_begin(ctx)? == CallbackAction::Stop {
                return Ok(CallbackAction::Stop);
            }
        }
        Ok(CallbackAction::Continue)
    }

    /// Fire step end event
    pub fn on_step_end(&mut self, ctx: &mut CallbackContext) -> Result<CallbackAction> {
        for cb in &mut self.callbacks {
            if cb.on_step_end(ctx)? == CallbackAction::Stop {
                return Ok(CallbackAction::Stop);
            }
        }
        Ok(CallbackAction::Continue)
    }
}
