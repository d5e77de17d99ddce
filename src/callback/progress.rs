//! Progress callback for logging training progress

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};
use crate::error::Result;

/// Progress callback for logging training progress.
///
/// Epoch-end lines include every metric present in the epoch log
/// record, so scores merged by `MetricEvalCallback` show up without
/// further wiring.
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    /// Log every N steps
    log_interval: usize,
}

impl ProgressCallback {
    /// Create progress callback
    pub fn new(log_interval: usize) -> Self {
        Self { log_interval }
    }

    fn format_logs(ctx: &CallbackContext) -> String {
        ctx.logs
            .iter()
            .map(|(name, value)| format!(", {name}: {value:.4}"))
            .collect()
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self { log_interval: 10 }
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_epoch_begin(&mut self, ctx: &mut CallbackContext) -> Result<CallbackAction> {
        println!(
            "Epoch {}/{} starting (lr: {:.2e})",
            ctx.epoch + 1,
            ctx.max_epochs,
            ctx.lr
        );
        Ok(CallbackAction::Continue)
    }

    fn on_epoch_end(&mut self, ctx: &mut CallbackContext) -> Result<CallbackAction> {
        let val_str = ctx
            .val_loss
            .map(|v| format!(", val_loss: {v:.4}"))
            .unwrap_or_default();

        println!(
            "Epoch {}/{}: loss: {:.4}{}{} ({:.1}s)",
            ctx.epoch + 1,
            ctx.max_epochs,
            ctx.loss,
            val_str,
            Self::format_logs(ctx),
            ctx.elapsed_secs
        );
        Ok(CallbackAction::Continue)
    }

    fn on_step_end(&mut self, ctx: &mut CallbackContext) -> Result<CallbackAction> {
        if ctx.step > 0 && ctx.step % self.log_interval == 0 {
            println!(
                "  Step {}/{}: loss: {:.4}",
                ctx.step, ctx.steps_per_epoch, ctx.loss
            );
        }
        Ok(CallbackAction::Continue)
    }

    fn name(&self) -> &'static str {
        "ProgressCallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_callback_continues() {
        let mut progress = ProgressCallback::new(5);
        let mut ctx = CallbackContext {
            epoch: 0,
            max_epochs: 10,
            step: 5,
            steps_per_epoch: 100,
            loss: 0.5,
            lr: 0.001,
            ..Default::default()
        };

        assert_eq!(
            progress.on_epoch_begin(&mut ctx).unwrap(),
            CallbackAction::Continue
        );
        assert_eq!(
            progress.on_step_end(&mut ctx).unwrap(),
            CallbackAction::Continue
        );
        assert_eq!(
            progress.on_epoch_end(&mut ctx).unwrap(),
            CallbackAction::Continue
        );
    }

    #[test]
    fn test_progress_callback_default() {
        let pc = ProgressCallback::default();
        assert_eq!(pc.log_interval, 10);
    }

    #[test]
    fn test_format_logs_includes_metrics() {
        let mut ctx = CallbackContext::default();
        ctx.logs.insert("accuracy".to_string(), 0.75);
        ctx.logs.insert("f1".to_string(), 0.5);

        let formatted = ProgressCallback::format_logs(&ctx);
        assert!(formatted.contains("accuracy: 0.7500"));
        assert!(formatted.contains("f1: 0.5000"));
    }

    #[test]
    fn test_progress_callback_name() {
        assert_eq!(ProgressCallback::new(5).name(), "ProgressCallback");
    }
}
