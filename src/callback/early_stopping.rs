//! Early stopping callback to halt training when a monitored quantity plateaus

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};
use crate::error::Result;

/// Early stopping callback to halt training when a monitored quantity
/// plateaus.
///
/// By default the training loss is monitored. `monitor_metric` switches
/// to a metric merged into the epoch log record (for example a score
/// produced by `MetricEvalCallback` earlier in the callback list).
///
/// # Example
///
/// ```rust
/// use evaluar::EarlyStopping;
///
/// // Stop if no improvement for 5 epochs, min improvement 0.001
/// let early_stop = EarlyStopping::new(5, 0.001);
///
/// // Stop when logged accuracy stops rising
/// let on_metric = EarlyStopping::new(3, 0.01).monitor_metric("accuracy", true);
/// ```
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    /// Number of epochs to wait for improvement
    patience: usize,
    /// Minimum improvement to reset patience
    min_delta: f64,
    /// Best value seen so far
    best: f64,
    /// Epochs without improvement
    pub(crate) epochs_without_improvement: usize,
    /// Log-record key to monitor instead of the training loss
    monitor: Option<String>,
    /// Whether larger monitored values are better
    maximize: bool,
}

impl EarlyStopping {
    /// Create new early stopping callback monitoring the training loss
    pub fn new(patience: usize, min_delta: f64) -> Self {
        Self {
            patience,
            min_delta,
            best: f64::INFINITY,
            epochs_without_improvement: 0,
            monitor: None,
            maximize: false,
        }
    }

    /// Monitor a named entry of the epoch log record.
    ///
    /// `maximize` declares the metric's direction: true for scores like
    /// accuracy, false for losses. Epochs where the key is absent from
    /// the log record count as no improvement.
    #[must_use]
    pub fn monitor_metric(mut self, key: impl Into<String>, maximize: bool) -> Self {
        self.monitor = Some(key.into());
        self.maximize = maximize;
        self.best = if maximize {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        self
    }

    /// Reset internal state
    pub fn reset(&mut self) {
        self.best = if self.maximize {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        self.epochs_without_improvement = 0;
    }

    /// Check if the monitored value improved
    fn check_improvement(&mut self, value: f64) -> bool {
        let improved = if self.maximize {
            value > self.best + self.min_delta
        } else {
            value < self.best - self.min_delta
        };
        if improved {
            self.best = value;
            self.epochs_without_improvement = 0;
        } else {
            self.epochs_without_improvement += 1;
        }
        improved
    }
}

impl TrainerCallback for EarlyStopping {
    fn on_epoch_end(&mut self, ctx: &mut CallbackContext) -> Result<CallbackAction> {
        let value = match &self.monitor {
            Some(key) => ctx.logs.get(key).copied(),
            None => Some(f64::from(ctx.loss)),
        };
        match value {
            Some(value) => {
                self.check_improvement(value);
            }
            None => self.epochs_without_improvement += 1,
        }

        if self.epochs_without_improvement >= self.patience {
            eprintln!(
                "Early stopping: no improvement for {} epochs (best: {:.4})",
                self.patience, self.best
            );
            Ok(CallbackAction::Stop)
        } else {
            Ok(CallbackAction::Continue)
        }
    }

    fn name(&self) -> &'static str {
        "EarlyStopping"
    }
}
