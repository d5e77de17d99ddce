//! Model collaborator capability interface
//!
//! The aggregator never inspects model internals. Everything it needs
//! is declared up front through [`EvalModel`]: the prediction pass, an
//! optional generation pass, and the metadata that used to be probed
//! ad hoc in dynamic frameworks (ignorable output fields, the primary
//! input field, an optional nested encoder with its own primary input
//! field).

use ndarray::ArrayD;

use crate::aggregate::Values;
use crate::batch::Record;

/// Field name used for generation input when the model declares none.
pub const DEFAULT_INPUT_FIELD: &str = "input_ids";

/// Field name holding the optional generation attention mask.
pub const ATTENTION_MASK_FIELD: &str = "attention_mask";

/// A model that can be driven through an evaluation pass.
pub trait EvalModel {
    /// Direct inference on a whole input batch. The output may be a
    /// mapping of named output fields, an ordered sequence, or a
    /// single array.
    fn predict(&self, inputs: &Record) -> Values;

    /// Autoregressive generation from an input-id array and an
    /// optional attention mask. Models without a generation pass keep
    /// the default; requesting generation from them is an error.
    fn generate(
        &self,
        _input_ids: &ArrayD<f32>,
        _attention_mask: Option<&ArrayD<f32>>,
    ) -> Option<ArrayD<f32>> {
        None
    }

    /// Output fields to drop at inference time. The aggregator widens
    /// this with the literal field `"loss"`.
    fn ignore_fields(&self) -> Vec<String> {
        Vec::new()
    }

    /// The model's declared primary input field.
    fn main_input_name(&self) -> Option<String> {
        None
    }

    /// Primary input field of a nested encoder, for encoder-decoder
    /// models whose encoder consumes a differently named input.
    fn encoder_main_input_name(&self) -> Option<String> {
        None
    }
}

/// The input field generation reads from.
///
/// An encoder's declared input name wins when it differs from the
/// model's own; otherwise the model's declared name is used, falling
/// back to [`DEFAULT_INPUT_FIELD`].
#[must_use]
pub fn generation_input_field(model: &dyn EvalModel) -> String {
    let main = model
        .main_input_name()
        .unwrap_or_else(|| DEFAULT_INPUT_FIELD.to_string());
    match model.encoder_main_input_name() {
        Some(encoder) if encoder != main => encoder,
        _ => main,
    }
}
