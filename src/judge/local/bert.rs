use candle_core::{DType, Device, IndexOp, Result, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use std::path::Path;

/// Checkpoint prefixes under which the encoder weights may live.
const ENCODER_PREFIXES: [&str; 2] = ["bert", "roberta"];

/// Cross-encoder over an `(utterance, intent description)` pair: BERT encoder plus a
/// one-unit linear head on the `[CLS]` position.
pub struct PairClassifier {
    encoder: BertModel,
    head: Linear,
}

impl PairClassifier {
    pub fn load(model_dir: &Path, device: &Device) -> Result<Self> {
        let raw_config = std::fs::read_to_string(model_dir.join("config.json"))?;
        let config: Config = serde_json::from_str(&raw_config)
            .map_err(|e| candle_core::Error::Msg(format!("Failed to parse config: {}", e)))?;

        // SAFETY: the weights file is treated as read-only for the lifetime of the model.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                &[model_dir.join("model.safetensors")],
                DType::F32,
                device,
            )?
        };

        let prefix = ENCODER_PREFIXES.into_iter().find(|p| {
            vb.contains_tensor(&format!("{p}.embeddings.word_embeddings.weight"))
        });
        let encoder = match prefix {
            Some(p) => BertModel::load(vb.pp(p), &config)?,
            None => BertModel::load(vb.clone(), &config)?,
        };
        let head = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        Ok(Self { encoder, head })
    }

    /// Raw match logit for one encoded pair (batch of one).
    pub fn logit(
        &self,
        token_ids: &Tensor,
        type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<f32> {
        let hidden = self
            .encoder
            .forward(token_ids, type_ids, Some(attention_mask))?;
        let cls = hidden.i((.., 0, ..))?;
        let logits = self.head.forward(&cls)?.flatten_all()?.to_vec1::<f32>()?;
        logits
            .first()
            .copied()
            .ok_or_else(|| candle_core::Error::Msg("classifier returned no logits".to_string()))
    }
}
