use super::model::SentimentAnalysisModel;
use super::pipeline::SentimentAnalysisPipeline;
use crate::core::{global_cache, ModelOptions, Result};
use crate::pipelines::utils::{build_cache_key, DeviceRequest, DeviceSelectable};

/// Builder for [`SentimentAnalysisPipeline`].
///
/// The model is loaded through the global cache, so building twice with the same
/// options and device shares one set of weights.
pub struct SentimentAnalysisPipelineBuilder<M: SentimentAnalysisModel> {
    options: M::Options,
    device_request: DeviceRequest,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipelineBuilder<M> {
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Default,
        }
    }

    pub fn build(self) -> Result<SentimentAnalysisPipeline<M>>
    where
        M: Send + Sync + 'static,
        M::Options: ModelOptions,
    {
        let device = self.device_request.resolve()?;
        let key = build_cache_key(&self.options, &device);
        let options = self.options.clone();
        let model = global_cache().get_or_create(&key, || M::new(options, device))?;
        let tokenizer = M::get_tokenizer(self.options)?;
        Ok(SentimentAnalysisPipeline { model, tokenizer })
    }
}

impl<M: SentimentAnalysisModel> DeviceSelectable for SentimentAnalysisPipelineBuilder<M> {
    fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

impl SentimentAnalysisPipelineBuilder<crate::models::SentimentModernBertModel> {
    pub fn modernbert(size: crate::models::ModernBertSize) -> Self {
        Self::new(size)
    }
}
