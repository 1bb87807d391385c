/// Sampling defaults shipped with a model in its `generation_config.json`.
///
/// Every field is optional; pipeline builders fill the gaps with their own
/// defaults or user overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u64>,
    pub repeat_penalty: Option<f32>,
    pub repeat_last_n: Option<usize>,
    pub eos_token_ids: Vec<u64>,
}
