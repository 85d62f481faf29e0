// Résumé optimization: prompt construction, retry/backoff, model fallback and
// score-marker extraction. All provider I/O goes through llm_client::LlmTransport.

pub mod orchestrator;
pub mod policy;
pub mod prompts;
pub mod score;

pub use orchestrator::{OptimizationRequest, OptimizeError, OptimizedText, RequestOrchestrator};
pub use policy::{ModelConfig, OptimizerConfig, PromptBounds, RetryPolicy};
