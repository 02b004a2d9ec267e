pub mod analysis;
pub mod envelope;
pub mod error;
pub mod language;
pub mod utils;

pub use analysis::{
    AnalysisRequest, AnalysisResult, ComplexityClass, ComplexityEstimate, DetailedExplanation,
    ProviderKind, QualityMetrics,
};
pub use envelope::{Failure, ResponseEnvelope};
pub use error::{BigoError, ErrorCategory, ErrorClassifier, LlmError, ProviderFailure, Result};
pub use language::{language_from_extension, language_from_path};
pub use utils::{json_score, json_text, json_text_or, truncate_chars};
