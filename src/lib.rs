//! Bigology - AI-Assisted Big-O Complexity Summaries
//!
//! Takes a submitted solution and its language, asks a language model for a
//! complexity analysis, and returns one canonical record whatever shape the
//! model replied in.
//!
//! ## Pipeline
//!
//! - **Prompt**: code truncated to a bounded length, embedded in a fixed
//!   instruction template
//! - **Provider Chain**: primary chat provider, then a plain-text fallback,
//!   each with exponential backoff on transient failures
//! - **Normalizer**: JSON, labeled-text and bare-notation strategies, with a
//!   default record when nothing is recognizable
//! - **Bridge**: request/response messaging to a worker task owning the
//!   analyzer
//!
//! ## Quick Start
//!
//! ```ignore
//! use bigology::{AnalysisService, ComplexityAnalyzer, ConfigLoader};
//!
//! let config = ConfigLoader::load()?;
//! let (handle, _worker) = AnalysisService::spawn(ComplexityAnalyzer::from_config(&config)?);
//! let envelope = handle.analyze("for x in xs: print(x)", "Python").await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: prompt builder, provider chain, response normalizer
//! - [`analyzer`]: end-to-end analysis pipeline
//! - [`bridge`]: messaging between caller and analysis worker
//! - [`session`]: caller-side submission tracking
//! - [`config`]: layered configuration

pub mod ai;
pub mod analyzer;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod constants;
pub mod session;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, PromptTemplate};

// Error Types
pub use types::error::{BigoError, ErrorCategory, Result};

// Domain Types
pub use types::{
    AnalysisRequest, AnalysisResult, ComplexityClass, ComplexityEstimate, ProviderKind,
    ResponseEnvelope,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use analyzer::ComplexityAnalyzer;
pub use bridge::{AnalysisBackend, AnalysisHandle, AnalysisService};
pub use session::{Admission, SubmissionState, SubmissionTracker, UserNotice};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{ProviderChain, TextProvider, build_prompt, create_chain, normalize};
