//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Prompt construction constants
pub mod prompt {
    /// Maximum number of source characters embedded in a prompt
    pub const MAX_CODE_CHARS: usize = 1500;

    /// Language label used when the caller cannot determine one
    pub const UNKNOWN_LANGUAGE: &str = "Unknown";
}

/// Retry/backoff constants applied to every networked provider call
pub mod retry {
    /// Attempts per provider (first call included)
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 600;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;

    /// Maximum delay between retries (milliseconds)
    pub const MAX_DELAY_MS: u64 = 10_000;
}

/// Primary chat provider constants
pub mod primary {
    /// Default chat server endpoint
    pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

    /// Default chat model
    pub const DEFAULT_MODEL: &str = "claude-sonnet-4";

    /// Settle delay paid once after the chat session is first initialized (milliseconds)
    pub const SETTLE_DELAY_MS: u64 = 1500;

    /// Request timeout (seconds)
    pub const TIMEOUT_SECS: u64 = 120;
}

/// Fallback text endpoint constants
pub mod fallback {
    /// Default plain-text generation endpoint
    pub const DEFAULT_ENDPOINT: &str = "https://text.pollinations.ai";

    /// Request timeout (seconds)
    pub const TIMEOUT_SECS: u64 = 60;
}

/// Canonical defaults substituted by the response normalizer
pub mod defaults {
    /// Time complexity used when none could be extracted
    pub const TIME_NOTATION: &str = "O(n)";

    /// Space complexity used when none could be extracted
    pub const SPACE_NOTATION: &str = "O(1)";

    /// Quality score used when nothing was parsed at all
    pub const UNPARSED_QUALITY: u8 = 70;

    /// Quality score used for a field missing from an otherwise parsed response
    pub const MISSING_QUALITY: u8 = 75;
}

/// Messaging bridge constants
pub mod bridge {
    /// Requests buffered between caller and analysis worker
    pub const QUEUE_CAPACITY: usize = 8;
}
