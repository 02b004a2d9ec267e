use console::style;

use crate::session::UserNotice;

/// Terminal status lines. Status goes to stderr so stdout stays pipeable.
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Show why an analysis produced no result
    pub fn notice(&self, notice: &UserNotice) {
        match notice {
            UserNotice::RetryShortly { .. } => self.warning(&notice.to_string()),
            UserNotice::ReloadPage | UserNotice::Message(_) => self.error(&notice.to_string()),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
