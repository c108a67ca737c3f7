//! # Report redaction.
//!
//! Replaces absolute filesystem paths in captured output with stable
//! placeholder tokens, so a [`ProcessReport`](crate::ProcessReport) is
//! reproducible across machines and does not leak the local directory
//! layout. Backslashes are normalized to forward slashes first, so Windows
//! and unix renderings of the same path hit the same rule.
//!
//! Tokens never contain the needles they replace, which makes redaction
//! idempotent: applying it twice yields the same text as applying it once.

use std::path::Path;

/// Placeholder for the working tree the child ran in.
pub const PROJECT_TOKEN: &str = "<project>";

/// Placeholder for the interpreter/toolchain installation directory.
pub const TOOLCHAIN_TOKEN: &str = "<toolchain>";

/// Ordered needle→token replacement over report text.
#[derive(Clone, Debug, Default)]
pub struct Redactor {
    /// Kept sorted longest-needle-first so nested paths resolve to the
    /// most specific token.
    rules: Vec<(String, String)>,
}

impl Redactor {
    /// Builds the standard rules for one run: the working tree maps to
    /// [`PROJECT_TOKEN`]; when the invoked program's path is absolute, its
    /// directory maps to [`TOOLCHAIN_TOKEN`].
    pub fn for_run(cwd: &Path, program: &Path) -> Self {
        let mut redactor = Self::default();

        if program.is_absolute() {
            if let Some(dir) = program.parent() {
                redactor.add(&dir.display().to_string(), TOOLCHAIN_TOKEN);
            }
        }

        redactor.add(&cwd.display().to_string(), PROJECT_TOKEN);
        // Symlinked working directories appear in output under either name.
        if let Ok(canonical) = cwd.canonicalize() {
            redactor.add(&canonical.display().to_string(), PROJECT_TOKEN);
        }
        redactor
    }

    /// Adds a custom rule. Needles are normalized to forward slashes.
    pub fn rule(mut self, needle: &str, token: &str) -> Self {
        self.add(needle, token);
        self
    }

    fn add(&mut self, needle: &str, token: &str) {
        let needle = needle.replace('\\', "/");
        if needle.is_empty() || self.rules.iter().any(|(n, _)| *n == needle) {
            return;
        }
        self.rules.push((needle, token.to_string()));
        self.rules.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Applies all rules to the given text.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.replace('\\', "/");
        for (needle, token) in &self.rules {
            out = out.replace(needle.as_str(), token);
        }
        out
    }
}
