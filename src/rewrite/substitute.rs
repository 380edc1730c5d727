//! Ordered literal / regex substitutions applied to a whole text document.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::PrepError;
use crate::models::PassOutcome;

/// One replacement step.
#[derive(Debug, Clone)]
pub enum Substitution {
    /// Replace every occurrence of `from` with `to`.
    Literal {
        /// Text searched for.
        from: String,
        /// Replacement text.
        to: String,
    },
    /// Replace every match of `regex`; `replacement` may use `$1`-style captures.
    Pattern {
        /// Compiled expression.
        regex: Regex,
        /// Replacement template.
        replacement: String,
    },
}

impl Substitution {
    /// Build a literal step.
    pub fn literal(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Literal {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Build a regex step.
    pub fn pattern(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self::Pattern {
            regex: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self {
            Self::Literal { from, to } => {
                if from.is_empty() || !text.contains(from.as_str()) {
                    Cow::Borrowed(text)
                } else {
                    Cow::Owned(text.replace(from.as_str(), to))
                }
            }
            Self::Pattern { regex, replacement } => regex.replace_all(text, replacement.as_str()),
        }
    }
}

/// An ordered list of substitutions applied left to right.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionPass {
    steps: Vec<Substitution>,
}

impl SubstitutionPass {
    /// Empty pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn with(mut self, step: Substitution) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a step in place.
    pub fn push(&mut self, step: Substitution) {
        self.steps.push(step);
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pass has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step to `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        for step in &self.steps {
            let replaced = match step.apply(&current) {
                Cow::Owned(next) => Some(next),
                Cow::Borrowed(_) => None,
            };
            if let Some(next) = replaced {
                current = next;
            }
        }
        current
    }

    /// Apply the pass to `input`, writing to `output` or back to `input`.
    ///
    /// In-place runs only touch the file when the content changed; an explicit output is
    /// always written.
    pub fn apply_file(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<PassOutcome, PrepError> {
        let original = read_document(input)?;
        let updated = self.apply(&original);
        let outcome = if updated == original {
            PassOutcome::Unchanged
        } else {
            PassOutcome::Changed
        };

        match output {
            Some(target) => write_document(target, &updated)?,
            None if outcome.changed() => write_document(input, &updated)?,
            None => {}
        }

        Ok(outcome)
    }
}

/// Read a UTF-8 document.
pub fn read_document(path: &Path) -> Result<String, PrepError> {
    fs::read_to_string(path).map_err(|err| PrepError::io(path, err))
}

/// Write a UTF-8 document, creating parent directories.
pub fn write_document(path: &Path, content: &str) -> Result<(), PrepError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| PrepError::io(parent, err))?;
    }
    fs::write(path, content).map_err(|err| PrepError::io(path, err))
}
