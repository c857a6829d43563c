//! Successful results that carry warnings.

use serde::Serialize;

/// A non-fatal condition the caller should be told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The input was cut to `max` characters.
    Truncated { max: usize },
    /// An expired support was renewed.
    SupportExpired,
    /// The proponency application waits for confirmation by the proponents.
    ApplicationPending,
}

/// The value of a successful operation plus its warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Notice>,
}

impl<T> Outcome<T> {
    /// An outcome without warnings.
    pub const fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// An outcome with the given warnings.
    pub const fn with_warnings(value: T, warnings: Vec<Notice>) -> Self {
        Self { value, warnings }
    }

    /// Whether the outcome carries `notice`.
    #[must_use]
    pub fn has(&self, notice: &Notice) -> bool {
        self.warnings.contains(notice)
    }

    /// Transform the value, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}
