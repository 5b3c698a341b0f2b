/// Result of a model-backed step.
///
/// Either the model produced the value, or the step substituted its static
/// default and recorded why. Callers never see the underlying error type.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Model(T),
    Fallback { value: T, reason: String },
}

impl<T> Outcome<T> {
    #[cfg(test)]
    pub fn value(&self) -> &T {
        match self {
            Outcome::Model(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Model(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    #[cfg(test)]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }

    /// Operator-facing warning, present only on the fallback path.
    pub fn warning(&self) -> Option<&str> {
        match self {
            Outcome::Model(_) => None,
            Outcome::Fallback { reason, .. } => Some(reason),
        }
    }
}
