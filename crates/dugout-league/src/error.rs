use thiserror::Error;

/// A counter update that would break a statistical invariant. The update is
/// not applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatError {
    #[error("{stat} would become negative ({current} + {delta})")]
    Negative {
        stat: &'static str,
        current: f64,
        delta: f64,
    },

    #[error("{stat} would exceed {bound} ({value} > {limit})")]
    ExceedsBound {
        stat: &'static str,
        bound: &'static str,
        value: f64,
        limit: f64,
    },

    #[error("{stat} cannot be recorded without at-bats")]
    NoAtBats { stat: &'static str },

    #[error("{stat} would overflow ({current} + {delta})")]
    Overflow {
        stat: &'static str,
        current: i64,
        delta: i64,
    },
}

impl StatError {
    /// Name of the counter the rejected update targeted.
    pub fn stat(&self) -> &'static str {
        match self {
            StatError::Negative { stat, .. }
            | StatError::ExceedsBound { stat, .. }
            | StatError::NoAtBats { stat }
            | StatError::Overflow { stat, .. } => stat,
        }
    }
}
