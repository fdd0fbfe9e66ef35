use thiserror::Error;

/// Errors raised while building or differentiating a graph.
///
/// Both variants describe a permanent property of the graph, so retrying the
/// same call reproduces the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GradError {
    #[error("an invalid operation was performed: {0}")]
    InvalidOperation(String),

    #[error("division by zero while differentiating `{node}`")]
    DivisionByZero { node: String },
}

impl GradError {
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        GradError::InvalidOperation(message.into())
    }

    pub fn division_by_zero(node: impl Into<String>) -> Self {
        GradError::DivisionByZero { node: node.into() }
    }
}

pub type Result<T> = std::result::Result<T, GradError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = GradError::invalid_operation("tag -1 is not binary");
        assert_eq!(
            err.to_string(),
            "an invalid operation was performed: tag -1 is not binary"
        );
        let err = GradError::division_by_zero("(c / b)");
        assert_eq!(
            err.to_string(),
            "division by zero while differentiating `(c / b)`"
        );
    }
}
