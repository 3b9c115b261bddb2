//! Domain error types.

/// A parse error with position information for rule parsing.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for anchorsignal.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("schema error on column '{column}': {reason}")]
    Schema { column: String, reason: String },

    #[error("invalid window for {feature}: {parameter} must be positive")]
    InvalidWindow { feature: String, parameter: String },

    #[error("alignment error: {reason}")]
    Alignment { reason: String },

    #[error("invalid rule: {reason}")]
    RuleInvalid { reason: String },

    #[error(transparent)]
    RuleParse(#[from] ParseError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalError {
    pub(crate) fn schema(column: impl Into<String>, reason: impl Into<String>) -> Self {
        SignalError::Schema {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

impl From<&SignalError> for std::process::ExitCode {
    fn from(err: &SignalError) -> Self {
        let code: u8 = match err {
            SignalError::Io(_) | SignalError::Csv(_) | SignalError::Data { .. } => 1,
            SignalError::ConfigParse { .. }
            | SignalError::ConfigMissing { .. }
            | SignalError::ConfigInvalid { .. } => 2,
            SignalError::Schema { .. } | SignalError::Alignment { .. } => 3,
            SignalError::RuleParse(_)
            | SignalError::RuleInvalid { .. }
            | SignalError::InvalidWindow { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_caret_points_at_offset() {
        let err = ParseError {
            message: "expected ')'".into(),
            position: 6,
        };
        let shown = err.display_with_context("ABOVE(close");
        let lines: Vec<&str> = shown.lines().collect();
        assert_eq!(lines[0], "ABOVE(close");
        assert_eq!(lines[1], "      ^");
        assert!(lines[2].contains("position 6"));
    }

    #[test]
    fn schema_error_names_column() {
        let err = SignalError::schema("close_BTC", "column not found");
        assert_eq!(
            err.to_string(),
            "schema error on column 'close_BTC': column not found"
        );
    }

    #[test]
    fn invalid_window_message() {
        let err = SignalError::InvalidWindow {
            feature: "SMA(close,0)".into(),
            parameter: "window".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid window for SMA(close,0): window must be positive"
        );
    }

    #[test]
    fn rule_parse_converts_from_parse_error() {
        let err: SignalError = ParseError {
            message: "boom".into(),
            position: 0,
        }
        .into();
        assert!(matches!(err, SignalError::RuleParse(_)));
    }
}
