use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Exchange rate for '{currency}' not found")]
    MissingRateError { currency: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parse,
    Config,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn parse(message: impl Into<String>) -> Self {
        EtlError::ParseError {
            message: message.into(),
        }
    }

    /// The message followed by every underlying cause, outermost first.
    pub fn with_causes(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        message
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::NetworkError(_) => ErrorCategory::Network,
            EtlError::ParseError { .. } | EtlError::CsvError(_) => ErrorCategory::Parse,
            EtlError::MissingRateError { .. }
            | EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            EtlError::IoError(_) | EtlError::DatabaseError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parse | ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::NetworkError(_) => "Check network connectivity and the source URL, then rerun",
            EtlError::ParseError { .. } => {
                "The source page layout may have changed; review the extraction rules"
            }
            EtlError::CsvError(_) => "Check that the CSV file is well formed",
            EtlError::MissingRateError { .. } => {
                "Add the missing currency to the exchange rate file"
            }
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and rerun"
            }
            EtlError::IoError(_) => "Check file paths and permissions",
            EtlError::DatabaseError(_) => "Check that the database file is writable and not locked",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_rate_is_config_failure() {
        let err = EtlError::MissingRateError {
            currency: "EUR".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.to_string(), "Exchange rate for 'EUR' not found");
    }

    #[test]
    fn test_io_failure_is_critical() {
        let err = EtlError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[derive(Error, Debug)]
    #[error("client error (Connect)")]
    struct ClientError {
        #[source]
        source: std::io::Error,
    }

    #[test]
    fn test_with_causes_includes_nested_sources() {
        let client = ClientError {
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused"),
        };
        let err = EtlError::IoError(std::io::Error::other(client));

        assert_eq!(err.to_string(), "IO error: client error (Connect)");
        assert_eq!(
            err.with_causes(),
            "IO error: client error (Connect): Connection refused"
        );
    }

    #[test]
    fn test_with_causes_without_source_is_message() {
        let err = EtlError::parse("no table");
        assert_eq!(err.with_causes(), err.to_string());
    }

    #[test]
    fn test_parse_helper() {
        let err = EtlError::parse("no table");
        assert_eq!(err.category(), ErrorCategory::Parse);
        assert_eq!(err.to_string(), "Parse error: no table");
    }
}
