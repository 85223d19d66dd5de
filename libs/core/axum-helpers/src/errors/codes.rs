//! Stable error identifiers attached to log events.
//!
//! Clients only ever see the envelope message; operators filter logs on `error_code`.

/// Machine-readable identifier for each failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidIdentifier,
    ValidationFailed,
    DuplicateKey,
    NotFound,
    RouteNotFound,
    Internal,
}

impl ErrorCode {
    /// Integer code for dashboards and alerting
    pub const fn code(&self) -> i32 {
        match self {
            ErrorCode::InvalidIdentifier => 1001,
            ErrorCode::ValidationFailed => 1002,
            ErrorCode::DuplicateKey => 1003,
            ErrorCode::NotFound => 1004,
            ErrorCode::RouteNotFound => 1005,
            ErrorCode::Internal => 2000,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidIdentifier => "INVALID_IDENTIFIER",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::DuplicateKey => "DUPLICATE_KEY",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::RouteNotFound => "ROUTE_NOT_FOUND",
            ErrorCode::Internal => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_codes_are_below_server_codes() {
        let client = [
            ErrorCode::InvalidIdentifier,
            ErrorCode::ValidationFailed,
            ErrorCode::DuplicateKey,
            ErrorCode::NotFound,
            ErrorCode::RouteNotFound,
        ];
        for code in client {
            assert!(code.code() < ErrorCode::Internal.code(), "{code}");
        }
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(ErrorCode::DuplicateKey.to_string(), "DUPLICATE_KEY");
    }
}
