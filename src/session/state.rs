//! Login gate states.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    LoggedOut,
    /// A code lookup is in flight.
    Validating,
    Authenticated,
    /// The server refused the code.
    RejectedCode,
    /// The server could not be reached or answered with unusable data.
    NetworkError,
}

impl GateState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoggedOut => "logged_out",
            Self::Validating => "validating",
            Self::Authenticated => "authenticated",
            Self::RejectedCode => "rejected_code",
            Self::NetworkError => "network_error",
        }
    }

    /// Whether the code input should accept another attempt.
    #[must_use]
    pub const fn accepts_input(self) -> bool {
        !matches!(self, Self::Validating)
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
