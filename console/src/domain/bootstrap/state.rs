//! Pure state machine for session bootstrap.
//!
//! The bootstrapper feeds events into [`transition`] and acts on the state it
//! gets back. Nothing here sleeps, fetches, or touches the credential, so
//! every path is testable without timers.

use std::fmt;
use std::time::Duration;

/// Retry limits for transient profile failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Base unit of the exponential backoff; retry `n` waits `base * 2^n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (1-based).
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use bloodbank_console::domain::bootstrap::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.delay_for(1), Duration::from_secs(2));
    /// assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    /// ```
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor)
    }
}

/// Why a bootstrap ended in [`BootstrapState::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No credential was stored.
    MissingCredential,
    /// The session is valid but belongs to another role.
    RoleMismatch {
        /// Role the page requires.
        expected: String,
        /// Role the backend reported.
        actual: String,
    },
    /// The backend refused the credential.
    AuthRejected {
        /// HTTP status (401 or 403).
        status: u16,
    },
    /// Transient failures outlasted the retry budget.
    RetriesExhausted {
        /// Network attempts made, including the first.
        attempts: u32,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "no stored credential"),
            Self::RoleMismatch { expected, actual } => {
                write!(f, "role '{actual}' cannot open a '{expected}' page")
            }
            Self::AuthRejected { status } => {
                write!(f, "credential rejected with status {status}")
            }
            Self::RetriesExhausted { attempts } => {
                write!(f, "profile unavailable after {attempts} attempts")
            }
        }
    }
}

/// Bootstrap lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapState {
    /// Nothing has been checked yet.
    Unauthenticated,
    /// A profile request is in flight.
    Validating {
        /// 1-based network attempt number.
        attempt: u32,
    },
    /// Waiting out the backoff before the next attempt.
    Retrying {
        /// 1-based retry number.
        retry: u32,
        /// Backoff being waited.
        delay: Duration,
    },
    /// Profile accepted; terminal.
    Authorized,
    /// Access denied; terminal.
    Rejected(RejectReason),
}

impl BootstrapState {
    /// Whether no further event can change this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authorized | Self::Rejected(_))
    }

    /// Rejection reason, when rejected.
    pub fn rejection(&self) -> Option<&RejectReason> {
        match self {
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Inputs observed by the bootstrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapEvent {
    /// Credential store is empty.
    CredentialMissing,
    /// Credential store holds a token.
    CredentialPresent,
    /// Profile decoded and its role matched.
    ProfileAccepted,
    /// Profile decoded but its role did not match.
    RoleMismatch {
        /// Role the page requires.
        expected: String,
        /// Role the backend reported.
        actual: String,
    },
    /// Backend answered 401 or 403.
    AuthFailed {
        /// HTTP status.
        status: u16,
    },
    /// Network, server, or decode failure.
    TransientFailure,
    /// Backoff wait completed.
    BackoffElapsed,
}

/// Compute the next state.
///
/// Terminal states absorb every event. Events that do not apply to the
/// current state leave it unchanged.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use bloodbank_console::domain::bootstrap::{
///     BootstrapEvent, BootstrapState, RetryPolicy, transition,
/// };
///
/// let policy = RetryPolicy::default();
/// let validating = BootstrapState::Validating { attempt: 1 };
/// assert_eq!(
///     transition(&validating, BootstrapEvent::TransientFailure, &policy),
///     BootstrapState::Retrying { retry: 1, delay: Duration::from_secs(2) },
/// );
/// ```
pub fn transition(
    state: &BootstrapState,
    event: BootstrapEvent,
    policy: &RetryPolicy,
) -> BootstrapState {
    match (state, event) {
        (terminal, _) if terminal.is_terminal() => terminal.clone(),
        (BootstrapState::Unauthenticated, BootstrapEvent::CredentialMissing) => {
            BootstrapState::Rejected(RejectReason::MissingCredential)
        }
        (BootstrapState::Unauthenticated, BootstrapEvent::CredentialPresent) => {
            BootstrapState::Validating { attempt: 1 }
        }
        (BootstrapState::Validating { .. }, BootstrapEvent::ProfileAccepted) => {
            BootstrapState::Authorized
        }
        (BootstrapState::Validating { .. }, BootstrapEvent::RoleMismatch { expected, actual }) => {
            BootstrapState::Rejected(RejectReason::RoleMismatch { expected, actual })
        }
        (BootstrapState::Validating { .. }, BootstrapEvent::AuthFailed { status }) => {
            BootstrapState::Rejected(RejectReason::AuthRejected { status })
        }
        (BootstrapState::Validating { attempt }, BootstrapEvent::TransientFailure) => {
            let retry = *attempt;
            if retry <= policy.max_retries {
                BootstrapState::Retrying {
                    retry,
                    delay: policy.delay_for(retry),
                }
            } else {
                BootstrapState::Rejected(RejectReason::RetriesExhausted { attempts: *attempt })
            }
        }
        (BootstrapState::Retrying { retry, .. }, BootstrapEvent::BackoffElapsed) => {
            BootstrapState::Validating {
                attempt: retry.saturating_add(1),
            }
        }
        (unchanged, _) => unchanged.clone(),
    }
}
