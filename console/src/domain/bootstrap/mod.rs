//! Session bootstrap: credential check, profile validation, and role gate.
//!
//! The bootstrapper owns retry policy (exponential backoff through an
//! injected [`Sleeper`]) and cancellation through a [`PageLifecycle`]. It
//! never lets a transport error escape: callers get either the profile or a
//! [`BootstrapHalt`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{FetchError, FetchRequest};
use crate::domain::{Credential, Role, SessionContext, UserProfile};

mod runtime;
mod state;

pub use runtime::{BootstrapRuntime, PageLifecycle, Sleeper, TokioSleeper};
pub use state::{BootstrapEvent, BootstrapState, RejectReason, RetryPolicy, transition};

/// Path of the profile endpoint, relative to the API base.
pub const PROFILE_PATH: &str = "/auth/profile";

/// Why a bootstrap did not produce a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapHalt {
    /// Send the user to the login page.
    Redirect {
        /// What caused the rejection.
        reason: RejectReason,
    },
    /// The page went away; nothing was changed.
    Cancelled,
}

/// One recorded state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    /// When the state was entered.
    pub at: DateTime<Utc>,
    /// State entered.
    pub state: BootstrapState,
}

enum ProfileOutcome {
    Accepted(UserProfile),
    Event(BootstrapEvent),
}

/// Drives a single page's session bootstrap.
pub struct SessionBootstrapper {
    context: Arc<SessionContext>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    lifecycle: PageLifecycle,
    state: BootstrapState,
    history: Vec<TransitionRecord>,
}

impl SessionBootstrapper {
    /// Build a bootstrapper using the Tokio sleeper and system clock.
    pub fn new(context: Arc<SessionContext>, policy: RetryPolicy, lifecycle: PageLifecycle) -> Self {
        Self::with_runtime(context, policy, lifecycle, BootstrapRuntime::default())
    }

    /// Build a bootstrapper with injected runtime abstractions.
    pub fn with_runtime(
        context: Arc<SessionContext>,
        policy: RetryPolicy,
        lifecycle: PageLifecycle,
        runtime: BootstrapRuntime,
    ) -> Self {
        let BootstrapRuntime { sleeper, clock } = runtime;
        let history = vec![TransitionRecord {
            at: clock.utc(),
            state: BootstrapState::Unauthenticated,
        }];
        Self {
            context,
            policy,
            sleeper,
            clock,
            lifecycle,
            state: BootstrapState::Unauthenticated,
            history,
        }
    }

    /// Current state.
    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    /// Every state entered so far, oldest first.
    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    /// Session shared with this bootstrapper.
    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// Lifecycle this bootstrapper observes.
    pub fn lifecycle(&self) -> &PageLifecycle {
        &self.lifecycle
    }

    /// Validate the stored credential and check that it carries `expected`.
    ///
    /// Transient failures are retried per the [`RetryPolicy`]; auth failures,
    /// role mismatches, and exhausted retries clear the credential and yield
    /// [`BootstrapHalt::Redirect`]. Teardown at any await point yields
    /// [`BootstrapHalt::Cancelled`] and leaves the credential alone.
    ///
    /// A bootstrapper runs once; later calls replay the terminal outcome
    /// without network traffic, except that an authorized bootstrapper
    /// revalidates.
    pub async fn bootstrap(&mut self, expected: &Role) -> Result<UserProfile, BootstrapHalt> {
        if let Some(reason) = self.state.rejection() {
            return Err(BootstrapHalt::Redirect {
                reason: reason.clone(),
            });
        }
        if self.state.is_terminal() {
            self.enter(BootstrapState::Unauthenticated);
        }
        if self.lifecycle.is_torn_down() {
            debug!("page already torn down; bootstrap skipped");
            return Err(BootstrapHalt::Cancelled);
        }

        let Some(credential) = self.context.credentials().get() else {
            self.apply(BootstrapEvent::CredentialMissing);
            return Err(self.redirect());
        };
        self.apply(BootstrapEvent::CredentialPresent);

        loop {
            let lifecycle = self.lifecycle.clone();
            let fetch = self.fetch_profile(&credential, expected);
            let outcome = tokio::select! {
                biased;
                () = lifecycle.torn_down() => return Err(self.cancel()),
                outcome = fetch => outcome,
            };

            let event = match outcome {
                ProfileOutcome::Accepted(profile) => {
                    self.apply(BootstrapEvent::ProfileAccepted);
                    info!(
                        role = %profile.role(),
                        user = profile.display_name(),
                        "session authorized"
                    );
                    return Ok(profile);
                }
                ProfileOutcome::Event(event) => event,
            };

            self.apply(event);
            match self.state.clone() {
                BootstrapState::Rejected(_) => {
                    self.context.credentials().clear();
                    return Err(self.redirect());
                }
                BootstrapState::Retrying { retry, delay } => {
                    info!(retry, ?delay, "profile retry scheduled");
                    let lifecycle = self.lifecycle.clone();
                    let sleeper = Arc::clone(&self.sleeper);
                    tokio::select! {
                        biased;
                        () = lifecycle.torn_down() => return Err(self.cancel()),
                        () = sleeper.sleep(delay) => {}
                    }
                    if self.lifecycle.is_torn_down() {
                        return Err(self.cancel());
                    }
                    self.apply(BootstrapEvent::BackoffElapsed);
                }
                other => {
                    warn!(state = ?other, "unexpected bootstrap state; rejecting");
                    self.enter(BootstrapState::Rejected(RejectReason::RetriesExhausted {
                        attempts: self.attempts(),
                    }));
                    self.context.credentials().clear();
                    return Err(self.redirect());
                }
            }
        }
    }

    async fn fetch_profile(&self, credential: &Credential, expected: &Role) -> ProfileOutcome {
        let attempt = self.attempts();
        debug!(attempt, path = PROFILE_PATH, "requesting profile");
        let request = FetchRequest::get(PROFILE_PATH, credential.clone());
        match self.context.fetcher().request(request).await {
            Ok(payload) => match UserProfile::from_payload(payload) {
                Ok(profile) if profile.role().matches(expected) => ProfileOutcome::Accepted(profile),
                Ok(profile) => {
                    warn!(
                        expected = %expected,
                        actual = %profile.role(),
                        "role mismatch"
                    );
                    ProfileOutcome::Event(BootstrapEvent::RoleMismatch {
                        expected: expected.as_str().to_owned(),
                        actual: profile.role().as_str().to_owned(),
                    })
                }
                Err(error) => {
                    warn!(attempt, %error, "profile payload unusable");
                    ProfileOutcome::Event(BootstrapEvent::TransientFailure)
                }
            },
            Err(FetchError::Auth { status }) => {
                warn!(attempt, status, "credential rejected");
                ProfileOutcome::Event(BootstrapEvent::AuthFailed { status })
            }
            Err(error) => {
                warn!(attempt, kind = error.kind(), %error, "profile request failed");
                ProfileOutcome::Event(BootstrapEvent::TransientFailure)
            }
        }
    }

    fn attempts(&self) -> u32 {
        match self.state {
            BootstrapState::Validating { attempt } => attempt,
            BootstrapState::Retrying { retry, .. } => retry,
            _ => 0,
        }
    }

    fn apply(&mut self, event: BootstrapEvent) {
        let next = transition(&self.state, event, &self.policy);
        if next != self.state {
            self.enter(next);
        }
    }

    fn enter(&mut self, state: BootstrapState) {
        debug!(from = ?self.state, to = ?state, "bootstrap transition");
        self.history.push(TransitionRecord {
            at: self.clock.utc(),
            state: state.clone(),
        });
        self.state = state;
    }

    fn redirect(&self) -> BootstrapHalt {
        let reason = self
            .state
            .rejection()
            .cloned()
            .unwrap_or(RejectReason::MissingCredential);
        info!(%reason, "redirecting to login");
        BootstrapHalt::Redirect { reason }
    }

    fn cancel(&self) -> BootstrapHalt {
        info!(state = ?self.state, "page torn down; bootstrap abandoned");
        BootstrapHalt::Cancelled
    }
}
