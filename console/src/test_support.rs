//! Shared test doubles for bootstrap, admin API, and list view tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::bootstrap::{BootstrapRuntime, PageLifecycle, Sleeper};
use crate::domain::ports::{FetchError, FetchRequest, Payload, ResourceFetcher};
use crate::domain::{Credential, CredentialStore, SessionContext};
use crate::outbound::storage::MemoryTokenStorage;

pub fn fixed_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).single() {
        Some(now) => now,
        None => panic!("valid fixture time"),
    }
}

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Records requested delays and advances a shared clock instead of sleeping.
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
    clock: Arc<MutableClock>,
}

impl RecordingSleeper {
    pub fn new(clock: Arc<MutableClock>) -> Self {
        Self {
            delays: Mutex::new(Vec::new()),
            clock,
        }
    }

    pub fn delays(&self) -> Vec<Duration> {
        match self.delays.lock() {
            Ok(delays) => delays.clone(),
            Err(_) => panic!("sleeper mutex"),
        }
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        match self.delays.lock() {
            Ok(mut delays) => delays.push(duration),
            Err(_) => panic!("sleeper mutex"),
        }
        self.clock.advance(duration);
    }
}

/// Tears the page down the first time a backoff starts, then never wakes.
pub struct TeardownSleeper {
    lifecycle: PageLifecycle,
    calls: Mutex<u32>,
}

impl TeardownSleeper {
    pub fn new(lifecycle: PageLifecycle) -> Self {
        Self {
            lifecycle,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        match self.calls.lock() {
            Ok(calls) => *calls,
            Err(_) => panic!("sleeper mutex"),
        }
    }
}

#[async_trait]
impl Sleeper for TeardownSleeper {
    async fn sleep(&self, _duration: Duration) {
        match self.calls.lock() {
            Ok(mut calls) => *calls += 1,
            Err(_) => panic!("sleeper mutex"),
        }
        self.lifecycle.teardown();
        std::future::pending::<()>().await;
    }
}

/// Replays scripted responses in order and records every request.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<Payload, FetchError>>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    pub fn new(responses: impl IntoIterator<Item = Result<Payload, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(_) => panic!("requests mutex"),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl ResourceFetcher for ScriptedFetcher {
    async fn request(&self, request: FetchRequest) -> Result<Payload, FetchError> {
        match self.requests.lock() {
            Ok(mut requests) => requests.push(request),
            Err(_) => panic!("requests mutex"),
        }
        let next = match self.responses.lock() {
            Ok(mut responses) => responses.pop_front(),
            Err(_) => panic!("responses mutex"),
        };
        next.unwrap_or_else(|| Err(FetchError::network("script exhausted")))
    }
}

/// Session wired to in-memory storage and a scripted fetcher.
pub fn session_with(
    token: Option<&str>,
    fetcher: Arc<ScriptedFetcher>,
) -> (Arc<SessionContext>, Arc<MemoryTokenStorage>) {
    let storage = Arc::new(MemoryTokenStorage::default());
    let store = CredentialStore::restore(storage.clone());
    if let Some(raw) = token {
        let credential = match Credential::new(raw) {
            Ok(credential) => credential,
            Err(error) => panic!("fixture token invalid: {error}"),
        };
        if let Err(error) = store.set(credential) {
            panic!("memory storage failed: {error}");
        }
    }
    (Arc::new(SessionContext::new(store, fetcher)), storage)
}

pub fn recording_runtime(clock: Arc<MutableClock>) -> (BootstrapRuntime, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::new(clock.clone()));
    let runtime = BootstrapRuntime {
        sleeper: sleeper.clone(),
        clock,
    };
    (runtime, sleeper)
}
