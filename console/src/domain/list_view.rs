//! View models for the admin list pages.
//!
//! A [`ListViewModel`] binds one collection to its [`FilterState`]: mount runs
//! the session bootstrap, refresh reloads the records, and [`visible`] derives
//! what the page shows through the query engine.
//!
//! [`visible`]: ListViewModel::visible

use tracing::{debug, info, warn};

use crate::domain::bootstrap::{BootstrapHalt, PageLifecycle, SessionBootstrapper};
use crate::domain::query::{self, FilterState, SortDirection};
use crate::domain::records::{
    AdminResource, Donor, DonorSummary, Facility, FacilityStatus, STATUS_FIELD,
};
use crate::domain::{AdminApi, Error, Role, UserProfile};

/// Result of mounting a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    /// Session authorized and records loaded.
    Ready(UserProfile),
    /// Send the user to the login page.
    RedirectToLogin,
    /// The page went away before mount finished.
    Cancelled,
}

/// Result of one reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Records replaced; carries the new total.
    Loaded(usize),
    /// The page went away; records were left as they were.
    Abandoned,
}

/// Records of one admin collection plus the user's filter state.
pub struct ListViewModel<R: AdminResource> {
    api: AdminApi,
    lifecycle: PageLifecycle,
    records: Vec<R>,
    filter: FilterState,
    last_error: Option<Error>,
}

impl<R: AdminResource> ListViewModel<R> {
    /// An empty view with the default filter.
    pub fn new(api: AdminApi, lifecycle: PageLifecycle) -> Self {
        Self::with_filter(api, lifecycle, FilterState::default())
    }

    /// An empty view with an initial filter.
    pub fn with_filter(api: AdminApi, lifecycle: PageLifecycle, filter: FilterState) -> Self {
        Self {
            api,
            lifecycle,
            records: Vec::new(),
            filter,
            last_error: None,
        }
    }

    /// Bootstrap the session for `expected`, then load the records.
    ///
    /// A load rejected for authorization (the credential is already cleared
    /// by then) also ends in [`ViewOutcome::RedirectToLogin`].
    ///
    /// # Errors
    ///
    /// Returns any other load error when the session is authorized but the
    /// records cannot be fetched; the error is also kept in
    /// [`Self::last_error`].
    pub async fn mount(
        &mut self,
        bootstrapper: &mut SessionBootstrapper,
        expected: &Role,
    ) -> Result<ViewOutcome, Error> {
        let profile = match bootstrapper.bootstrap(expected).await {
            Ok(profile) => profile,
            Err(BootstrapHalt::Redirect { reason }) => {
                info!(%reason, path = R::LIST_PATH, "view redirected to login");
                return Ok(ViewOutcome::RedirectToLogin);
            }
            Err(BootstrapHalt::Cancelled) => return Ok(ViewOutcome::Cancelled),
        };
        match self.refresh().await {
            Ok(Refresh::Loaded(_)) => Ok(ViewOutcome::Ready(profile)),
            Ok(Refresh::Abandoned) => Ok(ViewOutcome::Cancelled),
            Err(error) if error.requires_login() => {
                info!(path = R::LIST_PATH, %error, "load refused; redirecting to login");
                Ok(ViewOutcome::RedirectToLogin)
            }
            Err(error) => Err(error),
        }
    }

    /// Reload the collection.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after logging it and storing it in
    /// [`Self::last_error`]; the previous records stay visible.
    pub async fn refresh(&mut self) -> Result<Refresh, Error> {
        let lifecycle = self.lifecycle.clone();
        let api = self.api.clone();
        let result = tokio::select! {
            biased;
            () = lifecycle.torn_down() => {
                debug!(path = R::LIST_PATH, "page torn down; reload abandoned");
                return Ok(Refresh::Abandoned);
            }
            result = api.list::<R>() => result,
        };
        match result {
            Ok(records) => {
                self.records = records;
                self.last_error = None;
                Ok(Refresh::Loaded(self.records.len()))
            }
            Err(error) => {
                warn!(path = R::LIST_PATH, code = ?error.code(), %error, "reload failed");
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Records passing the current filter, in display order.
    pub fn visible(&self) -> Vec<&R> {
        query::apply(&self.records, &self.filter)
    }

    /// `(shown, total)` for the "showing N of M" line.
    pub fn counts(&self) -> (usize, usize) {
        (self.visible().len(), self.records.len())
    }

    /// Every loaded record, unfiltered.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Current filter.
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Error from the latest failed reload, cleared by a successful one.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Replace the search text.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.filter.set_search(text);
    }

    /// Constrain one categorical field; `"all"` lifts the constraint.
    pub fn set_category(&mut self, field: &str, raw: &str) {
        self.filter.set_category(field, raw);
    }

    /// Choose the sort key.
    pub fn set_sort_key(&mut self, key: impl Into<String>) {
        self.filter.set_sort_key(key);
    }

    /// Flip ascending/descending.
    pub fn toggle_sort_direction(&mut self) {
        self.filter.toggle_sort_direction();
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id() != id);
        before != self.records.len()
    }
}

impl ListViewModel<Donor> {
    /// Counters over every loaded donor, ignoring the filter.
    pub fn summary(&self) -> DonorSummary {
        DonorSummary::from_donors(&self.records)
    }
}

/// Review queue of facilities awaiting approval.
pub struct FacilityApprovals {
    view: ListViewModel<Facility>,
}

impl FacilityApprovals {
    /// A queue filtered to pending facilities, newest registration first.
    pub fn new(api: AdminApi, lifecycle: PageLifecycle) -> Self {
        let filter = FilterState::default()
            .with_category(STATUS_FIELD, FacilityStatus::Pending.as_str())
            .with_sort("createdAt", SortDirection::Descending);
        Self {
            view: ListViewModel::with_filter(api, lifecycle, filter),
        }
    }

    /// Underlying list view, for search and sort changes.
    pub fn view(&self) -> &ListViewModel<Facility> {
        &self.view
    }

    /// Mutable access to the underlying list view.
    pub fn view_mut(&mut self) -> &mut ListViewModel<Facility> {
        &mut self.view
    }

    /// Bootstrap and load; see [`ListViewModel::mount`].
    ///
    /// # Errors
    ///
    /// As for [`ListViewModel::mount`].
    pub async fn mount(
        &mut self,
        bootstrapper: &mut SessionBootstrapper,
        expected: &Role,
    ) -> Result<ViewOutcome, Error> {
        self.view.mount(bootstrapper, expected).await
    }

    /// Pending facilities in display order.
    pub fn pending(&self) -> Vec<&Facility> {
        self.view.visible()
    }

    /// Approve one facility and drop it from the queue.
    ///
    /// # Errors
    ///
    /// Propagates the [`AdminApi::approve_facility`] error; the queue is left
    /// unchanged.
    pub async fn approve(&mut self, id: &str) -> Result<String, Error> {
        let message = self.view.api.approve_facility(id).await?;
        self.settle(id);
        Ok(message)
    }

    /// Reject one facility with a reason and drop it from the queue.
    ///
    /// # Errors
    ///
    /// `invalid_request` for a blank reason, without a backend call;
    /// otherwise the [`AdminApi::reject_facility`] error.
    pub async fn reject(&mut self, id: &str, reason: &str) -> Result<String, Error> {
        let message = self.view.api.reject_facility(id, reason).await?;
        self.settle(id);
        Ok(message)
    }

    fn settle(&mut self, id: &str) {
        if !self.view.remove(id.trim()) {
            debug!(facility = id, "reviewed facility was not in the local queue");
        }
    }
}
