//! The check coordinator: gatekeeping, rate limiting, request coalescing and
//! fan-out of DNT policy checks.
//!
//! A call to [`CheckCoordinator::check_domain`] makes its decision
//! synchronously under a single lock:
//!
//! 1. malformed domains are rejected,
//! 2. a disabled settings gate turns the call into a no-op,
//! 3. a domain with a fetch in flight gets the caller appended as a waiter,
//! 4. a domain checked less than one recheck interval ago is skipped,
//! 5. otherwise the recheck time is stamped, an in-flight entry is created and
//!    a fetch task is spawned.
//!
//! The stamp is written when the fetch *starts*. Callers arriving while it is
//! outstanding therefore see either the in-flight entry or the fresh stamp,
//! never an eligible domain.

use crate::clock::{Clock, SystemClock};
use crate::config::{CheckerConfig, PolicyLocator};
use crate::store::MemoryRecheckStore;
use chrono::TimeDelta;
use dnt_core::{
    DntError, Domain, PolicyFetcher, PolicyTextSource, RecheckTimeStore, Result, SettingsGate,
};
use futures_util::FutureExt;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Receives the compliance result of a check.
pub type Callback = Box<dyn FnOnce(bool) + Send + 'static>;

/// What a call to [`CheckCoordinator::check_domain`] decided.
///
/// Informational only: none of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// A new fetch was started; the caller is its first waiter
    Started,
    /// A fetch was already in flight; the caller joined it
    Joined,
    /// Checked too recently; nothing happens
    RateLimited,
    /// Checking is switched off; nothing happens
    Disabled,
    /// The domain is malformed; nothing happens
    Rejected,
}

impl CheckOutcome {
    /// Returns true if the caller will receive a result
    #[must_use]
    pub const fn is_attached(self) -> bool {
        matches!(self, Self::Started | Self::Joined)
    }

    /// Short lowercase label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Joined => "joined",
            Self::RateLimited => "rate-limited",
            Self::Disabled => "disabled",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Awaitable handle returned by [`CheckCoordinator::check`].
#[derive(Debug)]
pub struct CheckTicket {
    outcome: CheckOutcome,
    receiver: Option<oneshot::Receiver<bool>>,
}

impl CheckTicket {
    /// The decision taken for this call
    #[must_use]
    pub const fn outcome(&self) -> CheckOutcome {
        self.outcome
    }

    /// Wait for the compliance result.
    ///
    /// `None` when the call was skipped and no fetch will report to it.
    pub async fn result(self) -> Option<bool> {
        match self.receiver {
            Some(receiver) => receiver.await.ok(),
            None => None,
        }
    }
}

/// Waiters attached to one outstanding fetch.
struct InFlight {
    waiters: Mutex<Vec<Callback>>,
}

impl InFlight {
    fn new(first: Option<Callback>) -> Self {
        Self {
            waiters: Mutex::new(first.into_iter().collect()),
        }
    }

    fn push(&self, callback: Callback) {
        self.waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    fn take(&self) -> Vec<Callback> {
        std::mem::take(&mut *self.waiters.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Rate-limited, deduplicating DNT policy checker.
///
/// Cheap to clone; clones share all state. Independent instances share
/// nothing except what their builders were given.
#[derive(Clone)]
pub struct CheckCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: Arc<dyn PolicyFetcher>,
    policy: Arc<dyn PolicyTextSource>,
    store: Arc<dyn RecheckTimeStore>,
    gate: Arc<dyn SettingsGate>,
    clock: Arc<dyn Clock>,
    recheck_interval: TimeDelta,
    fetch_timeout: Duration,
    locator: PolicyLocator,
    pacer: Option<DefaultDirectRateLimiter>,
    runtime: Handle,
    in_flight: Mutex<HashMap<Domain, Arc<InFlight>>>,
}

impl CheckCoordinator {
    /// Create a builder around the two required collaborators
    #[must_use]
    pub fn builder<F, P>(fetcher: F, policy: P) -> CheckCoordinatorBuilder
    where
        F: PolicyFetcher + 'static,
        P: PolicyTextSource + 'static,
    {
        CheckCoordinatorBuilder::new(Arc::new(fetcher), Arc::new(policy))
    }

    /// Check `domain`, reporting the result to `callback` if one is given.
    ///
    /// Never blocks on the network: the decision is made immediately and the
    /// fetch, if any, runs on the coordinator's runtime.
    pub fn check_domain(&self, domain: &str, callback: Option<Callback>) -> CheckOutcome {
        let Ok(domain) = Domain::parse(domain) else {
            debug!(input = %domain, "rejecting malformed domain");
            return CheckOutcome::Rejected;
        };

        if !self.inner.gate.checking_enabled() {
            let detached = self.inner.detach_all();
            debug!(domain = %domain, detached, "DNT checking disabled, skipping");
            return CheckOutcome::Disabled;
        }

        let entry = {
            let mut table = self.inner.table();

            if let Some(entry) = table.get(&domain) {
                if let Some(callback) = callback {
                    entry.push(callback);
                }
                debug!(domain = %domain, "joined in-flight check");
                return CheckOutcome::Joined;
            }

            let now = self.inner.clock.now();
            if let Some(last) = self.inner.store.get(&domain) {
                if now.signed_duration_since(last) < self.inner.recheck_interval {
                    debug!(domain = %domain, last_checked_at = %last, "rate limited");
                    return CheckOutcome::RateLimited;
                }
            }

            self.inner.store.set(&domain, now);
            let entry = Arc::new(InFlight::new(callback));
            table.insert(domain.clone(), Arc::clone(&entry));
            entry
        };

        debug!(domain = %domain, "starting DNT policy check");
        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(inner.run(domain, entry));

        CheckOutcome::Started
    }

    /// Check `domain` and hand the result to `f`.
    pub fn check_domain_then<F>(&self, domain: &str, f: F) -> CheckOutcome
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.check_domain(domain, Some(Box::new(f)))
    }

    /// Check `domain` and get a ticket that resolves to the result.
    pub fn check(&self, domain: &str) -> CheckTicket {
        let (tx, rx) = oneshot::channel();
        let outcome = self.check_domain_then(domain, move |compliant| {
            let _ = tx.send(compliant);
        });

        CheckTicket {
            outcome,
            receiver: outcome.is_attached().then_some(rx),
        }
    }

    /// Forget every in-flight entry.
    ///
    /// Fetches already running still complete and notify the waiters they
    /// had; later callers for those domains no longer join them.
    pub fn reset(&self) {
        let detached = self.inner.detach_all();
        debug!(detached, "reset in-flight table");
    }

    /// Number of domains with a fetch outstanding
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.inner.table().len()
    }
}

impl Inner {
    fn table(&self) -> MutexGuard<'_, HashMap<Domain, Arc<InFlight>>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn detach_all(&self) -> usize {
        let mut table = self.table();
        let detached = table.len();
        table.clear();
        detached
    }

    async fn run(self: Arc<Self>, domain: Domain, entry: Arc<InFlight>) {
        let compliant = AssertUnwindSafe(self.verify(&domain))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                warn!(domain = %domain, "DNT policy check panicked");
                false
            });

        self.resolve(&domain, &entry, compliant);
    }

    /// Fetch the domain's policy and compare it with the canonical text
    async fn verify(&self, domain: &Domain) -> bool {
        if let Some(pacer) = &self.pacer {
            pacer.until_ready().await;
        }

        let url = self.locator.url_for(domain);
        match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&url)).await {
            Ok(Ok(response)) if response.is_ok() => {
                let compliant = self.policy.accepts(&response.body);
                if !compliant {
                    debug!(domain = %domain, bytes = response.body.len(), "policy body does not match");
                }
                compliant
            }
            Ok(Ok(response)) => {
                debug!(domain = %domain, status = response.status, "no DNT policy served");
                false
            }
            Ok(Err(e)) => {
                if e.is_transport() {
                    warn!(domain = %domain, url = %url, error = %e, "DNT policy fetch failed");
                } else {
                    warn!(domain = %domain, error = %e, "DNT policy fetcher error");
                }
                false
            }
            Err(_) => {
                let e = DntError::Timeout(self.fetch_timeout);
                warn!(domain = %domain, url = %url, error = %e, "DNT policy fetch abandoned");
                false
            }
        }
    }

    /// Retire the entry and notify its waiters in the order they arrived
    fn resolve(&self, domain: &Domain, entry: &Arc<InFlight>, compliant: bool) {
        {
            let mut table = self.table();
            if table
                .get(domain)
                .is_some_and(|current| Arc::ptr_eq(current, entry))
            {
                table.remove(domain);
            }
        }

        // Unreachable from the table now, so no waiter can be added.
        let waiters = entry.take();
        info!(domain = %domain, compliant, waiters = waiters.len(), "DNT policy check resolved");

        for callback in waiters {
            if std::panic::catch_unwind(AssertUnwindSafe(|| callback(compliant))).is_err() {
                warn!(domain = %domain, "DNT check callback panicked");
            }
        }
    }
}

/// Builder for configuring a [`CheckCoordinator`]
pub struct CheckCoordinatorBuilder {
    fetcher: Arc<dyn PolicyFetcher>,
    policy: Arc<dyn PolicyTextSource>,
    store: Arc<dyn RecheckTimeStore>,
    gate: Arc<dyn SettingsGate>,
    clock: Arc<dyn Clock>,
    recheck_interval: Duration,
    fetch_timeout: Duration,
    pacing: Option<Duration>,
    locator: PolicyLocator,
    runtime: Option<Handle>,
}

impl CheckCoordinatorBuilder {
    fn new(fetcher: Arc<dyn PolicyFetcher>, policy: Arc<dyn PolicyTextSource>) -> Self {
        let defaults = CheckerConfig::default();
        Self {
            fetcher,
            policy,
            store: Arc::new(MemoryRecheckStore::new()),
            gate: Arc::new(|| true),
            clock: Arc::new(SystemClock),
            recheck_interval: defaults.recheck_interval(),
            fetch_timeout: defaults.fetch_timeout(),
            pacing: defaults.pacing_interval(),
            locator: defaults.locator(),
            runtime: None,
        }
    }

    /// Apply interval, timeout, pacing and locator settings from a config
    #[must_use]
    pub fn config(mut self, config: &CheckerConfig) -> Self {
        self.recheck_interval = config.recheck_interval();
        self.fetch_timeout = config.fetch_timeout();
        self.pacing = config.pacing_interval();
        self.locator = config.locator();
        self
    }

    /// Set the recheck-time store (default: in memory)
    #[must_use]
    pub fn store<S: RecheckTimeStore + 'static>(mut self, store: Arc<S>) -> Self {
        self.store = store;
        self
    }

    /// Set the settings gate (default: always enabled)
    #[must_use]
    pub fn gate<G: SettingsGate + 'static>(mut self, gate: G) -> Self {
        self.gate = Arc::new(gate);
        self
    }

    /// Set the clock (default: system clock)
    #[must_use]
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Set the per-domain rate-limit window
    #[must_use]
    pub const fn recheck_interval(mut self, interval: Duration) -> Self {
        self.recheck_interval = interval;
        self
    }

    /// Set the deadline after which a fetch counts as failed
    #[must_use]
    pub const fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the minimum spacing between outbound fetches, `None` to disable
    #[must_use]
    pub const fn pacing(mut self, interval: Option<Duration>) -> Self {
        self.pacing = interval;
        self
    }

    /// Set where policies are fetched from
    #[must_use]
    pub fn locator(mut self, locator: PolicyLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Run fetches on this runtime instead of the current one
    #[must_use]
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the coordinator.
    ///
    /// Without an explicit runtime this must be called from within a Tokio
    /// runtime, whose handle is captured.
    pub fn build(self) -> Result<CheckCoordinator> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current()
                .map_err(|e| DntError::Config(format!("no Tokio runtime available: {e}")))?,
        };

        let recheck_interval = TimeDelta::from_std(self.recheck_interval)
            .map_err(|e| DntError::Config(format!("recheck interval out of range: {e}")))?;

        if self.fetch_timeout.is_zero() {
            return Err(DntError::Config("fetch timeout must be positive".into()));
        }

        let pacer = self
            .pacing
            .and_then(Quota::with_period)
            .map(RateLimiter::direct);

        Ok(CheckCoordinator {
            inner: Arc::new(Inner {
                fetcher: self.fetcher,
                policy: self.policy,
                store: self.store,
                gate: self.gate,
                clock: self.clock,
                recheck_interval,
                fetch_timeout: self.fetch_timeout,
                locator: self.locator,
                pacer,
                runtime,
                in_flight: Mutex::new(HashMap::new()),
            }),
        })
    }
}
