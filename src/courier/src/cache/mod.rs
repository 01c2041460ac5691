mod clock;

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::mem;
use std::thread::{self, ThreadId};
use std::time::Instant;

use oneshot::{Receiver, Sender};
use parking_lot::Mutex;

use crate::argument::Value;
use crate::container::{ContainerId, Managed};
use crate::delivery::{DeliveryError, Instance, TypeInfo};
use crate::lifetime::Lifetime;

pub use clock::{Clock, SystemClock};

#[cfg(test)]
pub use clock::MockClock;

/// The identity of a cached instance within one source type: the container
/// that opened the delivery followed by every resolved argument.
///
/// Keys are equal only if they have the same length and their arguments are
/// pairwise equal, see [`Value`] for what equality means per argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    container: ContainerId,
    arguments: Vec<Value>,
}

impl CacheKey {
    pub fn new(container: ContainerId, arguments: Vec<Value>) -> Self {
        Self {
            container,
            arguments,
        }
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }
}

/// The store behind cached deliveries.
///
/// Instances are bucketed by source type and keyed by [`CacheKey`]. Every
/// entry written with a bounded [`Lifetime`] carries its own deadline, which
/// moves forward whenever the entry is read through a bounded delivery. Once
/// the earliest deadline in the cache has passed, the next access sweeps every
/// expired entry out, whatever its key. [`InstanceCache::evict_expired`] runs
/// the same sweep on demand.
///
/// One cache is usually shared by all containers assembled by a
/// [`Carrier`]. Entries of different containers never collide because the
/// container is part of every key.
///
/// [`Carrier`]: crate::container::Carrier
pub struct InstanceCache {
    clock: Box<dyn Clock>,
    state: Mutex<CacheState>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock<C>(clock: C) -> Self
    where
        C: Clock + 'static,
    {
        Self {
            clock: Box::new(clock),
            state: Mutex::new(CacheState::new()),
        }
    }

    /// Returns the instance cached under `key`, or runs `construct` and caches
    /// its result.
    ///
    /// Concurrent calls for a key under construction wait for the outcome of
    /// the constructing thread instead of constructing again.
    pub(crate) fn get_or_construct<F>(
        &self,
        source: TypeInfo,
        key: CacheKey,
        lifetime: Lifetime,
        construct: F,
    ) -> Result<Instance, DeliveryError>
    where
        F: FnOnce(&CacheKey) -> Result<Instance, DeliveryError>,
    {
        let flight = (source.type_id, key);
        let mut stale = Vec::new();

        loop {
            let now = self.clock.now();
            let mut state = self.state.lock();
            if state.is_sweep_due(now) {
                stale.extend(state.sweep_expired(now));
            }
            match state.lookup(source, &flight.1, lifetime, now) {
                Lookup::Hit(instance) => return Ok(instance),
                Lookup::Expired(instance) => stale.push(instance),
                Lookup::Vacant => {}
            }

            match state.constructing.get_mut(&flight) {
                Some(context) if context.is_constructed_by_current_thread() => {
                    return Err(DeliveryError::CyclicConstruction {
                        source_type: source,
                    });
                }
                Some(context) => {
                    let receiver = context.register_waiter();
                    drop(state);
                    match receiver.recv() {
                        Ok(WaitResponse::Error(err)) => return Err(err),
                        Ok(WaitResponse::Constructed) | Err(_) => continue,
                    }
                }
                None => {
                    state
                        .constructing
                        .insert(flight.clone(), ConstructingContext::new());
                    break;
                }
            }
        }

        tracing::debug!(source = source.type_name, "constructing cached instance");
        let guard = FlightGuard::new(self, source, &flight);
        let outcome = construct(&flight.1);
        guard.finish(&outcome, lifetime);
        outcome
    }

    /// Evicts every entry whose deadline has passed and returns how many were
    /// evicted.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let evicted = self.state.lock().sweep_expired(now);
        evicted.len()
    }

    /// Counts the cached entries, including expired ones not evicted yet.
    pub fn len(&self) -> usize {
        let state = self.state.lock();
        state.buckets.values().map(|bucket| bucket.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts the cached entries of source type `T`.
    pub fn len_of<T: Managed>(&self) -> usize {
        let state = self.state.lock();
        state
            .buckets
            .get(&TypeId::of::<T>())
            .map_or(0, |bucket| bucket.entries.len())
    }

    /// Drops every cached instance.
    pub fn clear(&self) {
        let buckets = {
            let mut state = self.state.lock();
            state.next_sweep = None;
            mem::take(&mut state.buckets)
        };
        tracing::debug!(buckets = buckets.len(), "cleared instance cache");
    }
}

impl Default for InstanceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for InstanceCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let state = self.state.lock();
        let mut map = f.debug_map();
        for bucket in state.buckets.values() {
            map.entry(&bucket.source.type_name, &bucket.entries.len());
        }
        map.finish()
    }
}

type Flight = (TypeId, CacheKey);

struct CacheState {
    buckets: HashMap<TypeId, Bucket>,
    constructing: HashMap<Flight, ConstructingContext>,
    /// No entry expires before this instant. It may lag behind refreshed
    /// deadlines, which only costs an early sweep.
    next_sweep: Option<Instant>,
}

impl CacheState {
    fn new() -> Self {
        Self {
            buckets: HashMap::new(),
            constructing: HashMap::new(),
            next_sweep: None,
        }
    }

    fn schedule(&mut self, deadline: Option<Instant>) {
        self.next_sweep = match (self.next_sweep, deadline) {
            (Some(next), Some(deadline)) => Some(next.min(deadline)),
            (next, deadline) => next.or(deadline),
        };
    }

    fn is_sweep_due(&self, now: Instant) -> bool {
        self.next_sweep.is_some_and(|deadline| now >= deadline)
    }

    /// Removes every expired entry and returns their instances, which the
    /// caller drops once the lock is released.
    fn sweep_expired(&mut self, now: Instant) -> Vec<Instance> {
        let mut evicted = Vec::new();
        let mut next_sweep = None;

        for bucket in self.buckets.values_mut() {
            let expired: Vec<_> = bucket
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(now))
                .map(|(key, _)| key.clone())
                .collect();
            for key in expired {
                if let Some(entry) = bucket.entries.remove(&key) {
                    evicted.push(entry.instance);
                }
            }
            next_sweep = bucket
                .entries
                .values()
                .filter_map(|entry| entry.expires_at)
                .chain(next_sweep)
                .min();
        }
        self.buckets.retain(|_, bucket| !bucket.entries.is_empty());
        self.next_sweep = next_sweep;

        if !evicted.is_empty() {
            tracing::debug!(evicted = evicted.len(), "evicted expired instances");
        }
        evicted
    }

    fn bucket(&mut self, source: TypeInfo) -> &mut Bucket {
        self.buckets
            .entry(source.type_id)
            .or_insert_with(|| Bucket::new(source))
    }

    fn lookup(
        &mut self,
        source: TypeInfo,
        key: &CacheKey,
        lifetime: Lifetime,
        now: Instant,
    ) -> Lookup {
        let bucket = self.bucket(source);
        let Some(entry) = bucket.entries.get_mut(key) else {
            return Lookup::Vacant;
        };

        if entry.is_expired(now) {
            tracing::debug!(source = source.type_name, "evicted expired instance");
            return match bucket.entries.remove(key) {
                Some(entry) => Lookup::Expired(entry.instance),
                None => Lookup::Vacant,
            };
        }

        entry.refresh(lifetime, now);
        let (instance, deadline) = (entry.instance.clone(), entry.expires_at);
        self.schedule(deadline);
        tracing::trace!(source = source.type_name, "reused cached instance");
        Lookup::Hit(instance)
    }

    fn insert(
        &mut self,
        source: TypeInfo,
        key: CacheKey,
        instance: Instance,
        lifetime: Lifetime,
        now: Instant,
    ) {
        let entry = CacheEntry::new(instance, lifetime, now);
        self.schedule(entry.expires_at);
        self.bucket(source).entries.insert(key, entry);
    }
}

enum Lookup {
    Hit(Instance),
    Expired(Instance),
    Vacant,
}

struct Bucket {
    source: TypeInfo,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl Bucket {
    fn new(source: TypeInfo) -> Self {
        Self {
            source,
            entries: HashMap::new(),
        }
    }
}

struct CacheEntry {
    instance: Instance,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(instance: Instance, lifetime: Lifetime, now: Instant) -> Self {
        Self {
            instance,
            expires_at: Self::deadline(lifetime, now),
        }
    }

    fn deadline(lifetime: Lifetime, now: Instant) -> Option<Instant> {
        lifetime
            .as_duration()
            .and_then(|duration| now.checked_add(duration))
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    fn refresh(&mut self, lifetime: Lifetime, now: Instant) {
        if lifetime.is_bounded() {
            self.expires_at = Self::deadline(lifetime, now);
        }
    }
}

/// Publishes the outcome of one construction and releases its waiters, even
/// if the constructor unwinds.
struct FlightGuard<'a> {
    cache: &'a InstanceCache,
    source: TypeInfo,
    flight: &'a Flight,
    finished: bool,
}

impl<'a> FlightGuard<'a> {
    fn new(cache: &'a InstanceCache, source: TypeInfo, flight: &'a Flight) -> Self {
        Self {
            cache,
            source,
            flight,
            finished: false,
        }
    }

    fn finish(mut self, outcome: &Result<Instance, DeliveryError>, lifetime: Lifetime) {
        self.finished = true;
        let response = match outcome {
            Ok(instance) => {
                let now = self.cache.clock.now();
                let mut state = self.cache.state.lock();
                let key = self.flight.1.clone();
                state.insert(self.source, key, instance.clone(), lifetime, now);
                WaitResponse::Constructed
            }
            Err(err) => WaitResponse::Error(err.clone()),
        };
        self.release(response);
    }

    fn release(&self, response: WaitResponse) {
        let context = self.cache.state.lock().constructing.remove(self.flight);
        if let Some(context) = context {
            context.notify(response);
        }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(source = self.source.type_name, "cached construction abandoned");
            self.release(WaitResponse::Error(DeliveryError::Abandoned {
                source_type: self.source,
            }));
        }
    }
}

struct ConstructingContext {
    on_thread: ThreadId,
    waiters: Vec<Sender<WaitResponse>>,
}

impl ConstructingContext {
    fn new() -> Self {
        Self {
            on_thread: thread::current().id(),
            waiters: Vec::new(),
        }
    }

    fn is_constructed_by_current_thread(&self) -> bool {
        thread::current().id() == self.on_thread
    }

    fn register_waiter(&mut self) -> Receiver<WaitResponse> {
        let (sender, receiver) = oneshot::channel();
        self.waiters.push(sender);
        receiver
    }

    fn notify(self, response: WaitResponse) {
        for sender in self.waiters {
            let _ = sender.send(response.clone());
        }
    }
}

#[derive(Debug, Clone)]
enum WaitResponse {
    Constructed,
    Error(DeliveryError),
}
