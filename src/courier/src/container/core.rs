use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, RwLock};
use snafu::prelude::*;

use crate::argument::Value;
use crate::cache::InstanceCache;
use crate::container::registry::{ProviderEntry, ProviderMap};
use crate::container::{
    Container, ContainerError, ContainerId, CyclicResolutionSnafu, Member, Property,
    ResolutionSnafu,
};
use crate::delivery::Delivery;
use crate::provider::Factory;

pub struct ContainerCore {
    id: ContainerId,
    providers: ProviderMap,
    cache: Arc<InstanceCache>,
    resolved: RwLock<HashMap<String, Arc<dyn Delivery>>>,
    resolving: Mutex<HashSet<(String, ThreadId)>>,
}

impl ContainerCore {
    pub fn new(providers: ProviderMap, cache: Arc<InstanceCache>) -> Self {
        Self {
            id: ContainerId::next(),
            providers,
            cache,
            resolved: RwLock::new(HashMap::new()),
            resolving: Mutex::new(HashSet::new()),
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn cache(&self) -> &InstanceCache {
        &self.cache
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.names().collect()
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        match self.providers.get(name)? {
            ProviderEntry::Value(value) => Some(value.clone()),
            ProviderEntry::Factory(_) => None,
        }
    }

    pub fn get(
        &self,
        container: &Container,
        name: &str,
    ) -> Result<Option<Property>, ContainerError> {
        let property = match self.providers.get(name) {
            None => return Ok(None),
            Some(ProviderEntry::Value(value)) => Property::Value(value.clone()),
            Some(ProviderEntry::Factory(factory)) => {
                let delivery = self.resolve(container, name, factory.as_ref())?;
                Property::Member(Member::new(name, delivery, container.clone()))
            }
        };
        Ok(Some(property))
    }

    fn resolve(
        &self,
        container: &Container,
        name: &str,
        factory: &dyn Factory,
    ) -> Result<Arc<dyn Delivery>, ContainerError> {
        if let Some(delivery) = self.resolved.read().get(name) {
            return Ok(Arc::clone(delivery));
        }

        let _guard = ResolvingGuard::enter(&self.resolving, name)?;
        tracing::debug!(container = %self.id, name, "resolving delivery");
        let delivery = factory
            .dyn_deliver(container)
            .context(ResolutionSnafu { name })?;

        // Another thread may have resolved the name meanwhile, and the first
        // delivery stored wins.
        let mut resolved = self.resolved.write();
        let delivery = resolved.entry(name.to_owned()).or_insert(delivery);
        Ok(Arc::clone(delivery))
    }
}

/// Marks a name as being resolved on the current thread until dropped.
struct ResolvingGuard<'a> {
    resolving: &'a Mutex<HashSet<(String, ThreadId)>>,
    token: Option<(String, ThreadId)>,
}

impl<'a> ResolvingGuard<'a> {
    fn enter(
        resolving: &'a Mutex<HashSet<(String, ThreadId)>>,
        name: &str,
    ) -> Result<Self, ContainerError> {
        let token = (name.to_owned(), thread::current().id());
        ensure!(
            resolving.lock().insert(token.clone()),
            CyclicResolutionSnafu { name }
        );
        Ok(Self {
            resolving,
            token: Some(token),
        })
    }
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.resolving.lock().remove(&token);
        }
    }
}
