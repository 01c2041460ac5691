use std::sync::Arc;

use crate::cache::InstanceCache;
use crate::container::registry::{ConfigurerImpl, RegistryError};
use crate::container::Container;
use crate::module::Module;

/// Assembles [`Container`]s from [`Module`]s.
///
/// Every container carried by one [`Carrier`] stores the instances of its
/// cached deliveries in the carrier's [`InstanceCache`]. The containers never
/// share instances with each other, since each of them is part of the keys it
/// writes.
#[derive(Debug, Clone)]
pub struct Carrier {
    cache: Arc<InstanceCache>,
}

impl Carrier {
    /// Creates a carrier with a fresh cache driven by the system clock.
    pub fn new() -> Self {
        Self::with_cache(Arc::new(InstanceCache::new()))
    }

    pub fn with_cache(cache: Arc<InstanceCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<InstanceCache> {
        &self.cache
    }

    /// Builds a container holding every name bound by `module`.
    ///
    /// No factory runs here. Each runs on the first read of its name.
    ///
    /// # Errors
    ///
    /// Returns an error if any name is bound twice, a cached delivery has an
    /// invalid lifetime, or any module fails to configure itself. Every such
    /// error of one module is reported at once.
    pub fn carry<M>(&self, module: M) -> Result<Container, RegistryError>
    where
        M: Module,
    {
        let mut configurer = ConfigurerImpl::new();
        module.setup(&mut configurer);
        let providers = configurer.finish()?;
        let names = providers.len();

        let container = Container::new(providers, Arc::clone(&self.cache));
        tracing::debug!(container = %container.id(), names, "carried container");
        Ok(container)
    }
}

impl Default for Carrier {
    fn default() -> Self {
        Self::new()
    }
}
