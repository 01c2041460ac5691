use std::error::Error;

use crate::argument::Value;
use crate::container::registry::provider_map::{ProviderEntry, ProviderMap};
use crate::container::registry::{Configurer, ConfigurerPrivate, RegistryError};
use crate::provider::Factory;

pub struct ConfigurerImpl {
    providers: ProviderMap,
    errors: Vec<RegistryError>,
}

impl ConfigurerImpl {
    pub fn new() -> Self {
        Self {
            providers: ProviderMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<ProviderMap, RegistryError> {
        match RegistryError::aggregate(self.errors) {
            None => Ok(self.providers),
            Some(err) => Err(err),
        }
    }

    fn register(&mut self, name: String, entry: ProviderEntry) {
        if self.providers.contains(&name) {
            self.errors.push(RegistryError::NameDuplicated { name });
        } else {
            tracing::trace!(name = %name, ?entry, "bound provider name");
            self.providers.insert(name, entry);
        }
    }
}

impl Configurer for ConfigurerImpl {
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate {
        self
    }

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>) {
        self.errors.push(RegistryError::ModuleInner {
            module,
            source: err,
        });
    }

    fn report_error(&mut self, err: RegistryError) {
        self.errors.push(err);
    }
}

impl ConfigurerPrivate for ConfigurerImpl {
    fn dyn_register_factory(&mut self, name: String, factory: Box<dyn Factory>) {
        self.register(name, ProviderEntry::Factory(factory));
    }

    fn dyn_register_value(&mut self, name: String, value: Value) {
        self.register(name, ProviderEntry::Value(value));
    }
}
