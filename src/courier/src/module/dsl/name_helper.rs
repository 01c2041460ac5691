use crate::argument::Argument;
use crate::delivery::Deliverable;
use crate::lifetime::IntoLifetime;
use crate::module::dsl::delivery_helper::{CachedBinding, RegularBinding};
use crate::module::dsl::factory_helper::FactoryBinding;
use crate::module::dsl::value_helper::ValueBinding;
use crate::provider::Factory;

/// A name waiting for what it is bound to.
#[derive(Debug)]
pub struct NameBinding {
    name: String,
}

impl NameBinding {
    pub(super) fn new(name: String) -> Self {
        Self { name }
    }

    pub fn to_factory<F>(self, factory: F) -> FactoryBinding<F>
    where
        F: Factory,
    {
        FactoryBinding::new(self.name, factory)
    }

    pub fn to_value<V>(self, value: V) -> ValueBinding<V>
    where
        V: Argument,
    {
        ValueBinding::new(self.name, value)
    }

    pub fn to_regular<T>(self) -> RegularBinding<T>
    where
        T: Deliverable,
    {
        RegularBinding::new(self.name)
    }

    pub fn to_cached<T, L>(self, lifetime: L) -> CachedBinding<T, L>
    where
        T: Deliverable,
        L: IntoLifetime,
    {
        CachedBinding::new(self.name, lifetime)
    }
}
