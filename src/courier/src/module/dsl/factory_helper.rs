use crate::container::registry::{Configurer, TypedConfigurer};
use crate::provider::Factory;

pub struct FactoryBinding<F>
where
    F: Factory,
{
    name: String,
    factory: F,
}

impl<F> FactoryBinding<F>
where
    F: Factory,
{
    pub(super) fn new(name: String, factory: F) -> Self {
        Self { name, factory }
    }

    pub fn set_on(self, configurer: &mut dyn Configurer) {
        configurer.register_factory(self.name, self.factory);
    }
}
