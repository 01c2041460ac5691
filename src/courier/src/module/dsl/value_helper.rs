use crate::argument::Argument;
use crate::container::registry::{Configurer, TypedConfigurer};

pub struct ValueBinding<V>
where
    V: Argument,
{
    name: String,
    value: V,
}

impl<V> ValueBinding<V>
where
    V: Argument,
{
    pub(super) fn new(name: String, value: V) -> Self {
        Self { name, value }
    }

    pub fn set_on(self, configurer: &mut dyn Configurer) {
        configurer.register_value(self.name, self.value);
    }
}
