use std::marker::PhantomData;

use crate::argument::Value;
use crate::container::registry::{Configurer, RegistryError, TypedConfigurer};
use crate::container::Container;
use crate::delivery::{CachedDelivery, Deliverable, DeliveryError, DeliveryLocation, RegularDelivery};
use crate::lifetime::IntoLifetime;

pub struct RegularBinding<T>
where
    T: Deliverable,
{
    name: String,
    prepared: Vec<Value>,
    location: DeliveryLocation,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RegularBinding<T>
where
    T: Deliverable,
{
    pub(super) fn new(name: String) -> Self {
        Self {
            name,
            prepared: Vec::new(),
            location: T::LOCATION,
            _marker: PhantomData,
        }
    }

    /// Sets the arguments leading every construction.
    pub fn prepared(mut self, prepared: Vec<Value>) -> Self {
        self.prepared = prepared;
        self
    }

    /// Overrides the location declared by `T`.
    pub fn located(mut self, location: DeliveryLocation) -> Self {
        self.location = location;
        self
    }

    pub fn set_on(self, configurer: &mut dyn Configurer) {
        let Self {
            name,
            prepared,
            location,
            ..
        } = self;
        configurer.register_factory(name, move |_: &Container| -> Result<_, DeliveryError> {
            Ok(RegularDelivery::<T>::new(prepared.clone()).located(location))
        });
    }
}

pub struct CachedBinding<T, L>
where
    T: Deliverable,
    L: IntoLifetime,
{
    name: String,
    prepared: Vec<Value>,
    location: DeliveryLocation,
    lifetime: L,
    _marker: PhantomData<fn() -> T>,
}

impl<T, L> CachedBinding<T, L>
where
    T: Deliverable,
    L: IntoLifetime,
{
    pub(super) fn new(name: String, lifetime: L) -> Self {
        Self {
            name,
            prepared: Vec::new(),
            location: T::LOCATION,
            lifetime,
            _marker: PhantomData,
        }
    }

    /// Sets the arguments leading every construction.
    pub fn prepared(mut self, prepared: Vec<Value>) -> Self {
        self.prepared = prepared;
        self
    }

    /// Overrides the location declared by `T`.
    pub fn located(mut self, location: DeliveryLocation) -> Self {
        self.location = location;
        self
    }

    /// Binds the name, or reports an invalid lifetime to `configurer`.
    pub fn set_on(self, configurer: &mut dyn Configurer) {
        let Self {
            name,
            prepared,
            location,
            lifetime,
            ..
        } = self;

        match lifetime.into_lifetime() {
            Ok(lifetime) => {
                configurer.register_factory(name, move |_: &Container| {
                    CachedDelivery::<T>::new(prepared.clone(), lifetime)
                        .map(|delivery| delivery.located(location))
                });
            }
            Err(source) => configurer.report_error(RegistryError::InvalidLifetime { name, source }),
        }
    }
}
