use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::argument::Value;
use crate::container::Container;
use crate::delivery::{self, Deliverable, Delivery, DeliveryError, DeliveryLocation, Instance, TypeInfo};

/// A [`Delivery`] that constructs a new instance on every
/// [`open`](Delivery::open).
pub struct RegularDelivery<T>
where
    T: Deliverable,
{
    prepared: Vec<Value>,
    location: DeliveryLocation,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RegularDelivery<T>
where
    T: Deliverable,
{
    pub fn new(prepared: Vec<Value>) -> Self {
        Self {
            prepared,
            location: T::LOCATION,
            _marker: PhantomData,
        }
    }

    /// Overrides the location declared by `T`.
    pub fn located(mut self, location: DeliveryLocation) -> Self {
        self.location = location;
        self
    }
}

impl<T> Debug for RegularDelivery<T>
where
    T: Deliverable,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RegularDelivery")
            .field("source", &any::type_name::<T>())
            .field("prepared", &self.prepared)
            .field("location", &self.location)
            .finish()
    }
}

impl<T> Delivery for RegularDelivery<T>
where
    T: Deliverable,
{
    fn source(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn prepared(&self) -> &[Value] {
        &self.prepared
    }

    fn location(&self) -> DeliveryLocation {
        self.location
    }

    fn open(&self, container: &Container, args: Vec<Value>) -> Result<Instance, DeliveryError> {
        tracing::trace!(source = any::type_name::<T>(), "opening regular delivery");
        let values = delivery::concat(&self.prepared, args);
        delivery::construct::<T>(self.location, container, values)
    }
}
