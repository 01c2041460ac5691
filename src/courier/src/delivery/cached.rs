use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::argument::Value;
use crate::cache::CacheKey;
use crate::container::Container;
use crate::delivery::{self, Deliverable, Delivery, DeliveryError, DeliveryLocation, Instance, TypeInfo};
use crate::lifetime::{IntoLifetime, Lifetime};

/// A [`Delivery`] that shares instances among all calls with the same
/// resolved arguments.
///
/// The cache key of an [`open`](Delivery::open) call is the opening
/// container followed by the prepared and call-site arguments. Entries live
/// in the container's [`InstanceCache`], bucketed by source type, so two
/// differently configured [`CachedDelivery`]s of one source type converge on
/// the same instance whenever their resolved arguments agree.
///
/// A bounded [`Lifetime`] restarts on every access; the entry is evicted
/// once it elapses without one.
///
/// [`InstanceCache`]: crate::cache::InstanceCache
pub struct CachedDelivery<T>
where
    T: Deliverable,
{
    prepared: Vec<Value>,
    location: DeliveryLocation,
    lifetime: Lifetime,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CachedDelivery<T>
where
    T: Deliverable,
{
    /// # Errors
    ///
    /// Returns an error if `lifetime` is a negative number or a malformed
    /// literal. Nothing is cached in that case.
    pub fn new<L>(prepared: Vec<Value>, lifetime: L) -> Result<Self, DeliveryError>
    where
        L: IntoLifetime,
    {
        Ok(Self {
            prepared,
            location: T::LOCATION,
            lifetime: lifetime.into_lifetime()?,
            _marker: PhantomData,
        })
    }

    /// Overrides the location declared by `T`.
    pub fn located(mut self, location: DeliveryLocation) -> Self {
        self.location = location;
        self
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }
}

impl<T> Debug for CachedDelivery<T>
where
    T: Deliverable,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CachedDelivery")
            .field("source", &any::type_name::<T>())
            .field("prepared", &self.prepared)
            .field("location", &self.location)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl<T> Delivery for CachedDelivery<T>
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
        let key = CacheKey::new(container.id(), delivery::concat(&self.prepared, args));
        container
            .cache()
            .get_or_construct(self.source(), key, self.lifetime, |key| {
                delivery::construct::<T>(self.location, container, key.arguments().to_vec())
            })
    }
}
