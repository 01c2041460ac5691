use std::sync::Arc;

use crate::container::Container;
use crate::delivery::{Delivery, DeliveryError};

/// A recipe that builds the [`Delivery`] of one provider name.
///
/// A [`Factory`] receives the container it is registered in, so it may read
/// other members of that container (obtaining handles) before returning its
/// delivery. Factories are run lazily, once per container on success. They
/// should be pure with respect to the container, since a factory that fails
/// or races with another thread is simply run again.
///
/// Usually you don't need to implement [`Factory`] manually, since closures of
/// `Fn(&Container) -> Result<D, DeliveryError> + Send + Sync + 'static` where
/// `D: Delivery` are [`Factory`].
pub trait Factory: Send + Sync + 'static {
    /// Builds a type-erased delivery for `container`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery can't be built, e.g. its lifetime is
    /// malformed.
    fn dyn_deliver(&self, container: &Container) -> Result<Arc<dyn Delivery>, DeliveryError>;
}

impl<F, D> Factory for F
where
    F: Fn(&Container) -> Result<D, DeliveryError> + Send + Sync + 'static,
    D: Delivery,
{
    fn dyn_deliver(&self, container: &Container) -> Result<Arc<dyn Delivery>, DeliveryError> {
        self(container).map(|delivery| -> Arc<dyn Delivery> { Arc::new(delivery) })
    }
}

#[cfg(test)]
mod tests {
    use crate::args;
    use crate::container::Container;
    use crate::delivery::fixtures::Endpoint;
    use crate::delivery::{CachedDelivery, RegularDelivery, TypeInfo};
    use crate::lifetime::Lifetime;

    use super::*;

    #[test]
    fn factory_dyn_deliver_succeeds_for_closures() {
        let factory = |_: &Container| -> Result<_, DeliveryError> {
            Ok(RegularDelivery::<Endpoint>::new(args!["localhost"]))
        };
        let container = Container::empty();

        let delivery = factory.dyn_deliver(&container).unwrap();

        assert_eq!(delivery.source(), TypeInfo::of::<Endpoint>());
        assert_eq!(delivery.prepared(), args!["localhost"].as_slice());
    }

    #[test]
    fn factory_dyn_deliver_succeeds_for_boxed_deliveries() {
        let factory = |_: &Container| -> Result<Box<dyn Delivery>, DeliveryError> {
            Ok(Box::new(CachedDelivery::<Endpoint>::new(args![], Lifetime::Unbounded)?))
        };
        let container = Container::empty();

        let delivery = factory.dyn_deliver(&container).unwrap();
        let first = delivery.open(&container, args!["localhost", 80u16]).unwrap();
        let second = delivery.open(&container, args!["localhost", 80u16]).unwrap();

        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn factory_dyn_deliver_fails_when_closure_fails() {
        let factory = |_: &Container| CachedDelivery::<Endpoint>::new(args![], "forever");
        let container = Container::empty();

        assert!(matches!(
            factory.dyn_deliver(&container),
            Err(DeliveryError::Lifetime { .. })
        ));
    }
}
