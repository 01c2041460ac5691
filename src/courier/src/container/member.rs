use std::any::TypeId;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::argument::Value;
use crate::container::{Container, Managed};
use crate::delivery::{Delivery, DeliveryError, DeliveryLocation, Instance, TypeInfo};

/// A handle to a resolved name of a [`Container`].
///
/// Calling [`Member::create`] opens the name's delivery on the container the
/// member was read from, with the call-site arguments following the prepared
/// ones.
#[derive(Clone)]
pub struct Member {
    name: Arc<str>,
    delivery: Arc<dyn Delivery>,
    container: Container,
}

impl Member {
    pub(super) fn new(name: &str, delivery: Arc<dyn Delivery>, container: Container) -> Self {
        Self {
            name: Arc::from(name),
            delivery,
            container,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type of every instance this member creates.
    pub fn source(&self) -> TypeInfo {
        self.delivery.source()
    }

    pub fn location(&self) -> DeliveryLocation {
        self.delivery.location()
    }

    pub fn prepared(&self) -> &[Value] {
        self.delivery.prepared()
    }

    pub fn delivery(&self) -> &dyn Delivery {
        self.delivery.as_ref()
    }

    /// Creates an instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `args` don't fit the source type's constructor or
    /// the constructor fails.
    pub fn create(&self, args: Vec<Value>) -> Result<Instance, DeliveryError> {
        tracing::trace!(name = &*self.name, source = %self.source(), "creating member instance");
        self.delivery.open(&self.container, args)
    }

    /// Returns true if `instance` has this member's source type.
    pub fn is_instance(&self, instance: &Instance) -> bool {
        instance.info() == self.source()
    }

    /// Narrows the member to its source type.
    ///
    /// Returns `None` if the source type isn't `T`.
    pub fn typed<T: Managed>(self) -> Option<TypedMember<T>> {
        if self.source().type_id == TypeId::of::<T>() {
            Some(TypedMember {
                member: self,
                _marker: PhantomData,
            })
        } else {
            None
        }
    }
}

impl Debug for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("delivery", &self.delivery)
            .field("container", &self.container.id())
            .finish()
    }
}

/// A [`Member`] known to create `T`s.
pub struct TypedMember<T: Managed> {
    member: Member,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Managed> TypedMember<T> {
    /// Creates an instance as a `T`.
    ///
    /// # Errors
    ///
    /// See [`Member::create`].
    pub fn create(&self, args: Vec<Value>) -> Result<Arc<T>, DeliveryError> {
        let instance = self.member.create(args)?;
        let actual = instance.info();
        instance
            .downcast::<T>()
            .map_err(|_| DeliveryError::Unexpected {
                source_type: TypeInfo::of::<T>(),
                actual,
            })
    }

    pub fn untyped(&self) -> &Member {
        &self.member
    }

    pub fn into_untyped(self) -> Member {
        self.member
    }
}

impl<T: Managed> Clone for TypedMember<T> {
    fn clone(&self) -> Self {
        Self {
            member: self.member.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Managed> Debug for TypedMember<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("TypedMember").field(&self.member).finish()
    }
}
