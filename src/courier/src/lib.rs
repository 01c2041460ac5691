#![allow(clippy::new_without_default)]

pub mod argument;
pub mod cache;
pub mod container;
pub mod delivery;
pub mod lifetime;
pub mod module;
pub mod provider;
mod util;

pub use courier_derive::deliverable;

pub mod prelude {
    pub use crate::argument::{ArgumentError, Arguments, ByRef, Value};
    pub use crate::args;
    pub use crate::cache::InstanceCache;
    pub use crate::container::registry::{Configurer, Registry, RegistryError, TypedConfigurer};
    pub use crate::container::{Carrier, Container, ContainerError, Member, Property};
    pub use crate::deliverable;
    pub use crate::delivery::{
        CachedDelivery, Deliverable, Delivery, DeliveryError, DeliveryLocation, Instance,
        RegularDelivery,
    };
    pub use crate::lifetime::Lifetime;
    pub use crate::module::{bind, Configuration, Module};
}
