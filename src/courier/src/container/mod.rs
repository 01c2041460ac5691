pub mod registry;

mod carrier;
mod core;
mod member;

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use snafu::prelude::*;

use crate::argument::Value;
use crate::cache::InstanceCache;
use crate::container::core::ContainerCore;
use crate::container::registry::{ProviderMap, Registry, RegistryError};
use crate::delivery::DeliveryError;
use crate::module::Module;
use crate::util::any::AsAny;

pub use carrier::Carrier;
pub use member::{Member, TypedMember};

pub trait Managed: AsAny + Send + Sync + 'static {}

impl<T> Managed for T where T: AsAny + Send + Sync + 'static {}

/// Identifies a container among all containers of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl ContainerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for ContainerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "container#{}", self.0)
    }
}

/// What a name of a [`Container`] reads as.
#[derive(Debug, Clone)]
pub enum Property {
    /// A handle creating instances through the name's delivery.
    Member(Member),
    /// A plain value bound to the name.
    Value(Value),
}

impl Property {
    pub fn into_member(self) -> Option<Member> {
        match self {
            Self::Member(member) => Some(member),
            Self::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Member(_) => None,
            Self::Value(value) => Some(value),
        }
    }
}

/// A read-only view over the names bound by a [`Module`].
///
/// A name bound to a factory reads as a [`Member`]. The factory runs on the
/// first read of its name with the container itself, so the delivery it
/// returns may refer back to the container (or read its other members)
/// without anything being constructed up front. The resulting delivery is
/// kept for every later read.
///
/// Containers are cheap to clone and every clone refers to the same state.
#[derive(Clone)]
pub struct Container {
    core: Arc<ContainerCore>,
}

impl Container {
    fn new(providers: ProviderMap, cache: Arc<InstanceCache>) -> Self {
        Self {
            core: Arc::new(ContainerCore::new(providers, cache)),
        }
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::with_cache(Arc::new(InstanceCache::new()))
    }

    #[cfg(test)]
    pub(crate) fn with_cache(cache: Arc<InstanceCache>) -> Self {
        Self::new(ProviderMap::new(), cache)
    }

    pub fn id(&self) -> ContainerId {
        self.core.id()
    }

    /// The cache cached deliveries opened on this container store their
    /// instances in.
    pub fn cache(&self) -> &InstanceCache {
        self.core.cache()
    }

    /// Returns true if `name` is bound, whether to a factory or to a value.
    pub fn contains(&self, name: &str) -> bool {
        self.core.contains(name)
    }

    /// Returns every bound name, in no particular order.
    pub fn names(&self) -> Vec<&str> {
        self.core.names()
    }

    /// Reads `name`.
    ///
    /// Returns `Ok(None)` if `name` isn't bound at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the factory of `name` fails or reads `name` again
    /// while it is running.
    pub fn get(&self, name: &str) -> Result<Option<Property>, ContainerError> {
        self.core.get(self, name)
    }

    /// Reads `name` as a [`Member`].
    ///
    /// Returns `Ok(None)` if `name` isn't bound or is bound to a plain value.
    ///
    /// # Errors
    ///
    /// See [`Container::get`].
    pub fn member(&self, name: &str) -> Result<Option<Member>, ContainerError> {
        Ok(self.get(name)?.and_then(Property::into_member))
    }

    /// Reads `name` as a plain value without running any factory.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.core.value(name)
    }

    /// Containers are read-only. The write is dropped and `false` is
    /// returned, leaving every later read unaffected.
    pub fn set(&self, name: &str, value: Value) -> bool {
        tracing::debug!(container = %self.id(), name, ?value, "rejected write to container");
        false
    }
}

impl Registry for Container {
    fn init<M>(module: M) -> Result<Self, RegistryError>
    where
        M: Module,
    {
        Carrier::new().carry(module)
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut names = self.names();
        names.sort_unstable();
        f.debug_struct("Container")
            .field("id", &self.id())
            .field("names", &names)
            .finish()
    }
}

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum ContainerError {
    #[snafu(display("could not resolve the delivery of {name}"))]
    #[non_exhaustive]
    Resolution { name: String, source: DeliveryError },
    #[snafu(display("could not resolve {name} whose factory reads {name} again"))]
    #[non_exhaustive]
    CyclicResolution { name: String },
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use crate::args;
    use crate::container::registry::{Configurer, TypedConfigurer};
    use crate::delivery::fixtures::{Endpoint, Session};
    use crate::delivery::{CachedDelivery, RegularDelivery, TypeInfo};

    use super::*;

    struct TestModule;

    impl Module for TestModule {
        fn configure(
            &self,
            configurer: &mut dyn Configurer,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            configurer.register_factory("Endpoint", |_: &Container| -> Result<_, DeliveryError> {
                Ok(RegularDelivery::<Endpoint>::new(args!["localhost"]))
            });
            configurer.register_factory("Session", |_: &Container| {
                CachedDelivery::<Session>::new(args![], "1h")
            });
            configurer.register_value("port", 8080u16);
            Ok(())
        }
    }

    #[test]
    fn container_get_returns_none_for_unknown_names() {
        let container = Container::init(TestModule).unwrap();

        assert!(container.get("Unknown").unwrap().is_none());
        assert!(container.member("Unknown").unwrap().is_none());
        assert!(!container.contains("Unknown"));
    }

    #[test]
    fn container_get_passes_values_through() {
        let container = Container::init(TestModule).unwrap();

        let value = container.get("port").unwrap().unwrap().into_value().unwrap();
        assert_eq!(value, Value::new(8080u16));
        assert_eq!(container.value("port"), Some(Value::new(8080u16)));
        assert!(container.value("Endpoint").is_none());
        assert!(container.member("port").unwrap().is_none());
    }

    #[test]
    fn container_get_returns_members_creating_source_instances() {
        let container = Container::init(TestModule).unwrap();

        let member = container.member("Endpoint").unwrap().unwrap();
        assert_eq!(member.name(), "Endpoint");
        assert_eq!(member.source(), TypeInfo::of::<Endpoint>());

        let instance = member.create(args![80u16]).unwrap();
        assert!(member.is_instance(&instance));
        let endpoint = instance.downcast::<Endpoint>().unwrap();
        assert_eq!((endpoint.host, endpoint.port), ("localhost", 80));
    }

    #[test]
    fn container_get_injects_itself_into_members_located_at_it() {
        let container = Container::init(TestModule).unwrap();

        let member = container.member("Session").unwrap().unwrap();
        let first = member.create(args![String::from("alice")]).unwrap();
        let second = container
            .member("Session")
            .unwrap()
            .unwrap()
            .create(args![String::from("alice")])
            .unwrap();

        assert!(first.ptr_eq(&second));
        let session = first.downcast::<Session>().unwrap();
        assert_eq!(session.container.id(), container.id());
    }

    #[test]
    fn container_set_is_rejected_and_leaves_reads_unaffected() {
        let container = Container::init(TestModule).unwrap();

        assert!(!container.set("port", Value::new(1u16)));
        assert!(!container.set("Extra", Value::new(1u16)));

        assert_eq!(container.value("port"), Some(Value::new(8080u16)));
        assert!(!container.contains("Extra"));
    }

    #[test]
    fn container_get_resolves_factories_once() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        struct CountingModule;

        impl Module for CountingModule {
            fn configure(
                &self,
                configurer: &mut dyn Configurer,
            ) -> Result<(), Box<dyn Error + Send + Sync>> {
                configurer.register_factory("Endpoint", |_: &Container| -> Result<_, DeliveryError> {
                    CALLS.fetch_add(1, Ordering::SeqCst);
                    Ok(RegularDelivery::<Endpoint>::new(args![]))
                });
                Ok(())
            }
        }

        let container = Container::init(CountingModule).unwrap();
        for _ in 0..3 {
            container.member("Endpoint").unwrap().unwrap();
        }

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn container_get_lets_factories_read_other_members() {
        struct LinkedModule;

        impl Module for LinkedModule {
            fn configure(
                &self,
                configurer: &mut dyn Configurer,
            ) -> Result<(), Box<dyn Error + Send + Sync>> {
                configurer.register_factory("Primary", |container: &Container| -> Result<_, DeliveryError> {
                    let secondary = container
                        .member("Secondary")
                        .ok()
                        .flatten()
                        .map(|member| member.prepared().to_vec())
                        .unwrap_or_default();
                    Ok(RegularDelivery::<Endpoint>::new(secondary))
                });
                configurer.register_factory("Secondary", |_: &Container| -> Result<_, DeliveryError> {
                    Ok(RegularDelivery::<Endpoint>::new(args!["backup"]))
                });
                Ok(())
            }
        }

        let container = Container::init(LinkedModule).unwrap();
        let member = container.member("Primary").unwrap().unwrap();

        assert_eq!(member.prepared(), args!["backup"].as_slice());
    }

    #[test]
    fn container_get_fails_when_factory_reads_its_own_name() {
        struct SelfReadingModule;

        impl Module for SelfReadingModule {
            fn configure(
                &self,
                configurer: &mut dyn Configurer,
            ) -> Result<(), Box<dyn Error + Send + Sync>> {
                configurer.register_factory("Loop", |container: &Container| {
                    let res = container.member("Loop");
                    assert!(matches!(
                        res,
                        Err(ContainerError::CyclicResolution { ref name }) if name == "Loop"
                    ));
                    CachedDelivery::<Endpoint>::new(args![], "forever")
                });
                Ok(())
            }
        }

        let container = Container::init(SelfReadingModule).unwrap();

        assert!(matches!(
            container.member("Loop"),
            Err(ContainerError::Resolution { ref name, .. }) if name == "Loop"
        ));
        // Failures are not kept, so the factory runs again.
        assert!(container.member("Loop").is_err());
    }

    #[test]
    fn container_get_succeeds_on_multiple_threads() {
        let container = Container::init(TestModule).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let container = container.clone();
                thread::spawn(move || {
                    let member = container.member("Session").unwrap().unwrap();
                    member.create(args![String::from("shared")]).unwrap()
                })
            })
            .collect();

        let instances: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("Each thread should not `panic!()`"))
            .collect();
        assert!(instances.iter().all(|i| i.ptr_eq(&instances[0])));
    }

    #[test]
    fn container_debug_lists_names() {
        let container = Container::init(TestModule).unwrap();
        let debug = format!("{container:?}");

        assert!(debug.contains(r#"names: ["Endpoint", "Session", "port"]"#));
    }
}
