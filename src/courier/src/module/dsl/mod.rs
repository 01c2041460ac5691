//! A small builder language for binding names on a [`Configurer`].
//!
//! ```rust
//! # use std::error::Error;
//! # use courier::prelude::*;
//! # use courier::module::dsl::bind;
//! # use courier::args;
//! struct GreeterModule;
//!
//! impl Module for GreeterModule {
//!     fn configure(
//!         &self,
//!         configurer: &mut dyn Configurer,
//!     ) -> Result<(), Box<dyn Error + Send + Sync>> {
//!         bind("greeting").to_value("Hello").set_on(configurer);
//!         bind("Counter")
//!             .to_cached::<Counter, _>("10m")
//!             .prepared(args![0u64])
//!             .set_on(configurer);
//!         Ok(())
//!     }
//! }
//!
//! struct Counter(u64);
//!
//! #[deliverable]
//! impl Counter {
//!     #[constructor]
//!     fn new(start: u64) -> Self {
//!         Self(start)
//!     }
//! }
//! ```
//!
//! [`Configurer`]: crate::container::registry::Configurer

pub mod delivery_helper;
pub mod factory_helper;
pub mod name_helper;
pub mod value_helper;

use name_helper::NameBinding;

/// Starts a binding of `name`.
pub fn bind<N>(name: N) -> NameBinding
where
    N: Into<String>,
{
    NameBinding::new(name.into())
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use crate::args;
    use crate::container::registry::{Configurer, Registry, RegistryError};
    use crate::container::Container;
    use crate::delivery::fixtures::{Endpoint, Session};
    use crate::delivery::{DeliveryError, DeliveryLocation, RegularDelivery};
    use crate::lifetime::{Lifetime, LifetimeError};
    use crate::module::Module;

    use super::*;

    struct DslModule;

    impl Module for DslModule {
        fn configure(
            &self,
            configurer: &mut dyn Configurer,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            bind("port").to_value(8080u16).set_on(configurer);

            bind("Endpoint")
                .to_regular::<Endpoint>()
                .prepared(args!["localhost"])
                .set_on(configurer);

            bind("Session")
                .to_cached::<Session, _>("30m")
                .set_on(configurer);

            bind("DetachedSession")
                .to_cached::<Session, _>(Lifetime::Unbounded)
                .located(DeliveryLocation::Standalone)
                .set_on(configurer);

            bind("Backup")
                .to_factory(|_: &Container| -> Result<_, DeliveryError> {
                    Ok(RegularDelivery::<Endpoint>::new(args!["backup"]))
                })
                .set_on(configurer);

            Ok(())
        }
    }

    #[test]
    fn dsl_binds_values_and_deliveries() {
        let container = Container::init(DslModule).unwrap();

        let mut names = container.names();
        names.sort_unstable();
        assert_eq!(
            names,
            ["Backup", "DetachedSession", "Endpoint", "Session", "port"]
        );

        let endpoint = container.member("Endpoint").unwrap().unwrap();
        assert_eq!(endpoint.prepared(), args!["localhost"].as_slice());
        assert!(endpoint.create(args![80u16]).is_ok());

        let backup = container.member("Backup").unwrap().unwrap();
        assert_eq!(backup.prepared(), args!["backup"].as_slice());
    }

    #[test]
    fn dsl_records_locations_of_deliveries() {
        let container = Container::init(DslModule).unwrap();

        let session = container.member("Session").unwrap().unwrap();
        assert_eq!(session.location(), DeliveryLocation::NeedsContainer);
        assert!(session.create(args![String::from("erin")]).is_ok());

        let detached = container.member("DetachedSession").unwrap().unwrap();
        assert_eq!(detached.location(), DeliveryLocation::Standalone);
        assert!(matches!(
            detached.create(args![String::from("frank")]),
            Err(DeliveryError::Argument { .. })
        ));
    }

    #[test]
    fn dsl_cached_deliveries_of_one_source_share_instances_across_locations() {
        let container = Container::init(DslModule).unwrap();

        let session = container.member("Session").unwrap().unwrap();
        let detached = container.member("DetachedSession").unwrap().unwrap();

        let first = session.create(args![String::from("erin")]).unwrap();
        let second = detached.create(args![String::from("erin")]).unwrap();

        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn dsl_reports_invalid_lifetimes_at_configuration() {
        struct InvalidLifetimeModule;

        impl Module for InvalidLifetimeModule {
            fn configure(
                &self,
                configurer: &mut dyn Configurer,
            ) -> Result<(), Box<dyn Error + Send + Sync>> {
                bind("Session")
                    .to_cached::<Session, _>("1y")
                    .set_on(configurer);
                Ok(())
            }
        }

        let err = Container::init(InvalidLifetimeModule).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::InvalidLifetime {
                ref name,
                source: LifetimeError::InvalidLifetimeFormat { .. },
            } if name == "Session"
        ));
    }
}
