mod configurer;
mod provider_map;

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use snafu::prelude::*;

use crate::argument::{Argument, Value};
use crate::lifetime::LifetimeError;
use crate::module::Module;
use crate::provider::Factory;

pub(super) use configurer::ConfigurerImpl;
pub(super) use provider_map::{ProviderEntry, ProviderMap};

/// A type assembled from a [`Module`].
pub trait Registry: Sized + Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns an error if any name is bound twice or any module fails to
    /// configure itself.
    fn init<M>(module: M) -> Result<Self, RegistryError>
    where
        M: Module;
}

/// The sink every [`Module`] binds its names on.
pub trait Configurer: Send + Sync + 'static {
    #[doc(hidden)]
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate;

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>);

    fn report_error(&mut self, err: RegistryError);
}

trait ConfigurerPrivate {
    fn dyn_register_factory(&mut self, name: String, factory: Box<dyn Factory>);

    fn dyn_register_value(&mut self, name: String, value: Value);
}

pub trait TypedConfigurer: Configurer {
    fn register_factory<N, F>(&mut self, name: N, factory: F)
    where
        N: Into<String>,
        F: Factory,
    {
        self.as_private()
            .dyn_register_factory(name.into(), Box::new(factory));
    }

    fn register_value<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: Argument,
    {
        self.as_private()
            .dyn_register_value(name.into(), Value::new(value));
    }
}

impl<T: Configurer + ?Sized> TypedConfigurer for T {}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("the name {name} is already bound"))]
    #[non_exhaustive]
    NameDuplicated { name: String },
    #[snafu(display("the cached delivery bound to {name} has an invalid lifetime"))]
    #[non_exhaustive]
    InvalidLifetime {
        name: String,
        source: LifetimeError,
    },
    #[snafu(display("module {module} fails to setup the configuration"))]
    #[non_exhaustive]
    ModuleInner {
        module: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(display("aggregated registry errors:\n{}", AggregatedDisplayer::new(errors)))]
    #[non_exhaustive]
    Aggregated { errors: Vec<RegistryError> },
}

impl RegistryError {
    /// Folds the errors of one configuration pass into a single error.
    pub(crate) fn aggregate(mut errors: Vec<RegistryError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregated { errors }),
        }
    }
}

struct AggregatedDisplayer<'a> {
    errors: &'a [RegistryError],
}

impl<'a> AggregatedDisplayer<'a> {
    fn new(errors: &'a [RegistryError]) -> Self {
        Self { errors }
    }
}

impl Display for AggregatedDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, error)?;
        }
        Ok(())
    }
}
