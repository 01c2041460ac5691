pub mod dsl;

use std::any;
use std::error::Error;

use crate::container::registry::Configurer;

pub use dsl::bind;

/// A unit of configuration binding provider names.
pub trait Module: 'static {
    /// Runs [`Module::configure`], reporting its error to `configurer`.
    fn setup(&self, configurer: &mut dyn Configurer) {
        if let Err(err) = self.configure(configurer) {
            configurer.report_module_error(any::type_name::<Self>(), err);
        }
    }

    /// Binds names on `configurer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the module can't gather what its bindings need.
    /// Bindings made before the error are still checked, so that every
    /// problem of one configuration pass surfaces at once.
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// A [`Module`] made of other modules, set up in insertion order.
#[derive(Default)]
pub struct Configuration {
    modules: Vec<Box<dyn Module>>,
}

impl Configuration {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with<M: Module>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn compose(mut self, mut other: Configuration) -> Self {
        self.modules.append(&mut other.modules);
        self
    }
}

impl Module for Configuration {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.modules
            .iter()
            .for_each(|module| module.setup(configurer));
        Ok(())
    }
}
