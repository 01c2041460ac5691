use std::any;
use std::vec::IntoIter;

use snafu::prelude::*;

use crate::argument::{Argument, Value};
use crate::container::Container;

/// The effective argument list handed to a [`Deliverable`] constructor.
///
/// The list is the concatenation of a delivery's prepared arguments and the
/// call-site arguments. When the delivery is located at
/// [`DeliveryLocation::NeedsContainer`], the container that opened the
/// delivery is available through [`Arguments::container`] as well.
///
/// [`Deliverable`]: crate::delivery::Deliverable
/// [`DeliveryLocation::NeedsContainer`]: crate::delivery::DeliveryLocation::NeedsContainer
pub struct Arguments {
    container: Option<Container>,
    values: IntoIter<Value>,
    position: usize,
}

impl Arguments {
    pub(crate) fn new(container: Option<Container>, values: Vec<Value>) -> Self {
        Self {
            container,
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Returns the container that opened the delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::ContainerUnavailable`] if the delivery is
    /// standalone.
    pub fn container(&self) -> Result<Container, ArgumentError> {
        self.container.clone().context(ContainerUnavailableSnafu)
    }

    /// Takes the next positional argument as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Missing`] if the list is exhausted, or
    /// [`ArgumentError::Mismatch`] if the next argument isn't a `T`. The
    /// argument is consumed in both cases.
    pub fn next<T>(&mut self) -> Result<T, ArgumentError>
    where
        T: Argument + Clone,
    {
        let position = self.position;
        let value = self.next_value().context(MissingSnafu {
            position,
            expected: any::type_name::<T>(),
        })?;

        match value.downcast_ref::<T>() {
            Some(value) => Ok(value.clone()),
            None => MismatchSnafu {
                position,
                expected: any::type_name::<T>(),
                actual: value.type_name(),
            }
            .fail(),
        }
    }

    /// Takes the next positional argument without inspecting it.
    pub fn next_value(&mut self) -> Option<Value> {
        let value = self.values.next()?;
        self.position += 1;
        Some(value)
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Consumes the list, returning every argument not taken yet.
    pub fn rest(self) -> Vec<Value> {
        self.values.collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[non_exhaustive]
pub enum ArgumentError {
    #[snafu(display("missing argument #{position} of type {expected}"))]
    #[non_exhaustive]
    Missing {
        position: usize,
        expected: &'static str,
    },
    #[snafu(display("argument #{position} should be {expected} but is {actual}"))]
    #[non_exhaustive]
    Mismatch {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },
    #[snafu(display("the container is only passed to deliveries located at it"))]
    #[non_exhaustive]
    ContainerUnavailable,
}
