mod cached;
mod instance;
mod regular;

use std::error::Error;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use snafu::prelude::*;

use crate::argument::{ArgumentError, Arguments, Value};
use crate::container::{Container, Managed};
use crate::lifetime::LifetimeError;

pub use cached::CachedDelivery;
pub use instance::{Instance, TypeInfo};
pub use regular::RegularDelivery;

/// Where a source type expects the container in its constructor's argument
/// list.
///
/// The location is declared on the source type by [`Deliverable::LOCATION`]
/// and recorded in every delivery built for it, so it is decided once at
/// registration instead of being looked up whenever an instance is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeliveryLocation {
    /// The container is injected ahead of all prepared and call-site
    /// arguments.
    NeedsContainer,
    /// The container is not passed at all.
    #[default]
    Standalone,
}

impl Display for DeliveryLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NeedsContainer => write!(f, "NeedsContainer"),
            Self::Standalone => write!(f, "Standalone"),
        }
    }
}

/// A type that can be constructed by deliveries.
///
/// Usually you don't need to implement [`Deliverable`] manually, since the
/// [`deliverable`] attribute macro generates it from an annotated
/// constructor. A manual implementation looks like this:
///
/// ```rust
/// # use std::convert::Infallible;
/// # use courier::argument::{ArgumentError, Arguments};
/// # use courier::container::Container;
/// # use courier::delivery::{Deliverable, DeliveryLocation};
/// struct Session {
///     container: Container,
///     user: String,
/// }
///
/// impl Deliverable for Session {
///     const LOCATION: DeliveryLocation = DeliveryLocation::NeedsContainer;
///
///     type Error = Infallible;
///
///     fn construct(arguments: &mut Arguments) -> Result<Result<Self, Self::Error>, ArgumentError> {
///         let container = arguments.container()?;
///         let user = arguments.next()?;
///         Ok(Ok(Self { container, user }))
///     }
/// }
/// ```
///
/// [`deliverable`]: crate::deliverable
pub trait Deliverable: Managed + Sized {
    /// Whether the constructor takes the container ahead of its other
    /// arguments.
    const LOCATION: DeliveryLocation = DeliveryLocation::Standalone;

    /// The error a constructor reports after all its arguments are gathered.
    type Error: Into<Box<dyn Error + Send + Sync>>;

    /// Pulls the constructor's arguments out of `arguments` and creates the
    /// object.
    ///
    /// # Errors
    ///
    /// Returns an [`ArgumentError`] if the arguments don't fit the
    /// constructor.
    ///
    /// Returns an inner error [`Deliverable::Error`] wrapped in the outer
    /// [`Ok`] if the construction itself fails.
    fn construct(arguments: &mut Arguments) -> Result<Result<Self, Self::Error>, ArgumentError>;
}

/// A recipe for producing instances of one source type.
///
/// A [`Delivery`] fixes the source type, a list of prepared arguments that
/// lead every construction, and the strategy used by [`Delivery::open`].
pub trait Delivery: Debug + Send + Sync + 'static {
    /// The type every instance produced by [`Delivery::open`] has.
    fn source(&self) -> TypeInfo;

    fn prepared(&self) -> &[Value];

    fn location(&self) -> DeliveryLocation;

    /// Produces an instance for `container`, with `args` following the
    /// prepared arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments don't fit the source type's
    /// constructor or the constructor fails.
    fn open(&self, container: &Container, args: Vec<Value>) -> Result<Instance, DeliveryError>;
}

impl<D> Delivery for Box<D>
where
    D: Delivery + ?Sized,
{
    fn source(&self) -> TypeInfo {
        (**self).source()
    }

    fn prepared(&self) -> &[Value] {
        (**self).prepared()
    }

    fn location(&self) -> DeliveryLocation {
        (**self).location()
    }

    fn open(&self, container: &Container, args: Vec<Value>) -> Result<Instance, DeliveryError> {
        (**self).open(container, args)
    }
}

/// Runs `T`'s constructor over `values`, injecting `container` first when
/// the location asks for it.
pub(crate) fn construct<T>(
    location: DeliveryLocation,
    container: &Container,
    values: Vec<Value>,
) -> Result<Instance, DeliveryError>
where
    T: Deliverable,
{
    let container = match location {
        DeliveryLocation::NeedsContainer => Some(container.clone()),
        DeliveryLocation::Standalone => None,
    };
    let mut arguments = Arguments::new(container, values);
    let source_type = TypeInfo::of::<T>();

    match T::construct(&mut arguments) {
        Ok(Ok(object)) => Ok(Instance::new(object)),
        Ok(Err(err)) => {
            let source: Box<dyn Error + Send + Sync> = err.into();
            Err(DeliveryError::Construction {
                source_type,
                source: Arc::from(source),
            })
        }
        Err(err) => Err(err).context(ArgumentSnafu { source_type }),
    }
}

/// Concatenates prepared and call-site arguments.
fn concat(prepared: &[Value], args: Vec<Value>) -> Vec<Value> {
    let mut values = Vec::with_capacity(prepared.len() + args.len());
    values.extend_from_slice(prepared);
    values.extend(args);
    values
}

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum DeliveryError {
    #[snafu(display("could not build a cached delivery"), context(false))]
    #[non_exhaustive]
    Lifetime { source: LifetimeError },
    #[snafu(display("could not gather the arguments of {source_type}"))]
    #[non_exhaustive]
    Argument {
        source_type: TypeInfo,
        source: ArgumentError,
    },
    #[snafu(display("could not construct {source_type}"))]
    #[non_exhaustive]
    Construction {
        source_type: TypeInfo,
        source: Arc<dyn Error + Send + Sync>,
    },
    #[snafu(display("could not construct {source_type} which re-enters its own cached construction"))]
    #[non_exhaustive]
    CyclicConstruction { source_type: TypeInfo },
    #[snafu(display("the construction of {source_type} was abandoned by the constructing thread"))]
    #[non_exhaustive]
    Abandoned { source_type: TypeInfo },
    #[snafu(display("the delivery of {source_type} produced an instance of {actual}"))]
    #[non_exhaustive]
    Unexpected {
        source_type: TypeInfo,
        actual: TypeInfo,
    },
}
