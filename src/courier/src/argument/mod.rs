mod arguments;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::util::any::AsAny;
use crate::util::hash::DynHash;

pub use arguments::{ArgumentError, Arguments};

/// A value that can be passed to a delivery, either as a prepared argument or
/// at a call site.
///
/// Arguments are part of the cache key of cached deliveries, so they must be
/// comparable and hashable after their type is erased. Any
/// `Debug + Eq + Hash + Send + Sync + 'static` type qualifies. Plain values
/// compare by value; wrap shared objects in [`ByRef`] to compare them by
/// identity instead.
pub trait Argument: AsAny + DynHash + Debug + Send + Sync {}

impl<T> Argument for T where T: Debug + Eq + Hash + Send + Sync + 'static {}

/// A type-erased, cheaply clonable [`Argument`].
#[derive(Clone)]
pub struct Value(Arc<dyn Argument>);

impl Value {
    pub fn new<T: Argument>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn is<T: Argument>(&self) -> bool {
        (*self.0).as_any().is::<T>()
    }

    pub fn downcast_ref<T: Argument>(&self) -> Option<&T> {
        (*self.0).as_any().downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        (*self.0).type_name()
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        (*self.0).dyn_eq((*other.0).as_any())
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.0).dyn_hash(state);
    }
}

/// A shared object passed by reference.
///
/// Two [`ByRef`]s are equal only if they point to the same allocation, no
/// matter what the pointee looks like, so a cached delivery keyed by a
/// [`ByRef`] hands out one instance per distinct object.
pub struct ByRef<T: ?Sized>(Arc<T>);

impl<T> ByRef<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl<T: ?Sized> ByRef<T> {
    pub fn from_arc(arc: Arc<T>) -> Self {
        Self(arc)
    }

    pub fn as_arc(&self) -> &Arc<T> {
        &self.0
    }

    pub fn into_arc(self) -> Arc<T> {
        self.0
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl<T: ?Sized> Clone for ByRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for ByRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: ?Sized> Debug for ByRef<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "ByRef<{}>({:#x})", std::any::type_name::<T>(), self.addr())
    }
}

impl<T: ?Sized> PartialEq for ByRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<T: ?Sized> Eq for ByRef<T> {}

impl<T: ?Sized> Hash for ByRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized> From<Arc<T>> for ByRef<T> {
    fn from(arc: Arc<T>) -> Self {
        Self(arc)
    }
}

/// Builds a `Vec<Value>` out of argument expressions.
///
/// ```rust
/// # use courier::args;
/// # use courier::argument::ByRef;
/// let shared = ByRef::new(vec![1, 2, 3]);
/// let arguments = args![42, "name", shared.clone()];
/// assert_eq!(arguments.len(), 3);
/// assert_eq!(arguments[2].downcast_ref::<ByRef<Vec<i32>>>(), Some(&shared));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::argument::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::argument::Value::new($value)),+]
    };
}
