use std::any::{self, Any, TypeId};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::Managed;

/// Type name and type id of a source type.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_name: any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.type_name)
    }
}

/// An object produced by a delivery, tagged with its source type.
///
/// Instances are shared: a cached delivery hands out clones of one
/// [`Instance`], and [`Instance::ptr_eq`] tells whether two instances are the
/// very same object.
#[derive(Clone)]
pub struct Instance {
    info: TypeInfo,
    object: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub(crate) fn new<T: Managed>(object: T) -> Self {
        Self {
            info: TypeInfo::of::<T>(),
            object: Arc::new(object),
        }
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    /// Returns true if the instance was constructed as a `T`.
    pub fn is<T: Managed>(&self) -> bool {
        self.info.type_id == TypeId::of::<T>()
    }

    /// Recovers the concrete object.
    ///
    /// # Errors
    ///
    /// Returns `self` back if the instance isn't a `T`.
    pub fn downcast<T: Managed>(self) -> Result<Arc<T>, Self> {
        let info = self.info;
        Arc::downcast::<T>(self.object).map_err(|object| Self { info, object })
    }

    pub fn downcast_ref<T: Managed>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.object).cast::<()>() == Arc::as_ptr(&other.object).cast::<()>()
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Instance")
            .field("type", &self.info.type_name)
            .field("object", &Arc::as_ptr(&self.object).cast::<()>())
            .finish()
    }
}
