use std::any::Any;
use std::hash::{Hash, Hasher};

/// Equality and hashing that survive type erasure.
///
/// Two values are equal only when they share a concrete type and compare
/// equal under that type's [`Eq`]. The type identity is folded into the hash,
/// so `1i32` and `1i64` land in different slots.
pub trait DynHash: Any {
    fn dyn_eq(&self, other: &dyn Any) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T: Eq + Hash + 'static> DynHash for T {
    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.type_id().hash(&mut state);
        self.hash(&mut state);
    }
}

#[cfg(test)]
mod tests {
    use std::hash::DefaultHasher;

    use super::*;

    #[test]
    fn dyn_eq_distinguishes_types_with_equal_payloads() {
        assert!(1i32.dyn_eq(&1i32));
        assert!(!1i32.dyn_eq(&2i32));
        assert!(!1i32.dyn_eq(&1i64));
        assert!("a".dyn_eq(&"a"));
        assert!(!"a".dyn_eq(&String::from("a")));
    }

    #[test]
    fn dyn_hash_folds_in_the_concrete_type() {
        assert_eq!(hash_val(&1i32), hash_val(&1i32));
        assert_ne!(hash_val(&1i32), hash_val(&1i64));
        assert_ne!(hash_val(&1i32), hash_val(&2i32));
    }

    fn hash_val(val: &dyn DynHash) -> u64 {
        let mut hasher = DefaultHasher::new();
        val.dyn_hash(&mut hasher);
        hasher.finish()
    }
}
