//! Typed Ids
//!
//! The bakery API identifies every resource with an integer key. Wrapping the
//! raw value in a marker type keeps product ids and payment method ids from
//! being mixed up.

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Integer id tagged with the resource it belongs to.
pub struct TypedId<T>(u64, PhantomData<T>);

impl<T> TypedId<T> {
    /// Wrap a raw backend id.
    pub const fn new(id: u64) -> Self {
        Self(id, PhantomData)
    }

    /// The raw backend id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl<T> Clone for TypedId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedId<T> {}

impl<T> Debug for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for TypedId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedId<T> {}

impl<T> Hash for TypedId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialOrd for TypedId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypedId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> From<u64> for TypedId<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T> Serialize for TypedId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de, T> Deserialize<'de> for TypedId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_raw_value() {
        let id = TypedId::<()>::new(42);

        assert_eq!(id.to_string(), "42");
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn orders_by_raw_value() {
        let low = TypedId::<()>::new(1);
        let high = TypedId::<()>::from(7);

        assert!(low < high);
        assert_eq!(low, TypedId::new(1));
    }
}
