use std::ops::{Deref, DerefMut};

use armkit_runtime::ETag;

/// A resource together with the `ETag` of the version that was returned.
///
/// Pass [`etag`](Self::etag) back as `if_match` to update or delete exactly
/// this version.
#[derive(Clone, Debug, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub etag: Option<ETag>,
}

impl<T> Versioned<T> {
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Versioned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Versioned<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

/// Result of a `HEAD` on a resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityTag {
    pub etag: Option<ETag>,
    /// The entity exists; a missing one is reported as an error.
    pub success: bool,
}
