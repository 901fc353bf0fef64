//! Key extraction policies for the quad tree lookup table

use std::hash::Hash;

/// Derives the lookup-table key for a stored payload
///
/// The tree keeps one table entry per key, so the policy should map each
/// distinct payload to a distinct key.
pub trait KeyPolicy<T> {
    /// Key type stored in the lookup table
    type Key: Eq + Hash;

    /// Key for a payload
    fn key_of(&self, object: &T) -> Self::Key;
}

/// The payload is its own key
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityKey;

impl<T: Clone + Eq + Hash> KeyPolicy<T> for IdentityKey {
    type Key = T;

    fn key_of(&self, object: &T) -> T {
        object.clone()
    }
}

/// Key computed by a closure, e.g. `KeyFn(|node: &SceneNode| node.id)`
#[derive(Debug, Clone, Copy)]
pub struct KeyFn<F>(pub F);

impl<T, K, F> KeyPolicy<T> for KeyFn<F>
where
    F: Fn(&T) -> K,
    K: Eq + Hash,
{
    type Key = K;

    fn key_of(&self, object: &T) -> K {
        (self.0)(object)
    }
}
