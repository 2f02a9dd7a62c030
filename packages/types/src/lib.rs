//! Shared foundation types for the storefront workspace.

pub use anyhow::{Error, Result, anyhow, bail};
pub use serde_json::Value;

/// Generates a collision-resistant identifier for newly created documents.
pub fn create_id() -> String {
    cuid2::create_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_id_is_unique_and_nonempty() {
        let a = create_id();
        let b = create_id();
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }
}
