//! Identifier generation.

use uuid::Uuid;

/// Generates a prefixed identifier, e.g. `user_7f9c…`.
///
/// Seeded fixtures use hand-picked ids like `user_maya`; everything created
/// at runtime goes through this.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id("user");
        assert!(id.starts_with("user_"));
        assert_eq!(id.len(), "user_".len() + 32);
    }

    #[test]
    fn test_generate_id_unique() {
        assert_ne!(generate_id("user"), generate_id("user"));
    }
}
