//! Public identifier generation.

use uuid::Uuid;

/// Length of a public identifier in characters.
pub const PUBLIC_ID_LEN: usize = 8;

/// Generate a short public identifier: the first 8 hex characters of a
/// random 128-bit UUID (32 bits of entropy).
///
/// Uniqueness is enforced by the store's UNIQUE constraint, not here;
/// callers retry with a freshly generated value on collision.
pub fn generate() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(PUBLIC_ID_LEN);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_short_lowercase_hex() {
        let id = generate();
        assert_eq!(id.len(), PUBLIC_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(generate(), generate());
    }
}
