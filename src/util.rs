use std::collections::TryReserveError;

/// Finds the length of the common prefix between a key and a node's label.
///
/// Returns the number of leading bytes that are equal in both slices.
pub fn prefix_match(key: &[u8], label: &[u8]) -> usize {
    key.iter()
        .zip(label.iter())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Copies `bytes` into a freshly allocated label, reporting allocation failure
/// instead of aborting.
pub fn try_label(bytes: &[u8]) -> Result<Vec<u8>, TryReserveError> {
    let mut label = Vec::new();
    label.try_reserve_exact(bytes.len())?;
    label.extend_from_slice(bytes);
    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match() {
        let key = b"abcdef";

        // They should match completely with the label
        assert_eq!(prefix_match(key, b"abc"), 3);

        // Starting from the 2nd byte, they should match 2 bytes
        assert_eq!(prefix_match(&key[1..], b"bc"), 2);

        // Different keys
        assert_eq!(prefix_match(key, b"xyz"), 0);

        // Divergence in the middle
        assert_eq!(prefix_match(b"toast", b"toy"), 2);
    }

    #[test]
    fn test_prefix_match_empty() {
        assert_eq!(prefix_match(b"", b"abc"), 0);
        assert_eq!(prefix_match(b"abc", b""), 0);
    }

    #[test]
    fn test_try_label() {
        let label = try_label(b"car").unwrap();
        assert_eq!(label, b"car".to_vec());

        assert!(try_label(b"").unwrap().is_empty());
    }
}
