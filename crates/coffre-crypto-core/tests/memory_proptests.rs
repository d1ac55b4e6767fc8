#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for the secure memory containers.

use coffre_crypto_core::memory::{SecureArray, SecureBuffer};
use proptest::prelude::*;

proptest! {
    /// A buffer faithfully holds arbitrary content.
    #[test]
    fn secure_buffer_roundtrips_content(
        data in proptest::collection::vec(any::<u8>(), 0..1024),
    ) {
        let buf = SecureBuffer::new(&data).expect("allocation should succeed");
        prop_assert_eq!(buf.expose(), data.as_slice());
        prop_assert_eq!(buf.len(), data.len());
    }

    /// Debug and Display never reflect the content, whatever it is.
    #[test]
    fn secure_buffer_output_is_always_masked(
        data in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let buf = SecureBuffer::new(&data).expect("allocation should succeed");
        prop_assert_eq!(format!("{buf:?}"), "SecureBuffer(***)");
        prop_assert_eq!(format!("{buf}"), "SecureBuffer(***)");
    }

    /// Fixed-size containers roundtrip arbitrary key material.
    #[test]
    fn secure_array_roundtrips_content(data in any::<[u8; 32]>()) {
        let key = SecureArray::new(data);
        prop_assert_eq!(key.expose(), &data);
    }

    /// The mask shows the size parameter, never the bytes.
    #[test]
    fn secure_array_output_is_always_masked(data in any::<[u8; 16]>()) {
        let iv = SecureArray::new(data);
        prop_assert_eq!(format!("{iv:?}"), "SecureArray<16>(***)");
    }
}
