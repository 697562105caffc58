//! Property-based tests for signing and key encodings

use dfu_crypto::{PublicKey, Signature, SigningKey};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_signature_verifies_only_its_message(
        data in prop::collection::vec(any::<u8>(), 0..512),
        flip in any::<usize>(),
    ) {
        let key = SigningKey::generate();
        let signature = key.sign(&data);
        let public = key.public_key();
        prop_assert!(public.verify(&data, &signature).is_ok());

        let decoded = Signature::from_bytes(signature.as_bytes())?;
        prop_assert!(public.verify(&data, &decoded).is_ok());

        if !data.is_empty() {
            let mut tampered = data.clone();
            if let Some(byte) = tampered.get_mut(flip % data.len()) {
                *byte ^= 0x01;
            }
            prop_assert!(public.verify(&tampered, &signature).is_err());
        }
    }

    #[test]
    fn prop_public_key_raw_round_trip(_seed in any::<u8>()) {
        let public = SigningKey::generate().public_key();
        prop_assert_eq!(PublicKey::from_raw_be(&public.raw_be())?, public);
    }

    #[test]
    fn prop_scalar_round_trip(_seed in any::<u8>()) {
        let key = SigningKey::generate();
        let restored = SigningKey::from_scalar(&key.scalar())?;
        prop_assert_eq!(restored.scalar(), key.scalar());
        prop_assert!(!restored.is_insecure());
    }
}
