//! Property-based tests for password generation.
//!
//! For any request with at least one class enabled and a length in range, the
//! generated password has exactly the requested length, draws only from the
//! enabled classes, and contains every enabled class. Strength depends on the
//! request alone.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use rust_passgen::generators::password::{enabled_classes, CharacterClass};
use rust_passgen::generators::{classify_strength, generate_with, GeneratorError, PasswordGenerator};
use rust_passgen::models::{GenerationRequest, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// Strategy for requests with a valid length and at least one class enabled.
fn arb_valid_request() -> impl Strategy<Value = GenerationRequest> {
    (
        MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH,
        any::<[bool; 4]>().prop_filter("at least one class", |flags| flags.iter().any(|f| *f)),
    )
        .prop_map(|(length, [upper, lower, numbers, symbols])| GenerationRequest {
            length,
            include_uppercase: upper,
            include_lowercase: lower,
            include_numbers: numbers,
            include_symbols: symbols,
        })
}

/// Any length, including ones below the number of enabled classes.
fn arb_any_length_request() -> impl Strategy<Value = GenerationRequest> {
    (0usize..=40, any::<[bool; 4]>()).prop_map(|(length, [upper, lower, numbers, symbols])| GenerationRequest {
        length,
        include_uppercase: upper,
        include_lowercase: lower,
        include_numbers: numbers,
        include_symbols: symbols,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_length_matches_request(req in arb_valid_request()) {
        let password = PasswordGenerator::new().generate_password(&req).unwrap();
        prop_assert_eq!(password.len(), req.length);
    }

    #[test]
    fn generated_chars_come_from_enabled_classes(req in arb_valid_request()) {
        let classes = enabled_classes(&req);
        let password = PasswordGenerator::new().generate_password(&req).unwrap();

        for c in password.as_str().chars() {
            prop_assert!(
                classes.iter().any(|class| class.contains(c)),
                "character {:?} not in any enabled class", c
            );
        }
    }

    #[test]
    fn every_enabled_class_is_present(req in arb_valid_request()) {
        let password = PasswordGenerator::new().generate_password(&req).unwrap();

        for class in enabled_classes(&req) {
            prop_assert!(
                password.as_str().chars().any(|c| class.contains(c)),
                "missing {:?}", class
            );
        }
    }

    #[test]
    fn disabled_classes_never_appear(req in arb_valid_request()) {
        let password = PasswordGenerator::new().generate_password(&req).unwrap();

        for class in CharacterClass::ALL.into_iter().filter(|class| !class.is_enabled(&req)) {
            prop_assert!(!password.as_str().chars().any(|c| class.contains(c)));
        }
    }

    #[test]
    fn strength_is_deterministic(req in arb_any_length_request()) {
        let first = classify_strength(&req);
        let second = classify_strength(&req);
        prop_assert_eq!(first, second);
        prop_assert!(first.score <= 7);
        prop_assert_eq!(first.score as usize >= req.enabled_class_count(), true);
    }

    #[test]
    fn seeded_generation_honours_length_and_classes(
        req in arb_any_length_request(),
        char_seed in any::<u64>(),
        shuffle_seed in any::<u64>(),
    ) {
        let result = generate_with(
            &req,
            &mut ChaCha20Rng::seed_from_u64(char_seed),
            &mut ChaCha20Rng::seed_from_u64(shuffle_seed),
        );

        if !req.has_any_class() {
            prop_assert_eq!(result, Err(GeneratorError::NoCharacterClassSelected));
        } else {
            let password = result.unwrap();
            prop_assert_eq!(password.len(), req.length);

            if req.length >= req.enabled_class_count() {
                for class in enabled_classes(&req) {
                    prop_assert!(password.as_str().chars().any(|c| class.contains(c)));
                }
            }
        }
    }
}
