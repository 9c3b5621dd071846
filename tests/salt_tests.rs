//! Integration tests for salt generation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use saltvault::salt::{SaltProvider, WordSaltGenerator};

#[test]
fn salt_has_one_fewer_hyphen_than_words() {
    let mut generator = WordSaltGenerator::new(StdRng::seed_from_u64(1));

    for n in 1..10 {
        let salt = generator.generate_salt(n);
        let text = String::from_utf8(salt.into_bytes()).unwrap();
        assert_eq!(text.matches('-').count(), n - 1, "salt {text:?}");
        assert!(!text.contains("--"));
    }
}

#[test]
fn words_are_lowercase_and_bounded() {
    let mut generator = WordSaltGenerator::new(StdRng::seed_from_u64(42));
    let text = String::from_utf8(generator.generate_salt(50).into_bytes()).unwrap();

    for word in text.split('-') {
        assert!((3..=8).contains(&word.len()), "word {word:?}");
        assert!(word.bytes().all(|b| b.is_ascii_lowercase()));
    }
}

#[test]
fn same_seed_same_salt() {
    let a = WordSaltGenerator::new(StdRng::seed_from_u64(7)).generate_salt(5);
    let b = WordSaltGenerator::new(StdRng::seed_from_u64(7)).generate_salt(5);
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn provider_yields_four_to_six_words() {
    let mut generator = WordSaltGenerator::new(StdRng::seed_from_u64(99));
    for _ in 0..20 {
        let salt = generator.provide_salt().unwrap();
        let words = salt.to_display_string().split('-').count();
        assert!((4..=6).contains(&words));
    }
}
