// src/generators/password.rs
use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use thiserror::Error;

use crate::models::{
    GeneratedPassword, GenerationRequest, StrengthReport, StrengthTier,
    MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};

pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const NUMBERS: &[u8] = b"0123456789";
pub const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("At least one character type must be included")]
    NoCharacterClassSelected,

    #[error("Password length must be between {min} and {max} characters, got {length}")]
    LengthOutOfRange { length: usize, min: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, GeneratorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterClass {
    Uppercase,
    Lowercase,
    Numbers,
    Symbols,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Uppercase,
        CharacterClass::Lowercase,
        CharacterClass::Numbers,
        CharacterClass::Symbols,
    ];

    pub fn charset(&self) -> &'static [u8] {
        match self {
            CharacterClass::Uppercase => UPPERCASE,
            CharacterClass::Lowercase => LOWERCASE,
            CharacterClass::Numbers => NUMBERS,
            CharacterClass::Symbols => SYMBOLS,
        }
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.charset().contains(&(c as u8))
    }

    pub fn is_enabled(&self, request: &GenerationRequest) -> bool {
        match self {
            CharacterClass::Uppercase => request.include_uppercase,
            CharacterClass::Lowercase => request.include_lowercase,
            CharacterClass::Numbers => request.include_numbers,
            CharacterClass::Symbols => request.include_symbols,
        }
    }
}

/// Enabled classes in fixed order: uppercase, lowercase, numbers, symbols.
pub fn enabled_classes(request: &GenerationRequest) -> Vec<CharacterClass> {
    CharacterClass::ALL
        .into_iter()
        .filter(|class| class.is_enabled(request))
        .collect()
}

/// Union of the enabled classes' characters.
pub fn alphabet(request: &GenerationRequest) -> Vec<u8> {
    enabled_classes(request)
        .iter()
        .flat_map(|class| class.charset().iter().copied())
        .collect()
}

/// Checks the bounds the surfaces enforce before calling [`generate_with`].
pub fn validate_request(request: &GenerationRequest) -> Result<()> {
    if !request.length_in_range() {
        return Err(GeneratorError::LengthOutOfRange {
            length: request.length,
            min: MIN_PASSWORD_LENGTH,
            max: MAX_PASSWORD_LENGTH,
        });
    }

    if !request.has_any_class() {
        return Err(GeneratorError::NoCharacterClassSelected);
    }

    Ok(())
}

/// Scores the request itself, not any generated string.
pub fn classify_strength(request: &GenerationRequest) -> StrengthReport {
    let mut score: u8 = 0;

    for threshold in [8, 12, 16] {
        if request.length >= threshold {
            score += 1;
        }
    }

    score += request.enabled_class_count() as u8;

    StrengthReport {
        score,
        tier: StrengthTier::from_score(score),
    }
}

/// Generates a password drawing characters from `char_rng` and shuffling with
/// `shuffle_rng`.
///
/// One character from each enabled class is placed before the shuffle. The
/// result is cut to `request.length` after shuffling, so a length smaller than
/// the number of enabled classes can lose some of those guaranteed characters.
pub fn generate_with<C, S>(
    request: &GenerationRequest,
    char_rng: &mut C,
    shuffle_rng: &mut S,
) -> Result<GeneratedPassword>
where
    C: RngCore + CryptoRng + ?Sized,
    S: RngCore + ?Sized,
{
    let chars = alphabet(request);
    if chars.is_empty() {
        return Err(GeneratorError::NoCharacterClassSelected);
    }

    let mut password: Vec<u8> = enabled_classes(request)
        .iter()
        .map(|class| pick(class.charset(), char_rng))
        .collect();

    let remaining = request.length.saturating_sub(password.len());
    password.extend((0..remaining).map(|_| pick(&chars, char_rng)));

    fisher_yates(&mut password, shuffle_rng);
    password.truncate(request.length);

    // Every byte comes from the ASCII charsets above
    let text = password.into_iter().map(char::from).collect();
    Ok(GeneratedPassword::new(text))
}

fn pick<R: RngCore + ?Sized>(set: &[u8], rng: &mut R) -> u8 {
    set[rng.gen_range(0..set.len())]
}

/// In-place Fisher-Yates: walk from the last index down to 1, swapping each
/// slot with a uniform index in `[0, i]`.
pub fn fisher_yates<T, R: RngCore + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Random source used for the shuffle step. Characters always come from the OS CSPRNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShuffleSource {
    #[default]
    Os,
    Thread,
}

impl FromStr for ShuffleSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "os" | "osrng" => Ok(ShuffleSource::Os),
            "thread" | "thread_rng" => Ok(ShuffleSource::Thread),
            other => Err(format!("unknown shuffle source '{}'", other)),
        }
    }
}

impl fmt::Display for ShuffleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShuffleSource::Os => write!(f, "os"),
            ShuffleSource::Thread => write!(f, "thread"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordGenerator {
    shuffle_source: ShuffleSource,
}

impl PasswordGenerator {
    pub fn new() -> Self {
        PasswordGenerator::default()
    }

    pub fn with_shuffle_source(shuffle_source: ShuffleSource) -> Self {
        PasswordGenerator { shuffle_source }
    }

    pub fn shuffle_source(&self) -> ShuffleSource {
        self.shuffle_source
    }

    pub fn generate_password(&self, request: &GenerationRequest) -> Result<GeneratedPassword> {
        let mut char_rng = OsRng;
        match self.shuffle_source {
            ShuffleSource::Os => generate_with(request, &mut char_rng, &mut OsRng),
            ShuffleSource::Thread => generate_with(request, &mut char_rng, &mut rand::thread_rng()),
        }
    }
}
