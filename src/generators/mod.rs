// src/generators/mod.rs
pub mod password;

pub use password::{
    classify_strength, generate_with, validate_request, GeneratorError, PasswordGenerator,
    ShuffleSource,
};
