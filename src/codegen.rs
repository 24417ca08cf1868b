//! Short code generation

use rand::{distr::Alphanumeric, Rng};

/// Length of generated short codes
pub const CODE_LENGTH: usize = 6;

/// How many random candidates `shorten` tries before giving up
pub const MAX_ATTEMPTS: usize = 100;

/// Produces candidate short codes.
///
/// Generators never touch storage; the store checks every candidate against
/// the unique index and asks for another one on collision.
pub trait CodeGenerator: Send + Sync + 'static {
    fn generate(&self) -> String;
}

/// Uniformly random codes over `[A-Za-z0-9]`
#[derive(Debug, Clone, Copy)]
pub struct RandomCodes {
    pub length: usize,
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self {
            length: CODE_LENGTH,
        }
    }
}

impl CodeGenerator for RandomCodes {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}
