//! Random identifier generation with collision retry.

use crate::error::{Result, StoreError};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generates alphanumeric ids, retrying while the candidate is already taken.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    length: usize,
    max_attempts: usize,
}

impl IdGenerator {
    pub fn new(length: usize, max_attempts: usize) -> Self {
        Self {
            length: length.max(1),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Produce an id for which `taken` returns false.
    ///
    /// Fails with [`StoreError::IdSpaceExhausted`] once every attempt collided.
    pub fn generate<F>(&self, taken: F) -> Result<String>
    where
        F: Fn(&str) -> bool,
    {
        let mut rng = rand::thread_rng();
        for _ in 0..self.max_attempts {
            let candidate: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(self.length)
                .map(char::from)
                .collect();
            if !taken(&candidate) {
                return Ok(candidate);
            }
        }

        Err(StoreError::IdSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}
