use std::sync::Arc;

use crate::core::Result;

/// Produces a continuation for a prompt.
///
/// `max_length` is the maximum output length in tokens and must be positive.
/// Implementations return the raw generated text; trimming and whitespace
/// cleanup are left to the caller.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, max_length: usize) -> Result<String>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn generate(&self, prompt: &str, max_length: usize) -> Result<String> {
        (**self).generate(prompt, max_length)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn generate(&self, prompt: &str, max_length: usize) -> Result<String> {
        (**self).generate(prompt, max_length)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn generate(&self, prompt: &str, max_length: usize) -> Result<String> {
        (**self).generate(prompt, max_length)
    }
}
