use crate::error::PactoError;
use async_trait::async_trait;

/// AI oracle trait — the language brain.
///
/// The oracle is a black box that turns a prompt into generated text; the
/// extraction adapter owns the prompts and the response schemas.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Human-readable oracle name.
    fn name(&self) -> &str;

    /// Send a single prompt and return the generated text.
    async fn generate(&self, prompt: &str) -> Result<String, PactoError>;

    /// Check if the oracle is reachable and ready.
    async fn is_available(&self) -> bool;
}

/// Outbound messaging channel trait.
///
/// One operation: deliver text to a recipient address. Delivery failures
/// surface as `PactoError::Channel`; callers log them, they are never
/// retried.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Send a text message to the given normalized recipient address.
    async fn send(&self, to: &str, text: &str) -> Result<(), PactoError>;
}
