//! Trait abstraction over relay processes.
//!
//! The [`Relay`] trait hides whether a relay is a real helper script run via
//! [`ProcessRelay`](crate::ProcessRelay) or a scripted
//! [`MockRelay`](crate::MockRelay) used in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::relay::RelayOutput;

/// An external program that is run to completion and whose standard output
/// carries its verdict.
///
/// # Example
///
/// ```ignore
/// use spinrig_core::{Relay, Result};
///
/// async fn print_output<R: Relay>(relay: &R) -> Result<()> {
///     let output = relay.invoke().await?;
///     println!("{}", output.trimmed());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait Relay: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Run the relay once and capture its output.
    ///
    /// Implementations must not interpret the output; classification is the
    /// caller's concern.
    async fn invoke(&self) -> Result<RelayOutput>;
}

#[async_trait]
impl<R: Relay + ?Sized> Relay for std::sync::Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn invoke(&self) -> Result<RelayOutput> {
        (**self).invoke().await
    }
}
