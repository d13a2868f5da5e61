//! Single-flight page acquisition.
//!
//! A rendering surface produces interleaved, corrupted text when two loads
//! run on it at once. [`SingleFlight`] owns one slot per [`Target`]: a
//! request for a target whose slot is taken is rejected immediately rather
//! than queued. The usage page and the billing page are independent
//! targets, so one can load while the other is busy.
//!
//! Every acquisition is bounded by a timeout. The slot is released by a
//! drop guard, so it is freed on success, error, timeout and cancellation
//! alike.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::FetchError;
use crate::host::render::{PageRenderer, RenderedPage};

/// Default bound on how long to wait for rendered text.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Target
// ============================================================================

/// A logical page that is acquired at most once at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The subscription usage page.
    Usage,
    /// The billing page.
    Billing,
}

impl Target {
    /// Returns the display name for this target.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Usage => "usage page",
            Self::Billing => "billing page",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Flight Token
// ============================================================================

/// Proof that the holder owns a target's slot. Releases it on drop.
#[derive(Debug)]
pub struct FlightToken<'a> {
    slot: &'a AtomicBool,
    target: Target,
}

impl FlightToken<'_> {
    /// The target this token holds.
    pub fn target(&self) -> Target {
        self.target
    }
}

impl Drop for FlightToken<'_> {
    fn drop(&mut self) {
        self.slot.store(false, Ordering::Release);
        debug!(target_page = %self.target, "Released acquisition slot");
    }
}

// ============================================================================
// Single Flight
// ============================================================================

/// Acquires rendered pages with at most one in-flight load per target.
pub struct SingleFlight {
    renderer: Arc<dyn PageRenderer>,
    timeout: Duration,
    usage_slot: AtomicBool,
    billing_slot: AtomicBool,
}

impl SingleFlight {
    /// Creates an acquirer around `renderer` with the default timeout.
    pub fn new(renderer: impl PageRenderer + 'static) -> Self {
        Self::from_shared(Arc::new(renderer))
    }

    /// Creates an acquirer around a shared renderer.
    pub fn from_shared(renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            renderer,
            timeout: DEFAULT_ACQUIRE_TIMEOUT,
            usage_slot: AtomicBool::new(false),
            billing_slot: AtomicBool::new(false),
        }
    }

    /// Sets the acquisition timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The acquisition timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn slot(&self, target: Target) -> &AtomicBool {
        match target {
            Target::Usage => &self.usage_slot,
            Target::Billing => &self.billing_slot,
        }
    }

    /// Returns true if an acquisition for `target` is running.
    pub fn is_busy(&self, target: Target) -> bool {
        self.slot(target).load(Ordering::Acquire)
    }

    /// Claims the slot for `target`, or returns `None` if it is taken.
    pub fn try_begin(&self, target: Target) -> Option<FlightToken<'_>> {
        let slot = self.slot(target);
        slot.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightToken { slot, target })
    }

    /// Renders `url` for `target`.
    ///
    /// # Errors
    ///
    /// - `FetchError::InFlight` when another acquisition for the same
    ///   target is still running;
    /// - `FetchError::Timeout` when the renderer does not finish in time;
    /// - any error the renderer returns.
    #[instrument(skip(self, target), fields(renderer = %self.renderer.name(), target_page = %target))]
    pub async fn acquire(&self, target: Target, url: &str) -> Result<RenderedPage, FetchError> {
        let Some(_token) = self.try_begin(target) else {
            info!(target_page = %target, "Acquisition already in flight, rejecting");
            return Err(FetchError::InFlight(target));
        };

        debug!(timeout = ?self.timeout, "Acquiring rendered page");
        match tokio::time::timeout(self.timeout, self.renderer.render(url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(target_page = %target, timeout = ?self.timeout, "Acquisition timed out");
                Err(FetchError::Timeout(self.timeout))
            }
        }
    }

    /// Like [`acquire`](Self::acquire), but a busy target yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Timeout and renderer errors are still returned.
    pub async fn acquire_or_none(
        &self,
        target: Target,
        url: &str,
    ) -> Result<Option<RenderedPage>, FetchError> {
        match self.acquire(target, url).await {
            Ok(page) => Ok(Some(page)),
            Err(FetchError::InFlight(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Debug for SingleFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlight")
            .field("renderer", &self.renderer.name())
            .field("timeout", &self.timeout)
            .field("usage_busy", &self.is_busy(Target::Usage))
            .field("billing_busy", &self.is_busy(Target::Billing))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::render::StaticRenderer;

    const URL: &str = "https://claude.ai/settings/usage";

    fn slow_flight(delay_ms: u64) -> SingleFlight {
        SingleFlight::new(
            StaticRenderer::new("Current session\n45% used", URL)
                .with_delay(Duration::from_millis(delay_ms)),
        )
    }

    #[tokio::test]
    async fn test_acquire_returns_page() {
        let flight = slow_flight(0);
        let page = flight.acquire(Target::Usage, URL).await.unwrap();
        assert_eq!(page.text, "Current session\n45% used");
        assert!(!flight.is_busy(Target::Usage));
    }

    #[tokio::test]
    async fn test_second_acquisition_is_rejected() {
        let flight = slow_flight(200);

        let (first, second) = tokio::join!(flight.acquire(Target::Usage, URL), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            flight.acquire_or_none(Target::Usage, URL).await
        });

        assert!(first.is_ok());
        assert!(matches!(second, Ok(None)));
        assert!(!flight.is_busy(Target::Usage));
    }

    #[tokio::test]
    async fn test_targets_are_independent() {
        let flight = slow_flight(100);

        let (usage, billing) = tokio::join!(flight.acquire(Target::Usage, URL), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            flight.acquire(Target::Billing, URL).await
        });

        assert!(usage.is_ok());
        assert!(billing.is_ok());
    }

    #[tokio::test]
    async fn test_timeout_releases_slot() {
        let flight = slow_flight(500).with_timeout(Duration::from_millis(50));

        let result = flight.acquire(Target::Usage, URL).await;
        assert!(matches!(result, Err(FetchError::Timeout(_))));
        assert!(!flight.is_busy(Target::Usage));
        assert!(flight.try_begin(Target::Usage).is_some());
    }

    #[test]
    fn test_token_releases_on_drop() {
        let flight = slow_flight(0);

        let token = flight.try_begin(Target::Billing).unwrap();
        assert_eq!(token.target(), Target::Billing);
        assert!(flight.try_begin(Target::Billing).is_none());
        assert!(flight.try_begin(Target::Usage).is_some());

        drop(token);
        assert!(flight.try_begin(Target::Billing).is_some());
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(slow_flight(0).timeout(), Duration::from_secs(30));
    }
}
