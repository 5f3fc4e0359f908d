//! Per-session configuration.
//!
//! Everything here is optional: a default [`SessionConfig`] runs the model
//! with the transport defaults from its capability descriptor.

use std::time::Duration;

use crate::caps::{CapabilityDescriptor, TransportDefaults};
use crate::transport::Pacing;
use crate::types::Region;

/// Settings supplied when a session is opened.
///
/// ```
/// use std::time::Duration;
/// use catlink_core::config::SessionConfig;
/// use catlink_core::types::Region;
///
/// let config = SessionConfig::default()
///     .with_region(Region::Two)
///     .with_timeout(Duration::from_millis(500))
///     .with_retry(5);
/// assert_eq!(config.retry, Some(5));
/// assert!(config.restore_on_close);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// ITU region selecting which frequency range lists apply.
    pub region: Region,
    pub timeout: Option<Duration>,
    /// Attempts per transaction, counting the first.
    pub retry: Option<u32>,
    pub write_delay: Option<Duration>,
    pub post_write_delay: Option<Duration>,
    /// Bus address override for addressed protocols (CI-V).
    pub address: Option<u8>,
    /// Put back rig settings changed at open (such as auto-information)
    /// when the session closes.
    pub restore_on_close: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            region: Region::default(),
            timeout: None,
            retry: None,
            write_delay: None,
            post_write_delay: None,
            address: None,
            restore_on_close: true,
        }
    }
}

impl SessionConfig {
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry(mut self, attempts: u32) -> Self {
        self.retry = Some(attempts);
        self
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    pub fn with_post_write_delay(mut self, delay: Duration) -> Self {
        self.post_write_delay = Some(delay);
        self
    }

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_restore_on_close(mut self, restore: bool) -> Self {
        self.restore_on_close = restore;
        self
    }

    /// Effective transport settings: the descriptor's defaults with this
    /// config's overrides applied.
    pub fn resolve(&self, defaults: &TransportDefaults) -> TransportDefaults {
        TransportDefaults {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            retry: self.retry.unwrap_or(defaults.retry).max(1),
            write_delay: self.write_delay.unwrap_or(defaults.write_delay),
            post_write_delay: self.post_write_delay.unwrap_or(defaults.post_write_delay),
            ..defaults.clone()
        }
    }

    /// Effective pacing for `descriptor`.
    pub fn pacing(&self, descriptor: &CapabilityDescriptor) -> Pacing {
        let t = self.resolve(&descriptor.transport);
        Pacing {
            write_delay: t.write_delay,
            post_write_delay: t.post_write_delay,
        }
    }

    /// Effective bus address: the override, else the model default.
    pub fn address_for(&self, descriptor: &CapabilityDescriptor) -> Option<u8> {
        self.address.or(descriptor.default_address)
    }
}
