//! Single-slot master registry.
//!
//! # Responsibilities
//! - Hold the address of the device currently registered as master
//! - Validate and atomically replace it on registration
//! - Resolve the `master` alias for proxied requests

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::error::RelayError;
use crate::registry::address::is_valid_address;

/// Target alias that resolves to the registered master.
pub const MASTER_ALIAS: &str = "master";

/// Process-wide store for the master address.
///
/// Shared by handle (`Arc<MasterRegistry>`) between handlers. A registration
/// publishes a whole new value, so a reader sees either the old address or the
/// new one, never a mix.
#[derive(Debug, Default)]
pub struct MasterRegistry {
    address: ArcSwapOption<String>,
}

impl MasterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            address: ArcSwapOption::empty(),
        }
    }

    /// Validate `candidate` and make it the master address.
    ///
    /// On failure the previous registration stays in place.
    pub fn register(&self, candidate: &str) -> Result<String, RelayError> {
        if !is_valid_address(candidate) {
            return Err(RelayError::InvalidAddress(candidate.to_string()));
        }

        let address = candidate.to_string();
        let previous = self.address.swap(Some(Arc::new(address.clone())));

        tracing::info!(
            address = %address,
            previous = previous.as_deref().map(String::as_str).unwrap_or("none"),
            "Master tablet registered"
        );

        Ok(address)
    }

    /// True iff an address is currently stored.
    pub fn is_registered(&self) -> bool {
        self.address.load().is_some()
    }

    /// Snapshot of the stored address.
    pub fn current(&self) -> Option<String> {
        self.address.load_full().map(|address| address.as_ref().clone())
    }

    /// Map a routing target to a concrete address.
    ///
    /// `master` resolves to the registered address; anything else is returned
    /// unchanged.
    pub fn resolve(&self, target: &str) -> Result<String, RelayError> {
        if target != MASTER_ALIAS {
            return Ok(target.to_string());
        }
        self.current().ok_or(RelayError::Unregistered)
    }
}
