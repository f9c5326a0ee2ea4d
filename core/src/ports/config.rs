//! Tunnel repository port (interface).

use std::collections::BTreeMap;

use crate::domain::TunnelDefinition;
use crate::error::Result;

/// Port for tunnel definition persistence.
///
/// The whole set is read and written at once; there are no partial updates.
pub trait TunnelRepository: Send + Sync {
    /// Load every definition, keyed by name. A missing store is an empty set.
    fn load(&self) -> Result<BTreeMap<String, TunnelDefinition>>;

    /// Replace the stored set with `tunnels`.
    fn save(&self, tunnels: &BTreeMap<String, TunnelDefinition>) -> Result<()>;
}
