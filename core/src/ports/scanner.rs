//! Connection table port (interface).

use crate::domain::RawConnection;
use crate::error::Result;

/// Port for querying the OS connection table.
///
/// Implementations handle platform-specific details (ss, lsof, etc.).
pub trait ConnectionTable: Send + Sync {
    /// List every inet (TCP and UDP) connection visible to the caller.
    ///
    /// Returns `Error::PermissionDenied` when the OS refuses to enumerate
    /// connections at all.
    fn connections(&self) -> Result<Vec<RawConnection>>;
}
