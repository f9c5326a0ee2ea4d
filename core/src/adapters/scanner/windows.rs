//! Windows connection table placeholder.

use crate::domain::RawConnection;
use crate::error::{Error, Result};

use super::Scanner;

/// Windows-specific connection scanner.
pub struct WindowsScanner;

impl WindowsScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for WindowsScanner {
    fn scan(&self) -> Result<Vec<RawConnection>> {
        // TODO: Implement Windows-specific scanning using netstat -ano
        Err(Error::UnsupportedPlatform(
            "Windows scanner not yet implemented".to_string(),
        ))
    }
}
