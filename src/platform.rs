//! Host platform detection and spec resolution
//!
//! Detection maps `std::env::consts::OS` onto a `PlatformTag` and caches the
//! answer for the life of the process. Resolution picks the descriptor entry
//! for a platform and never fails: a missing entry is `Unsupported`.

use crate::catalog::{AcquisitionSpec, ApplicationDescriptor};
use crate::error::InstallerError;
use crate::types::PlatformTag;
use std::sync::OnceLock;
use tracing::info;

static HOST_PLATFORM: OnceLock<Option<PlatformTag>> = OnceLock::new();

/// Map an OS identifier (as reported by `std::env::consts::OS`) to a tag
pub fn platform_from_os(os: &str) -> Option<PlatformTag> {
    match os {
        "windows" => Some(PlatformTag::Windows),
        "linux" => Some(PlatformTag::Linux),
        "macos" => Some(PlatformTag::Mac),
        _ => None,
    }
}

/// Detect the host platform, computed once per process.
///
/// Hosts other than windows, linux and macOS return `UnsupportedHost`.
pub fn detect_platform() -> Result<PlatformTag, InstallerError> {
    let detected = *HOST_PLATFORM.get_or_init(|| {
        let tag = platform_from_os(std::env::consts::OS);
        info!(
            "Platform detection: os={}, tag={}",
            std::env::consts::OS,
            tag.map(|t| t.to_string()).unwrap_or_else(|| "unknown".into())
        );
        tag
    });
    detected.ok_or_else(|| InstallerError::UnsupportedHost(std::env::consts::OS.to_string()))
}

/// Outcome of resolving a descriptor against a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The descriptor has exactly this spec for the platform
    Spec(&'a AcquisitionSpec),
    /// No entry exists for the platform
    Unsupported(PlatformTag),
}

impl Resolution<'_> {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Spec(_))
    }
}

/// Select the acquisition spec for `platform`
pub fn resolve_spec(descriptor: &ApplicationDescriptor, platform: PlatformTag) -> Resolution<'_> {
    match descriptor.spec_for(platform) {
        Some(spec) => Resolution::Spec(spec),
        None => Resolution::Unsupported(platform),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackageManager;

    #[test]
    fn test_platform_from_os() {
        assert_eq!(platform_from_os("windows"), Some(PlatformTag::Windows));
        assert_eq!(platform_from_os("linux"), Some(PlatformTag::Linux));
        assert_eq!(platform_from_os("macos"), Some(PlatformTag::Mac));
        assert_eq!(platform_from_os("freebsd"), None);
    }

    #[test]
    fn test_detect_platform_is_stable() {
        let first = detect_platform().ok();
        let second = detect_platform().ok();
        assert_eq!(first, second);
        assert_eq!(first, platform_from_os(std::env::consts::OS));
    }

    #[test]
    fn test_resolve_missing_entry_is_unsupported() {
        let descriptor = ApplicationDescriptor::new("Spotify")
            .with(PlatformTag::Linux, AcquisitionSpec::package(PackageManager::Snap, "spotify"));

        assert!(resolve_spec(&descriptor, PlatformTag::Linux).is_supported());
        assert_eq!(
            resolve_spec(&descriptor, PlatformTag::Windows),
            Resolution::Unsupported(PlatformTag::Windows)
        );
    }
}
