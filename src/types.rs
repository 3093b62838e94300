//! Type-safe enums shared across the installer
//!
//! Platform tags, package managers and event severities are proper Rust enums
//! so matching stays exhaustive and string parsing happens in one place.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Host platform an acquisition entry applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlatformTag {
    Windows,
    Linux,
    Mac,
}

impl PlatformTag {
    /// Human-readable platform name for headers and summaries
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::Mac => "macOS",
        }
    }

    /// File extension used when the URL does not reveal one
    pub const fn default_extension(self) -> &'static str {
        match self {
            Self::Windows => "exe",
            Self::Linux => "deb",
            Self::Mac => "dmg",
        }
    }
}

/// System package manager referenced by a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PackageManager {
    Apt,
    Snap,
    Brew,
    Winget,
}

impl PackageManager {
    /// Manager that a bare `package:` prefix maps to under the given platform key
    pub const fn native_for(platform: PlatformTag) -> Self {
        match platform {
            PlatformTag::Windows => Self::Winget,
            PlatformTag::Linux => Self::Apt,
            PlatformTag::Mac => Self::Brew,
        }
    }

    /// Executable that has to be on `PATH` for the instruction to work
    pub const fn program(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Snap => "snap",
            Self::Brew => "brew",
            Self::Winget => "winget",
        }
    }

    /// Whether the install command needs root
    pub const fn requires_elevation(self) -> bool {
        matches!(self, Self::Apt | Self::Snap)
    }

    /// Exact command line the user should run to install `package`
    pub fn install_command(self, package: &str) -> String {
        match self {
            Self::Apt => format!("sudo apt-get install -y {}", package),
            Self::Snap => format!("sudo snap install {}", package),
            Self::Brew => format!("brew install {}", package),
            Self::Winget => format!("winget install --exact --id {}", package),
        }
    }
}

/// Severity of a status event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}
