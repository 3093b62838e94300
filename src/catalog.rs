//! Application catalog
//!
//! Maps application display names to per-platform acquisition specs. The
//! catalog is data: the built-in set ships as `catalog/default.json` and any
//! mapping document can be merged over it at startup to add or override
//! entries without touching orchestration code.
//!
//! # Mapping document
//!
//! ```json
//! {
//!   "7-Zip": {
//!     "windows": "https://www.7-zip.org/a/7z2408-x64.exe",
//!     "linux": "package:p7zip-full",
//!     "mac": "brew:p7zip"
//!   }
//! }
//! ```
//!
//! Values carrying a `package:`, `apt:`, `snap:`, `brew:` or `winget:` prefix
//! become `AcquisitionSpec::PackageReference`; everything else must be an
//! http(s) URL and becomes `AcquisitionSpec::DirectDownload`. Prefixes are
//! parsed once here so nothing downstream inspects strings again.

use crate::error::{CatalogError, FailureReason};
use crate::types::{PackageManager, PlatformTag};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const BUILTIN_CATALOG: &str = include_str!("../catalog/default.json");

/// How to acquire an application on one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionSpec {
    /// Fetch an installer over HTTP(S) and launch or open it
    DirectDownload { url: String },
    /// Surface a package-manager command for the user to run
    PackageReference {
        manager: PackageManager,
        package: String,
    },
}

impl AcquisitionSpec {
    pub fn direct(url: impl Into<String>) -> Self {
        Self::DirectDownload { url: url.into() }
    }

    pub fn package(manager: PackageManager, package: impl Into<String>) -> Self {
        Self::PackageReference {
            manager,
            package: package.into(),
        }
    }

    /// Parse a mapping-document value found under `platform`.
    ///
    /// A bare `package:` prefix resolves to the platform's native manager.
    pub fn parse(platform: PlatformTag, value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("value is empty".to_string());
        }

        if let Some((prefix, rest)) = value.split_once(':') {
            let manager = match prefix {
                "package" => Some(PackageManager::native_for(platform)),
                other => other.parse::<PackageManager>().ok(),
            };
            if let Some(manager) = manager {
                let package = rest.trim();
                if package.is_empty() || package.contains(char::is_whitespace) {
                    return Err(format!("invalid package name in '{}'", value));
                }
                return Ok(Self::package(manager, package));
            }
        }

        let url = reqwest::Url::parse(value).map_err(|e| format!("invalid URL '{}': {}", value, e))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::direct(value)),
            scheme => Err(format!("unsupported URL scheme '{}' in '{}'", scheme, value)),
        }
    }

    /// Render back to the mapping-document form used under `platform`.
    pub fn to_mapping_value(&self, platform: PlatformTag) -> String {
        match self {
            Self::DirectDownload { url } => url.clone(),
            Self::PackageReference { manager, package } => {
                let prefix = if *manager == PackageManager::native_for(platform)
                    && *manager != PackageManager::Brew
                {
                    "package".to_string()
                } else {
                    manager.to_string()
                };
                format!("{}:{}", prefix, package)
            }
        }
    }
}

/// Per-application record: one optional spec per platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDescriptor {
    name: String,
    specs: BTreeMap<PlatformTag, AcquisitionSpec>,
}

impl ApplicationDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specs: BTreeMap::new(),
        }
    }

    /// Builder-style setter; a later call for the same platform replaces the earlier spec
    pub fn with(mut self, platform: PlatformTag, spec: AcquisitionSpec) -> Self {
        self.specs.insert(platform, spec);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec_for(&self, platform: PlatformTag) -> Option<&AcquisitionSpec> {
        self.specs.get(&platform)
    }

    pub fn supports(&self, platform: PlatformTag) -> bool {
        self.specs.contains_key(&platform)
    }

    /// Platforms this application has an entry for, in tag order
    pub fn platforms(&self) -> impl Iterator<Item = PlatformTag> + '_ {
        self.specs.keys().copied()
    }
}

/// Raw mapping document shape
type MappingDocument = BTreeMap<String, BTreeMap<String, String>>;

/// Name-keyed collection of application descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, ApplicationDescriptor>,
}

impl Catalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog shipped with the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Parse a JSON mapping document
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let document: MappingDocument = serde_json::from_str(json)?;
        let mut catalog = Self::new();

        for (name, platforms) in document {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::EmptyName);
            }

            let mut descriptor = ApplicationDescriptor::new(name.clone());
            for (key, value) in platforms {
                let platform: PlatformTag =
                    key.parse().map_err(|_| CatalogError::UnknownPlatform {
                        app: name.clone(),
                        key: key.clone(),
                    })?;
                let spec = AcquisitionSpec::parse(platform, &value).map_err(|message| {
                    CatalogError::InvalidSpec {
                        app: name.clone(),
                        platform,
                        message,
                    }
                })?;
                descriptor = descriptor.with(platform, spec);
            }
            catalog.register(descriptor);
        }

        debug!("Parsed catalog with {} application(s)", catalog.len());
        Ok(catalog)
    }

    /// Load a JSON mapping document from disk
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Serialize to a pretty-printed mapping document
    pub fn to_json_string(&self) -> Result<String, CatalogError> {
        let document: MappingDocument = self
            .entries
            .values()
            .map(|descriptor| {
                let platforms = descriptor
                    .specs
                    .iter()
                    .map(|(platform, spec)| {
                        (platform.to_string(), spec.to_mapping_value(*platform))
                    })
                    .collect();
                (descriptor.name.clone(), platforms)
            })
            .collect();
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Write the mapping document to disk
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        use anyhow::Context;

        let json = self.to_json_string()?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write catalog to {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Add or replace an application; returns the replaced descriptor
    pub fn register(&mut self, descriptor: ApplicationDescriptor) -> Option<ApplicationDescriptor> {
        self.entries.insert(descriptor.name.clone(), descriptor)
    }

    /// Merge `other` over this catalog, whole descriptors win
    pub fn merge(&mut self, other: Catalog) {
        for (_, descriptor) in other.entries {
            if let Some(previous) = self.register(descriptor) {
                debug!("Catalog entry '{}' overridden", previous.name);
            }
        }
    }

    /// Exact-name lookup
    pub fn lookup(&self, name: &str) -> Result<&ApplicationDescriptor, FailureReason> {
        self.entries
            .get(name)
            .ok_or_else(|| FailureReason::not_found(name))
    }

    /// Resolve a user-typed name to its catalog spelling (case-insensitive)
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.entries.get_key_value(name) {
            return Some(key.as_str());
        }
        self.entries
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name.trim()))
            .map(String::as_str)
    }

    /// Application names in display (sorted) order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApplicationDescriptor> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
