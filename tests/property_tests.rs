//! Property-based tests
//!
//! These tests verify:
//! - Enum string round-trips (parse → to_string → parse)
//! - Catalog documents survive serialize → parse unchanged
//! - Platform resolution is total and agrees with `supports`
//! - Request snapshots keep order and drop duplicates

use appinstaller::{
    AcquisitionSpec, ApplicationDescriptor, Catalog, InstallationRequest, PackageManager,
    PlatformTag, Resolution, resolve_spec,
};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Strategies
// =============================================================================

fn platform_strategy() -> impl Strategy<Value = PlatformTag> {
    prop_oneof![
        Just(PlatformTag::Windows),
        Just(PlatformTag::Linux),
        Just(PlatformTag::Mac),
    ]
}

fn manager_strategy() -> impl Strategy<Value = PackageManager> {
    prop_oneof![
        Just(PackageManager::Apt),
        Just(PackageManager::Snap),
        Just(PackageManager::Brew),
        Just(PackageManager::Winget),
    ]
}

fn spec_strategy() -> impl Strategy<Value = AcquisitionSpec> {
    prop_oneof![
        "[a-z0-9]{1,12}".prop_map(|file| AcquisitionSpec::direct(format!(
            "https://downloads.example.com/{}.exe",
            file
        ))),
        (manager_strategy(), "[a-z][a-z0-9.+@-]{0,15}")
            .prop_map(|(manager, package)| AcquisitionSpec::package(manager, package)),
    ]
}

fn descriptor_strategy() -> impl Strategy<Value = ApplicationDescriptor> {
    (
        "[A-Z][A-Za-z0-9-]{0,15}",
        proptest::collection::btree_map(platform_strategy(), spec_strategy(), 0..=3),
    )
        .prop_map(|(name, specs)| {
            specs
                .into_iter()
                .fold(ApplicationDescriptor::new(name), |d, (platform, spec)| {
                    d.with(platform, spec)
                })
        })
}

fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    proptest::collection::vec(descriptor_strategy(), 0..8).prop_map(|descriptors| {
        let mut catalog = Catalog::new();
        for descriptor in descriptors {
            catalog.register(descriptor);
        }
        catalog
    })
}

// =============================================================================
// Enum Property Tests
// =============================================================================

proptest! {
    /// PlatformTag: to_string → parse round-trip is identity
    #[test]
    fn platform_roundtrip(platform in platform_strategy()) {
        let parsed: PlatformTag = platform.to_string().parse().expect("Should parse");
        prop_assert_eq!(platform, parsed);
    }

    /// PackageManager: Display output is the lowercase prefix it parses from
    #[test]
    fn manager_roundtrip(manager in manager_strategy()) {
        let s = manager.to_string();
        prop_assert_eq!(s.clone(), s.to_lowercase());
        let parsed: PackageManager = s.parse().expect("Should parse");
        prop_assert_eq!(manager, parsed);
    }
}

// =============================================================================
// Catalog Property Tests
// =============================================================================

proptest! {
    /// A serialized catalog parses back to the same catalog
    #[test]
    fn catalog_document_roundtrip(catalog in catalog_strategy()) {
        let json = catalog.to_json_string().expect("Should serialize");
        let parsed = Catalog::from_json_str(&json).expect("Should parse");
        prop_assert_eq!(catalog, parsed);
    }

    /// Every spec renders to a value that parses back under the same platform
    #[test]
    fn spec_mapping_value_roundtrip(platform in platform_strategy(), spec in spec_strategy()) {
        let value = spec.to_mapping_value(platform);
        let parsed = AcquisitionSpec::parse(platform, &value).expect("Should parse");
        prop_assert_eq!(spec, parsed);
    }

    /// Resolution always answers, and answers `Spec` exactly when supported
    #[test]
    fn resolution_is_total(descriptor in descriptor_strategy(), platform in platform_strategy()) {
        match resolve_spec(&descriptor, platform) {
            Resolution::Spec(spec) => {
                prop_assert!(descriptor.supports(platform));
                prop_assert_eq!(Some(spec), descriptor.spec_for(platform));
            }
            Resolution::Unsupported(reported) => {
                prop_assert!(!descriptor.supports(platform));
                prop_assert_eq!(reported, platform);
            }
        }
    }
}

// =============================================================================
// Request Property Tests
// =============================================================================

proptest! {
    /// Snapshots contain each trimmed name once, in first-seen order
    #[test]
    fn request_dedupes_preserving_order(names in proptest::collection::vec("[ ]?[A-C]{1,2}[ ]?", 0..20)) {
        let request = InstallationRequest::new(&names);

        let mut seen = HashSet::new();
        let expected: Vec<String> = names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect();
        prop_assert_eq!(request.apps(), expected.as_slice());
    }
}
