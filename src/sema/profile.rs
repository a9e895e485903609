// src/sema/profile.rs
//
// Language profiles and feature gating.
//
// Profiles are totally ordered tiers; each maps to a fixed feature
// bitset that is a superset of every lower tier. Dispatch is a static
// table lookup keyed by the profile tag, never computed at runtime.

/// Ordered language profile tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Profile {
    Core = 0,
    Service = 1,
    Cluster = 2,
    Sovereign = 3,
}

impl Profile {
    pub const ALL: [Profile; 4] = [
        Profile::Core,
        Profile::Service,
        Profile::Cluster,
        Profile::Sovereign,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Service => "service",
            Self::Cluster => "cluster",
            Self::Sovereign => "sovereign",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Gateable language features, one bit each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Feature {
    Functions = 0,
    Structs = 1,
    Arrays = 2,
    Pointers = 3,
    ErrorHandling = 4,
    Services = 5,
    Concurrency = 6,
    Clustering = 7,
    RemoteCalls = 8,
    Capabilities = 9,
    HotReload = 10,
}

impl Feature {
    pub const ALL: [Feature; 11] = [
        Feature::Functions,
        Feature::Structs,
        Feature::Arrays,
        Feature::Pointers,
        Feature::ErrorHandling,
        Feature::Services,
        Feature::Concurrency,
        Feature::Clustering,
        Feature::RemoteCalls,
        Feature::Capabilities,
        Feature::HotReload,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Functions => "functions",
            Self::Structs => "structs",
            Self::Arrays => "arrays",
            Self::Pointers => "pointers",
            Self::ErrorHandling => "error handling",
            Self::Services => "services",
            Self::Concurrency => "concurrency",
            Self::Clustering => "clustering",
            Self::RemoteCalls => "remote calls",
            Self::Capabilities => "capabilities",
            Self::HotReload => "hot reload",
        }
    }

    #[inline]
    const fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const CORE_FEATURES: u16 = Feature::Functions.bit()
    | Feature::Structs.bit()
    | Feature::Arrays.bit()
    | Feature::Pointers.bit();

const SERVICE_FEATURES: u16 = CORE_FEATURES
    | Feature::ErrorHandling.bit()
    | Feature::Services.bit()
    | Feature::Concurrency.bit();

const CLUSTER_FEATURES: u16 =
    SERVICE_FEATURES | Feature::Clustering.bit() | Feature::RemoteCalls.bit();

const SOVEREIGN_FEATURES: u16 =
    CLUSTER_FEATURES | Feature::Capabilities.bit() | Feature::HotReload.bit();

/// Profile -> feature bitset, indexed by the profile tag
static FEATURE_TABLE: [u16; 4] = [
    CORE_FEATURES,
    SERVICE_FEATURES,
    CLUSTER_FEATURES,
    SOVEREIGN_FEATURES,
];

/// Static table lookup; every feature granted at P is granted above P
#[inline]
pub fn has_feature(profile: Profile, feature: Feature) -> bool {
    FEATURE_TABLE[profile as usize] & feature.bit() != 0
}

/// The lowest profile that grants a feature. Every feature is granted
/// by the top profile, so this is total.
pub fn lowest_profile_with(feature: Feature) -> Profile {
    for profile in Profile::ALL {
        if has_feature(profile, feature) {
            return profile;
        }
    }
    Profile::Sovereign
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_are_totally_ordered() {
        assert!(Profile::Core < Profile::Service);
        assert!(Profile::Service < Profile::Cluster);
        assert!(Profile::Cluster < Profile::Sovereign);
    }

    #[test]
    fn error_handling_starts_at_service() {
        assert!(!has_feature(Profile::Core, Feature::ErrorHandling));
        assert!(has_feature(Profile::Service, Feature::ErrorHandling));
        assert!(has_feature(Profile::Cluster, Feature::ErrorHandling));
    }

    #[test]
    fn every_tier_is_a_superset_of_the_one_below() {
        for pair in FEATURE_TABLE.windows(2) {
            assert_eq!(pair[0] & pair[1], pair[0]);
        }
    }

    #[test]
    fn top_profile_grants_everything() {
        for feature in Feature::ALL {
            assert!(has_feature(Profile::Sovereign, feature));
        }
    }

    #[test]
    fn monotone_across_profiles() {
        for feature in Feature::ALL {
            let mut granted = false;
            for profile in Profile::ALL {
                let now = has_feature(profile, feature);
                assert!(!granted || now, "feature lost at a higher profile");
                granted = now;
            }
            assert!(granted);
        }
    }

    #[test]
    fn lowest_granting_profile() {
        assert_eq!(lowest_profile_with(Feature::Functions), Profile::Core);
        assert_eq!(lowest_profile_with(Feature::ErrorHandling), Profile::Service);
        assert_eq!(lowest_profile_with(Feature::Clustering), Profile::Cluster);
        assert_eq!(lowest_profile_with(Feature::Capabilities), Profile::Sovereign);
    }
}
