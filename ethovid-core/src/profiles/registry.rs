// ============================================================================
// ethovid-core/src/profiles/registry.rs
// ============================================================================
//
// PROFILE REGISTRY: Named Activity Profiles (component C)
//
// Three built-in profiles are constructed once via `once_cell::sync::Lazy`
// and are immutable; user-defined profiles may be added to a registry
// instance behind a write lock, with reads staying lock-free against the
// built-ins. Exact CRF/FPS/preset/profile-tag/ratio values are grounded on
// `compression_profiles.py`'s `COMPRESSION_PROFILES` table.
//
// AI-ASSISTANT-INFO: Profile registry (component C)

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::error::{CoreError, CoreResult};
use crate::profiles::types::{
    ActivityProfile, EncoderPreset, EncoderProfileTag, EncoderSettings, ProfileEstimate,
};

fn settings(
    crf: u8,
    fps: u8,
    preset: EncoderPreset,
    profile: EncoderProfileTag,
) -> EncoderSettings {
    EncoderSettings {
        crf,
        fps,
        preset,
        profile,
        bitrate_factor: 1.0,
    }
}

fn conservative_profile() -> ActivityProfile {
    use EncoderPreset::*;
    use EncoderProfileTag::*;
    ActivityProfile {
        name: "conservative".to_string(),
        description: "Preserves near-original fidelity; largest output, smallest risk of visible quality loss.".to_string(),
        nominal_ratio: 0.45,
        high: settings(18, 30, Slow, High),
        medium: settings(20, 25, Slow, High),
        low: settings(23, 20, Medium, Main),
        inactive: settings(25, 15, Medium, Main),
    }
}

fn balanced_profile() -> ActivityProfile {
    use EncoderPreset::*;
    use EncoderProfileTag::*;
    ActivityProfile {
        name: "balanced".to_string(),
        description: "Default tradeoff between fidelity during activity and aggressive shrinkage during inactivity.".to_string(),
        nominal_ratio: 0.35,
        high: settings(21, 25, Medium, High),
        medium: settings(24, 20, Medium, Main),
        low: settings(27, 15, Fast, Main),
        inactive: settings(28, 10, Fast, Baseline),
    }
}

fn aggressive_profile() -> ActivityProfile {
    use EncoderPreset::*;
    use EncoderProfileTag::*;
    ActivityProfile {
        name: "aggressive".to_string(),
        description: "Smallest output; favors speed and size over fidelity, even during activity.".to_string(),
        nominal_ratio: 0.20,
        high: settings(23, 20, Fast, Main),
        medium: settings(26, 15, Fast, Main),
        low: settings(30, 10, Fast, Baseline),
        inactive: settings(32, 5, Ultrafast, Baseline),
    }
}

static BUILTIN_PROFILES: Lazy<HashMap<String, ActivityProfile>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for profile in [conservative_profile(), balanced_profile(), aggressive_profile()] {
        profile.validate().expect("built-in profile must validate");
        map.insert(profile.name.clone(), profile);
    }
    map
});

/// Per-profile-family speed factor used to estimate processing time.
fn speed_factor(name: &str) -> f64 {
    match name {
        "conservative" => 0.3,
        "balanced" => 0.5,
        "aggressive" => 0.8,
        _ => 0.5,
    }
}

/// Holds the built-in profiles (immutable) plus any user-registered custom
/// profiles (behind a write lock; built-ins never take the lock for reads).
pub struct ProfileRegistry {
    custom: RwLock<HashMap<String, ActivityProfile>>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self {
            custom: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> CoreResult<ActivityProfile> {
        if let Some(p) = BUILTIN_PROFILES.get(name) {
            return Ok(p.clone());
        }
        let custom = self.custom.read().expect("profile registry lock poisoned");
        custom
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::UnknownProfile(name.to_string()))
    }

    pub fn settings_for(
        &self,
        profile: &ActivityProfile,
        level: crate::motion::types::ActivityLevel,
    ) -> EncoderSettings {
        profile.settings_for(level)
    }

    /// Registers a custom profile after validating its invariants. Built-in
    /// names are reserved and cannot be overridden.
    pub fn add_custom(&self, profile: ActivityProfile) -> CoreResult<()> {
        if BUILTIN_PROFILES.contains_key(&profile.name) {
            return Err(CoreError::InvalidSettings(format!(
                "'{}' is a built-in profile name and cannot be overridden",
                profile.name
            )));
        }
        profile.validate()?;
        let mut custom = self.custom.write().expect("profile registry lock poisoned");
        custom.insert(profile.name.clone(), profile);
        Ok(())
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN_PROFILES.keys().cloned().collect();
        let custom = self.custom.read().expect("profile registry lock poisoned");
        names.extend(custom.keys().cloned());
        names.sort();
        names
    }

    /// Estimated output size/processing time/rationale for every built-in
    /// profile, given an input's duration, size, and activity ratio.
    pub fn recommend(
        &self,
        duration_secs: f64,
        size_mb: f64,
        activity_ratio: f64,
    ) -> HashMap<String, ProfileEstimate> {
        let mut estimates = HashMap::new();
        for profile in BUILTIN_PROFILES.values() {
            let estimated_size_mb = size_mb * profile.nominal_ratio;
            let estimated_processing_minutes =
                (duration_secs / 60.0) / speed_factor(&profile.name);
            let rationale = recommendation_reason(&profile.name, activity_ratio, size_mb);
            estimates.insert(
                profile.name.clone(),
                ProfileEstimate {
                    profile_name: profile.name.clone(),
                    estimated_size_mb,
                    estimated_processing_minutes,
                    rationale,
                },
            );
        }
        estimates
    }
}

fn recommendation_reason(name: &str, activity_ratio: f64, size_mb: f64) -> String {
    let favored = if activity_ratio > 0.7 {
        "conservative"
    } else if activity_ratio < 0.3 {
        "aggressive"
    } else {
        "balanced"
    };

    let size_note = if size_mb > 1000.0 {
        " Large input favors more aggressive compression to control output size."
    } else if size_mb < 100.0 {
        " Small input can afford to relax toward conservative settings."
    } else {
        ""
    };

    if name == favored {
        format!(
            "Recommended: activity ratio {:.2} favors '{}'.{}",
            activity_ratio, favored, size_note
        )
    } else {
        format!(
            "Alternative: activity ratio {:.2} more directly favors '{}'.{}",
            activity_ratio, favored, size_note
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::types::ActivityLevel;

    #[test]
    fn built_in_profiles_have_non_decreasing_crf() {
        for name in ["conservative", "balanced", "aggressive"] {
            let registry = ProfileRegistry::new();
            let profile = registry.get(name).unwrap();
            assert!(profile.validate().is_ok());
        }
    }

    #[test]
    fn unknown_profile_lookup_fails() {
        let registry = ProfileRegistry::new();
        let err = registry.get("nonexistent").unwrap_err();
        assert!(matches!(err, CoreError::UnknownProfile(_)));
    }

    #[test]
    fn settings_for_is_a_pure_lookup() {
        let registry = ProfileRegistry::new();
        let profile = registry.get("balanced").unwrap();
        let a = registry.settings_for(&profile, ActivityLevel::High);
        let b = registry.settings_for(&profile, ActivityLevel::High);
        assert_eq!(a, b);
    }

    #[test]
    fn cannot_override_builtin_name() {
        let registry = ProfileRegistry::new();
        let mut custom = conservative_profile();
        custom.name = "conservative".to_string();
        assert!(registry.add_custom(custom).is_err());
    }

    #[test]
    fn add_custom_rejects_decreasing_crf() {
        let registry = ProfileRegistry::new();
        let mut custom = balanced_profile();
        custom.name = "broken".to_string();
        custom.inactive.crf = 0; // violates non-decreasing invariant
        assert!(registry.add_custom(custom).is_err());
    }

    #[test]
    fn roi_adjustment_lowers_crf_and_raises_bitrate_factor() {
        let registry = ProfileRegistry::new();
        let profile = registry.get("balanced").unwrap();
        let base = registry.settings_for(&profile, ActivityLevel::High);
        let adjusted = base.roi_adjusted();
        assert_eq!(adjusted.crf, base.crf.saturating_sub(3));
        assert!((adjusted.bitrate_factor - base.bitrate_factor * 1.2).abs() < 1e-9);
        assert_eq!(adjusted.fps, base.fps);
        assert_eq!(adjusted.preset, base.preset);
        assert_eq!(adjusted.profile, base.profile);
    }

    #[test]
    fn recommend_returns_estimate_per_builtin() {
        let registry = ProfileRegistry::new();
        let estimates = registry.recommend(600.0, 500.0, 0.8);
        assert_eq!(estimates.len(), 3);
        assert!(estimates.contains_key("conservative"));
    }
}
