// ============================================================================
// ethovid-core/src/profiles/types.rs
// ============================================================================
//
// PROFILE DATA MODEL: Encoder Settings and Activity Profiles
//
// AI-ASSISTANT-INFO: Data model for the profile registry (component C)

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::motion::types::ActivityLevel;

/// One of the nine ffmpeg libx264 speed tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPreset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl EncoderPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncoderPreset::Ultrafast => "ultrafast",
            EncoderPreset::Superfast => "superfast",
            EncoderPreset::Veryfast => "veryfast",
            EncoderPreset::Faster => "faster",
            EncoderPreset::Fast => "fast",
            EncoderPreset::Medium => "medium",
            EncoderPreset::Slow => "slow",
            EncoderPreset::Slower => "slower",
            EncoderPreset::Veryslow => "veryslow",
        }
    }
}

/// H.264 encoding profile tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderProfileTag {
    Baseline,
    Main,
    High,
}

impl EncoderProfileTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncoderProfileTag::Baseline => "baseline",
            EncoderProfileTag::Main => "main",
            EncoderProfileTag::High => "high",
        }
    }
}

/// Fixed-shape encoder parameters for one activity level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub crf: u8,
    pub fps: u8,
    pub preset: EncoderPreset,
    pub profile: EncoderProfileTag,
    pub bitrate_factor: f64,
}

impl EncoderSettings {
    pub fn new(
        crf: u8,
        fps: u8,
        preset: EncoderPreset,
        profile: EncoderProfileTag,
        bitrate_factor: f64,
    ) -> CoreResult<Self> {
        let settings = Self {
            crf,
            fps,
            preset,
            profile,
            bitrate_factor,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// CRF in [0,51], FPS in [1,60].
    pub fn validate(&self) -> CoreResult<()> {
        if self.crf > 51 {
            return Err(CoreError::InvalidSettings(format!(
                "CRF {} out of range [0,51]",
                self.crf
            )));
        }
        if self.fps == 0 || self.fps > 60 {
            return Err(CoreError::InvalidSettings(format!(
                "FPS {} out of range [1,60]",
                self.fps
            )));
        }
        Ok(())
    }

    /// Returns adjusted settings for ROI mode: CRF decreased by 3 (floor 0),
    /// bitrate factor multiplied by 1.2. FPS/preset/profile unchanged.
    pub fn roi_adjusted(&self) -> Self {
        Self {
            crf: self.crf.saturating_sub(3),
            bitrate_factor: self.bitrate_factor * 1.2,
            ..*self
        }
    }
}

/// Named 4-tuple of encoder settings, one per activity level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityProfile {
    pub name: String,
    pub description: String,
    pub nominal_ratio: f64,
    pub high: EncoderSettings,
    pub medium: EncoderSettings,
    pub low: EncoderSettings,
    pub inactive: EncoderSettings,
}

impl ActivityProfile {
    pub fn settings_for(&self, level: ActivityLevel) -> EncoderSettings {
        match level {
            ActivityLevel::High => self.high,
            ActivityLevel::Medium => self.medium,
            ActivityLevel::Low => self.low,
            ActivityLevel::Inactive => self.inactive,
        }
    }

    /// CRF must be non-decreasing across (high, medium, low, inactive):
    /// quality must not improve as activity drops.
    pub fn validate(&self) -> CoreResult<()> {
        self.high.validate()?;
        self.medium.validate()?;
        self.low.validate()?;
        self.inactive.validate()?;

        if !(self.high.crf <= self.medium.crf
            && self.medium.crf <= self.low.crf
            && self.low.crf <= self.inactive.crf)
        {
            return Err(CoreError::InvalidSettings(format!(
                "profile '{}': CRF must be non-decreasing across (high, medium, low, inactive), got ({}, {}, {}, {})",
                self.name, self.high.crf, self.medium.crf, self.low.crf, self.inactive.crf
            )));
        }
        Ok(())
    }
}

/// Estimate produced by `ProfileRegistry::recommend`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEstimate {
    pub profile_name: String,
    pub estimated_size_mb: f64,
    pub estimated_processing_minutes: f64,
    pub rationale: String,
}
