// ============================================================================
// ethovid-core/src/motion/intensity.rs
// ============================================================================
//
// FRAME INTENSITY: Per-frame Motion Signal Fusion
//
// Splits the motion analyzer into an opencv-touching half (background
// subtraction, optical flow, frame differencing, behind the
// `FrameIntensityComputer` trait) and a pure-Rust half (combining the three
// signals into one scalar, which is plain arithmetic and fully unit
// testable). The concrete opencv implementation lives in
// `external::opencv_capture`.
//
// AI-ASSISTANT-INFO: Motion intensity fusion (component B, per-frame stage)

use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::motion::frame_source::DecodedFrame;

/// The three raw per-frame signals before fusion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameComponents {
    /// Fraction of foreground-mask pixels set by background subtraction.
    pub bg_ratio: f64,
    /// Mean sparse optical-flow magnitude, normalized and clamped to [0,1].
    pub of_intensity: f64,
    /// Fraction of pixels set by thresholded frame differencing.
    pub fd_ratio: f64,
}

/// Computes the three raw signals for one frame. Implementations are
/// expected to be stateful (background model, previous frame, previous
/// tracked corners) and must be driven with frames in presentation order.
pub trait FrameIntensityComputer {
    fn compute(&mut self, frame: &DecodedFrame) -> CoreResult<FrameComponents>;
}

/// Fuses the three raw signals into the combined motion intensity, clamped to [0,1].
///
/// `combined = bg_weight*bg_ratio + of_weight*of_intensity + fd_weight*fd_ratio`
pub fn combined_intensity(components: FrameComponents, config: &CoreConfig) -> f64 {
    let raw = config.bg_weight * components.bg_ratio
        + config.of_weight * components.of_intensity
        + config.fd_weight * components.fd_ratio;
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> CoreConfig {
        CoreConfig::default()
    }

    #[test]
    fn combined_intensity_is_weighted_sum() {
        let c = FrameComponents {
            bg_ratio: 0.2,
            of_intensity: 0.1,
            fd_ratio: 0.4,
        };
        let expected = 0.5 * 0.2 + 0.3 * 0.1 + 0.2 * 0.4;
        assert!((combined_intensity(c, &cfg()) - expected).abs() < 1e-9);
    }

    #[test]
    fn combined_intensity_clamps_to_unit_interval() {
        let c = FrameComponents {
            bg_ratio: 1.0,
            of_intensity: 1.0,
            fd_ratio: 1.0,
        };
        assert_eq!(combined_intensity(c, &cfg()), 1.0);
    }

    #[test]
    fn zero_signal_is_zero() {
        let c = FrameComponents::default();
        assert_eq!(combined_intensity(c, &cfg()), 0.0);
    }
}
