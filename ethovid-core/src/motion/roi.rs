// ============================================================================
// ethovid-core/src/motion/roi.rs
// ============================================================================
//
// REGION OF INTEREST: Foreground Bounding Box Extraction
//
// Used by the adaptive compressor's ROI mode. Given a frame, extract
// contours of the current background model's foreground mask, keep the
// largest-area contour above a minimum size, and expand its bounding box by
// a fixed padding (clamped to the frame). Grounded on
// `motion_detector.py`'s `get_roi_around_mouse`.
//
// AI-ASSISTANT-INFO: Region-of-interest extraction (component B)

use crate::error::CoreResult;
use crate::motion::frame_source::DecodedFrame;

pub const ROI_PADDING_PX: i32 = 50;
pub const ROI_MIN_CONTOUR_AREA: f64 = 100.0;
pub const ROI_MIN_DIM: i32 = 20;

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// opencv-touching half: locates the largest foreground contour in a frame.
/// Returns the raw (unpadded) bounding box, if any contour clears the
/// minimum area.
pub trait RoiExtractor {
    fn largest_foreground_bbox(&mut self, frame: &DecodedFrame) -> CoreResult<Option<Rect>>;
}

/// Pure helper: expands `bbox` by `padding` on every side, clamps it to the
/// frame bounds, and rejects it if either resulting dimension is not
/// strictly greater than `ROI_MIN_DIM`.
pub fn pad_and_clamp(bbox: Rect, padding: i32, frame_w: i32, frame_h: i32) -> Option<Rect> {
    let x0 = (bbox.x - padding).max(0);
    let y0 = (bbox.y - padding).max(0);
    let x1 = (bbox.x + bbox.w + padding).min(frame_w);
    let y1 = (bbox.y + bbox.h + padding).min(frame_h);

    let w = x1 - x0;
    let h = y1 - y0;
    if w > ROI_MIN_DIM && h > ROI_MIN_DIM {
        Some(Rect { x: x0, y: y0, w, h })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_and_clamps_within_frame() {
        let bbox = Rect { x: 10, y: 10, w: 30, h: 30 };
        let r = pad_and_clamp(bbox, ROI_PADDING_PX, 320, 240).unwrap();
        assert_eq!(r.x, 0);
        assert_eq!(r.y, 0);
        assert_eq!(r.w, 10 + 30 + 50);
        assert_eq!(r.h, 10 + 30 + 50);
    }

    #[test]
    fn rejects_too_small_box() {
        let bbox = Rect { x: 100, y: 100, w: 5, h: 5 };
        // Padding still applies; with negative padding this would be tiny, but
        // we use 0 padding here to exercise the dimension floor directly.
        let r = pad_and_clamp(bbox, 0, 320, 240);
        assert!(r.is_none());
    }

    #[test]
    fn clamps_against_far_edge() {
        let bbox = Rect { x: 300, y: 220, w: 15, h: 15 };
        let r = pad_and_clamp(bbox, ROI_PADDING_PX, 320, 240).unwrap();
        assert_eq!(r.x + r.w, 320);
        assert_eq!(r.y + r.h, 240);
    }
}
