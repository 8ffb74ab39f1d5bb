//! Path post-processors: trim segments and repeaters.
//!
//! Both are shape-group children that act on sibling geometry rather than
//! producing geometry of their own. The model resolves their numeric state
//! per frame; applying them to actual paths is renderer work.

use glam::{Mat3, Vec2};
use serde::{Deserialize, Serialize};

use crate::animatable::Animatable;
use crate::model::{Group, NodeData, NodeKind};

const EPS: f32 = 1e-5;

fn nearly(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}

/// A resolved trim range in normalized path-length units.
///
/// `start <= end` selects one span of the path. `start > end` encodes a
/// wrapped selection that runs off the end of the path and continues from the
/// beginning, which only an offset can produce.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    pub start: f32,
    pub end: f32,
}

impl Segment {
    pub fn new(start: f32, end: f32) -> Self {
        Segment { start, end }
    }

    pub fn is_wrapped(&self) -> bool {
        self.start > self.end
    }
}

/// Whether a trim applies to each sibling path separately or to all of them
/// as one continuous path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrimMode {
    Simultaneously,
    Individually,
}

/// Trim-path node. Start and end are percentages, offset is degrees of a
/// full revolution.
#[derive(Debug, Clone)]
pub struct Trim {
    pub data: NodeData,
    pub start: Animatable<f32>,
    pub end: Animatable<f32>,
    pub offset: Animatable<f32>,
    pub mode: TrimMode,
}

impl Trim {
    pub fn new() -> Self {
        Trim {
            data: NodeData::new(NodeKind::Trim),
            start: Animatable::Static(0.0),
            end: Animatable::Static(0.0),
            offset: Animatable::Static(0.0),
            mode: TrimMode::Simultaneously,
        }
    }

    pub fn is_static(&self) -> bool {
        self.start.is_static() && self.end.is_static() && self.offset.is_static()
    }

    /// Resolve the selected range at `frame`.
    ///
    /// Degenerate inputs collapse before the offset is applied: a zero-width
    /// range yields the empty segment and a full-width range the whole path,
    /// so an offset can never make a full trim wrap. Otherwise the offset
    /// shifts both ends and the result folds back into [0, 1], wrapping when
    /// the shifted ends straddle a path boundary.
    pub fn segment(&self, frame: f32) -> Segment {
        let start = self.start.value(frame) / 100.0;
        let end = self.end.value(frame) / 100.0;
        let offset = (self.offset.value(frame) % 360.0) / 360.0;

        let diff = (start - end).abs();
        if nearly(diff, 0.0) {
            return Segment::new(0.0, 0.0);
        }
        if nearly(diff, 1.0) {
            return Segment::new(0.0, 1.0);
        }

        let start = start + offset;
        let end = end + offset;
        if offset > 0.0 {
            if start <= 1.0 && end <= 1.0 {
                noloop(start, end)
            } else if start > 1.0 && end > 1.0 {
                noloop(start - 1.0, end - 1.0)
            } else if start > 1.0 {
                wrapped(start - 1.0, end)
            } else {
                wrapped(start, end - 1.0)
            }
        } else if start >= 0.0 && end >= 0.0 {
            noloop(start, end)
        } else if start < 0.0 && end < 0.0 {
            noloop(1.0 + start, 1.0 + end)
        } else if start < 0.0 {
            wrapped(1.0 + start, end)
        } else {
            wrapped(start, 1.0 + end)
        }
    }
}

impl Default for Trim {
    fn default() -> Self {
        Trim::new()
    }
}

fn noloop(a: f32, b: f32) -> Segment {
    debug_assert!(a >= 0.0 && b >= 0.0);
    Segment::new(a.min(b), a.max(b))
}

fn wrapped(a: f32, b: f32) -> Segment {
    debug_assert!(a >= 0.0 && b >= 0.0);
    Segment::new(a.max(b), a.min(b))
}

/// Per-copy transform of a repeater. The copy index scales position and
/// rotation linearly and exponentiates scale, so copy `i` is the base
/// transform applied `i` times.
#[derive(Debug, Clone)]
pub struct RepeaterTransform {
    pub rotation: Animatable<f32>,
    pub scale: Animatable<Vec2>,
    pub position: Animatable<Vec2>,
    pub anchor: Animatable<Vec2>,
    pub start_opacity: Animatable<f32>,
    pub end_opacity: Animatable<f32>,
}

impl Default for RepeaterTransform {
    fn default() -> Self {
        RepeaterTransform {
            rotation: Animatable::Static(0.0),
            scale: Animatable::Static(Vec2::new(100.0, 100.0)),
            position: Animatable::Static(Vec2::ZERO),
            anchor: Animatable::Static(Vec2::ZERO),
            start_opacity: Animatable::Static(100.0),
            end_opacity: Animatable::Static(100.0),
        }
    }
}

impl RepeaterTransform {
    pub fn is_static(&self) -> bool {
        self.rotation.is_static()
            && self.scale.is_static()
            && self.position.is_static()
            && self.anchor.is_static()
            && self.start_opacity.is_static()
            && self.end_opacity.is_static()
    }

    pub fn start_opacity(&self, frame: f32) -> f32 {
        self.start_opacity.value(frame) / 100.0
    }

    pub fn end_opacity(&self, frame: f32) -> f32 {
        self.end_opacity.value(frame) / 100.0
    }

    /// Opacity of copy `index` out of `copies`, blending from start to end
    /// opacity across the copy range.
    pub fn instance_opacity(&self, frame: f32, index: f32, copies: f32) -> f32 {
        let start = self.start_opacity(frame);
        let end = self.end_opacity(frame);
        if copies <= 1.0 {
            return start;
        }
        let t = index / (copies - 1.0);
        start + (end - start) * t
    }

    /// Matrix for copy index `multiplier` at `frame`.
    pub fn matrix(&self, frame: f32, multiplier: f32) -> Mat3 {
        let anchor = self.anchor.value(frame);
        let scale = self.scale.value(frame) / 100.0;
        let scale = Vec2::new(scale.x.powf(multiplier), scale.y.powf(multiplier));
        let rotation = self.rotation.value(frame) * multiplier;

        // Same clockwise-rotation negation as layer transforms.
        Mat3::from_translation(self.position.value(frame) * multiplier)
            * Mat3::from_translation(anchor)
            * Mat3::from_scale(scale)
            * Mat3::from_rotation_z(-rotation.to_radians())
            * Mat3::from_translation(-anchor)
    }
}

/// Repeater node: duplicates its content group `copies` times, each copy
/// offset by one more application of the per-copy transform.
#[derive(Debug, Clone)]
pub struct Repeater {
    pub data: NodeData,
    pub content: Box<Group>,
    pub transform: RepeaterTransform,
    pub copies: Animatable<f32>,
    pub offset: Animatable<f32>,
    max_copies: f32,
}

impl Repeater {
    pub fn new(content: Group) -> Self {
        Repeater {
            data: NodeData::new(NodeKind::Repeater),
            content: Box::new(content),
            transform: RepeaterTransform::default(),
            copies: Animatable::Static(0.0),
            offset: Animatable::Static(0.0),
            max_copies: 0.0,
        }
    }

    pub fn copies(&self, frame: f32) -> f32 {
        self.copies.value(frame)
    }

    pub fn offset(&self, frame: f32) -> f32 {
        self.offset.value(frame)
    }

    /// Largest copy count the track can ever produce; valid after
    /// [`resolve_max_copies`](Self::resolve_max_copies) has run.
    pub fn max_copies(&self) -> usize {
        self.max_copies as usize
    }

    /// Precompute the copy-count ceiling from the track's keyframe values so
    /// renderers can allocate content slots once.
    pub fn resolve_max_copies(&mut self) {
        self.max_copies = match &self.copies {
            Animatable::Static(v) => *v,
            Animatable::Animated(track) => track
                .keyframes()
                .iter()
                .flat_map(|kf| [kf.start_value, kf.end_value])
                .fold(0.0, f32::max),
        };
    }
}
