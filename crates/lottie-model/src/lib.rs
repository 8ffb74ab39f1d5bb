//! In-memory scene graph and per-frame evaluation engine for Lottie-style
//! vector animations.
//!
//! A loader builds a [`Composition`] tree once; a renderer then walks the tree
//! for every displayed frame and asks each property for its value at that
//! frame. Evaluation is a pure read: after the one-time normalization passes
//! ([`Composition::process_repeaters`] and [`Composition::update_stats`]) no
//! query mutates the tree, so the same composition may be evaluated from
//! multiple threads for different frame numbers.
//!
//! Parsing, rasterization, image decoding and playback scheduling live in
//! neighboring crates; this one only models the built animation and answers
//! "what is this property's value at frame N".

pub mod animatable;
pub mod model;
pub mod modifiers;
pub mod shape;
pub mod transform;

pub use animatable::{Animatable, Easing, Interpolatable, Keyframe, KeyframeTrack};
pub use model::{
    Asset, AssetData, BlendMode, CapStyle, Color, Composition, Direction, Dash, Ellipse, Fill,
    FillRule, Gradient, GradientFill, GradientKind, GradientStops, GradientStroke, Group,
    ImageAsset, JoinStyle, Layer, LayerExtra, LayerInfo, LayerKind, LayerStats, Marker, Mask,
    MaskMode, MatteType, Node, NodeData, NodeKind, PathNode, Polystar, PolystarKind, Rect, Stroke,
    Timebase,
};
pub use modifiers::{Repeater, RepeaterTransform, Segment, Trim, TrimMode};
pub use shape::{AnimatableShape, ShapeData};
pub use transform::{TransformData, TransformExtra, TransformNode};

use thiserror::Error;

/// Violations of construction-time invariants.
///
/// These are reported while the loader assembles the tree; playback queries
/// themselves never fail (out-of-range frames clamp, degenerate trims and
/// zero-length keyframe spans are handled by epsilon checks).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("keyframe track must contain at least one keyframe")]
    EmptyTrack,
    #[error("keyframe frame range is inverted ({start}..{end})")]
    InvertedKeyframe { start: f32, end: f32 },
    #[error("keyframe starting at frame {frame} overlaps the previous keyframe")]
    UnorderedKeyframes { frame: f32 },
    #[error("shape point list of length {points} is not one move plus cubic triplets")]
    MalformedShape { points: usize },
    #[error("composition frame range {start}..{end} is empty or inverted")]
    InvalidFrameRange { start: f32, end: f32 },
}
