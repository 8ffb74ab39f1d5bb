//! The built scene graph: node variants, layers, assets and the composition
//! root.
//!
//! A loader constructs this tree once, runs the two normalization passes, and
//! from then on the tree is immutable and queried by frame number. The deep
//! inheritance of the source format maps onto a closed [`Node`] enum with the
//! shared identity fields factored into [`NodeData`].

use std::collections::HashMap;

use glam::{Mat3, Vec2};
use serde::{Deserialize, Serialize};

use crate::animatable::{Animatable, Interpolatable};
use crate::modifiers::{Repeater, Trim};
use crate::shape::AnimatableShape;
use crate::transform::TransformNode;
use crate::ModelError;

/// Type tag shared by every scene-graph element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Composition,
    Layer,
    ShapeGroup,
    Transform,
    Fill,
    Stroke,
    GradientFill,
    GradientStroke,
    Rect,
    Ellipse,
    Path,
    Polystar,
    Trim,
    Repeater,
}

/// Identity fields common to all nodes: tag, name and the two playback flags.
///
/// The tag is fixed at construction. The static flag means every animatable
/// property reachable from the node is static; players use it to skip
/// re-evaluation. Both flags are written once by the loader/normalization and
/// then only read.
#[derive(Debug, Clone)]
pub struct NodeData {
    kind: NodeKind,
    name: String,
    is_static: bool,
    hidden: bool,
}

impl NodeData {
    pub fn new(kind: NodeKind) -> Self {
        NodeData {
            kind,
            name: String::new(),
            is_static: true,
            hidden: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn set_static(&mut self, value: bool) {
        self.is_static = value;
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, value: bool) {
        self.hidden = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatteType {
    None,
    Alpha,
    AlphaInv,
    Luma,
    LumaInv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Precomp,
    Solid,
    Image,
    Null,
    Shape,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillRule {
    Winding,
    EvenOdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapStyle {
    Flat,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinStyle {
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskMode {
    None,
    Add,
    Subtract,
    Intersect,
    Difference,
}

/// Draw direction of a geometry node. The raw format encodes reversed paths
/// as direction 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn from_raw(raw: i32) -> Self {
        if raw == 3 {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Clockwise
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolystarKind {
    Star,
    Polygon,
}

/// Normalized RGB color, each channel in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    pub fn to_rgba8(&self, alpha: f32) -> [u8; 4] {
        [
            (self.r * 255.0) as u8,
            (self.g * 255.0) as u8,
            (self.b * 255.0) as u8,
            (alpha * 255.0) as u8,
        ]
    }
}

impl Interpolatable for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

/// Raw gradient stop data in the format's flat layout: `color_points` groups
/// of (offset, r, g, b) optionally followed by (offset, alpha) pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradientStops(pub Vec<f32>);

impl Interpolatable for GradientStops {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        // Stop lists of different layouts cannot be blended pointwise; hold
        // the start list in that case.
        if self.0.len() != other.0.len() {
            return self.clone();
        }
        GradientStops(
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(a, b)| a + (b - a) * t)
                .collect(),
        )
    }
}

/// A scene-graph element. Shared identity lives in each variant's
/// [`NodeData`]; dispatch is a match on the variant, not virtual calls.
#[derive(Debug, Clone)]
pub enum Node {
    Layer(Box<Layer>),
    Group(Group),
    Fill(Fill),
    Stroke(Stroke),
    GradientFill(GradientFill),
    GradientStroke(GradientStroke),
    Rect(Rect),
    Ellipse(Ellipse),
    Path(PathNode),
    Polystar(Polystar),
    Trim(Trim),
    Repeater(Repeater),
}

impl Node {
    pub fn base(&self) -> &NodeData {
        match self {
            Node::Layer(n) => &n.data,
            Node::Group(n) => &n.data,
            Node::Fill(n) => &n.data,
            Node::Stroke(n) => &n.data,
            Node::GradientFill(n) => &n.data,
            Node::GradientStroke(n) => &n.data,
            Node::Rect(n) => &n.data,
            Node::Ellipse(n) => &n.data,
            Node::Path(n) => &n.data,
            Node::Polystar(n) => &n.data,
            Node::Trim(n) => &n.data,
            Node::Repeater(n) => &n.data,
        }
    }

    pub fn base_mut(&mut self) -> &mut NodeData {
        match self {
            Node::Layer(n) => &mut n.data,
            Node::Group(n) => &mut n.data,
            Node::Fill(n) => &mut n.data,
            Node::Stroke(n) => &mut n.data,
            Node::GradientFill(n) => &mut n.data,
            Node::GradientStroke(n) => &mut n.data,
            Node::Rect(n) => &mut n.data,
            Node::Ellipse(n) => &mut n.data,
            Node::Path(n) => &mut n.data,
            Node::Polystar(n) => &mut n.data,
            Node::Trim(n) => &mut n.data,
            Node::Repeater(n) => &mut n.data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.base().kind()
    }
}

/// An ordered group of child nodes with an optional transform, the building
/// block for shape groups and (via [`Layer`]) layers. Children are owned
/// exclusively; a node belongs to exactly one group.
#[derive(Debug, Clone)]
pub struct Group {
    pub data: NodeData,
    pub children: Vec<Node>,
    pub transform: Option<TransformNode>,
}

impl Group {
    pub fn shape_group() -> Self {
        Group {
            data: NodeData::new(NodeKind::ShapeGroup),
            children: Vec::new(),
            transform: None,
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        Group::shape_group()
    }
}

/// Layer payload only some layers carry, boxed to keep plain layers small:
/// solid color, precomp reference, time remap and masks.
#[derive(Debug, Clone, Default)]
pub struct LayerExtra {
    pub solid_color: Color,
    pub precomp_ref: Option<String>,
    pub time_remap: Animatable<f32>,
    pub masks: Vec<Mask>,
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub data: NodeData,
    pub children: Vec<Node>,
    pub transform: Option<TransformNode>,
    pub kind: LayerKind,
    pub matte_type: MatteType,
    pub blend_mode: BlendMode,
    /// Id used for parenting within the composition; parents are resolved by
    /// lookup, so forward references are legal.
    pub id: i32,
    pub parent_id: Option<i32>,
    /// Visible frame range, half-open.
    pub in_frame: f32,
    pub out_frame: f32,
    pub start_frame: f32,
    pub time_stretch: f32,
    pub auto_orient: bool,
    pub size: Vec2,
    pub has_mask: bool,
    pub has_repeater: bool,
    pub has_gradient: bool,
    pub has_path_operator: bool,
    pub extra: Option<Box<LayerExtra>>,
}

impl Layer {
    pub fn new(kind: LayerKind) -> Self {
        Layer {
            data: NodeData::new(NodeKind::Layer),
            children: Vec::new(),
            transform: None,
            kind,
            matte_type: MatteType::None,
            blend_mode: BlendMode::Normal,
            id: -1,
            parent_id: None,
            in_frame: 0.0,
            out_frame: 0.0,
            start_frame: 0.0,
            time_stretch: 1.0,
            auto_orient: false,
            size: Vec2::ZERO,
            has_mask: false,
            has_repeater: false,
            has_gradient: false,
            has_path_operator: false,
            extra: None,
        }
    }

    pub fn has_parent(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn in_range(&self, frame: f32) -> bool {
        frame >= self.in_frame && frame < self.out_frame
    }

    pub fn matrix(&self, frame: f32) -> Mat3 {
        match &self.transform {
            Some(t) => t.matrix(frame, self.auto_orient),
            None => Mat3::IDENTITY,
        }
    }

    pub fn opacity(&self, frame: f32) -> f32 {
        match &self.transform {
            Some(t) => t.opacity(frame),
            None => 1.0,
        }
    }

    /// Map a composition frame onto this layer's own timeline.
    ///
    /// A static time-remap track means no remapping: the layer just offsets
    /// by its start frame. An animated track holds a time in seconds, which
    /// the owning composition's [`Timebase`] converts back to a frame; the
    /// timebase is passed in rather than stored to keep the tree free of
    /// back-references. Time stretch divides in both branches.
    pub fn remap_frame(&self, frame: f32, timebase: &Timebase) -> f32 {
        let mapped = match &self.extra {
            Some(extra) if !extra.time_remap.is_static() => {
                timebase.frame_at_time(extra.time_remap.value(frame))
            }
            _ => frame - self.start_frame,
        };
        mapped / self.time_stretch
    }

    pub fn solid_color(&self) -> Color {
        self.extra
            .as_ref()
            .map(|e| e.solid_color)
            .unwrap_or_default()
    }

    pub fn precomp_ref(&self) -> Option<&str> {
        self.extra.as_ref()?.precomp_ref.as_deref()
    }

    pub fn masks(&self) -> &[Mask] {
        match &self.extra {
            Some(extra) => &extra.masks,
            None => &[],
        }
    }

    /// Lazily create the extra payload during loading.
    pub fn extra_mut(&mut self) -> &mut LayerExtra {
        self.extra.get_or_insert_with(Default::default)
    }
}

/// A clip shape applied to a layer.
#[derive(Debug, Clone, Default)]
pub struct Mask {
    pub shape: AnimatableShape,
    pub opacity: Animatable<f32>,
    pub mode: MaskMode,
    pub inverted: bool,
    pub is_static: bool,
}

impl Default for MaskMode {
    fn default() -> Self {
        MaskMode::None
    }
}

impl Mask {
    pub fn opacity(&self, frame: f32) -> f32 {
        self.opacity.value(frame) / 100.0
    }
}

/// Undecoded image payload. Decoding belongs to the asset loader; the model
/// only carries dimensions and the raw bytes or path it was given.
#[derive(Debug, Clone, Default)]
pub struct ImageAsset {
    pub width: u32,
    pub height: u32,
    pub data: Option<Vec<u8>>,
    pub path: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AssetData {
    Precomp { layers: Vec<Layer> },
    Image(ImageAsset),
}

/// A shareable resource referenced by id from precomp and image layers.
/// Assets live in the composition's registry and are looked up per use;
/// layers keep only the id string.
#[derive(Debug, Clone)]
pub struct Asset {
    pub ref_id: String,
    pub is_static: bool,
    pub data: AssetData,
}

impl Asset {
    pub fn precomp_layers(&self) -> &[Layer] {
        match &self.data {
            AssetData::Precomp { layers } => layers,
            AssetData::Image(_) => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Fill {
    pub data: NodeData,
    pub fill_rule: FillRule,
    pub color: Animatable<Color>,
    pub opacity: Animatable<f32>,
}

impl Fill {
    pub fn new() -> Self {
        Fill {
            data: NodeData::new(NodeKind::Fill),
            fill_rule: FillRule::Winding,
            color: Animatable::Static(Color::default()),
            opacity: Animatable::Static(100.0),
        }
    }

    pub fn color(&self, frame: f32) -> Color {
        self.color.value(frame)
    }

    pub fn opacity(&self, frame: f32) -> f32 {
        self.opacity.value(frame) / 100.0
    }
}

impl Default for Fill {
    fn default() -> Self {
        Fill::new()
    }
}

/// Dash pattern: alternating gap/dash lengths, each individually animatable,
/// with an optional trailing offset element.
#[derive(Debug, Clone, Default)]
pub struct Dash {
    pub elements: Vec<Animatable<f32>>,
}

impl Dash {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_static(&self) -> bool {
        self.elements.iter().all(|e| e.is_static())
    }

    pub fn dash_info(&self, frame: f32, out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.elements.iter().map(|e| e.value(frame)));
    }
}

#[derive(Debug, Clone)]
pub struct Stroke {
    pub data: NodeData,
    pub color: Animatable<Color>,
    pub opacity: Animatable<f32>,
    pub width: Animatable<f32>,
    pub cap_style: CapStyle,
    pub join_style: JoinStyle,
    pub miter_limit: f32,
    pub dash: Dash,
}

impl Stroke {
    pub fn new() -> Self {
        Stroke {
            data: NodeData::new(NodeKind::Stroke),
            color: Animatable::Static(Color::default()),
            opacity: Animatable::Static(100.0),
            width: Animatable::Static(0.0),
            cap_style: CapStyle::Flat,
            join_style: JoinStyle::Miter,
            miter_limit: 0.0,
            dash: Dash::default(),
        }
    }

    pub fn color(&self, frame: f32) -> Color {
        self.color.value(frame)
    }

    pub fn opacity(&self, frame: f32) -> f32 {
        self.opacity.value(frame) / 100.0
    }

    pub fn width(&self, frame: f32) -> f32 {
        self.width.value(frame)
    }

    pub fn has_dash(&self) -> bool {
        !self.dash.is_empty()
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Stroke::new()
    }
}

/// Fields shared by gradient fills and strokes.
#[derive(Debug, Clone)]
pub struct Gradient {
    pub kind: GradientKind,
    pub start_point: Animatable<Vec2>,
    pub end_point: Animatable<Vec2>,
    pub highlight_length: Animatable<f32>,
    pub highlight_angle: Animatable<f32>,
    pub opacity: Animatable<f32>,
    pub stops: Animatable<GradientStops>,
    /// Number of (offset, r, g, b) color groups at the front of the raw stop
    /// array; the remainder encodes alpha stops.
    pub color_points: usize,
}

impl Default for Gradient {
    fn default() -> Self {
        Gradient {
            kind: GradientKind::Linear,
            start_point: Animatable::Static(Vec2::ZERO),
            end_point: Animatable::Static(Vec2::ZERO),
            highlight_length: Animatable::Static(0.0),
            highlight_angle: Animatable::Static(0.0),
            opacity: Animatable::Static(100.0),
            stops: Animatable::Static(GradientStops::default()),
            color_points: 0,
        }
    }
}

impl Gradient {
    pub fn opacity(&self, frame: f32) -> f32 {
        self.opacity.value(frame) / 100.0
    }

    pub fn stops(&self, frame: f32) -> GradientStops {
        self.stops.value(frame)
    }
}

#[derive(Debug, Clone)]
pub struct GradientFill {
    pub data: NodeData,
    pub gradient: Gradient,
    pub fill_rule: FillRule,
}

impl GradientFill {
    pub fn new() -> Self {
        GradientFill {
            data: NodeData::new(NodeKind::GradientFill),
            gradient: Gradient::default(),
            fill_rule: FillRule::Winding,
        }
    }
}

impl Default for GradientFill {
    fn default() -> Self {
        GradientFill::new()
    }
}

#[derive(Debug, Clone)]
pub struct GradientStroke {
    pub data: NodeData,
    pub gradient: Gradient,
    pub width: Animatable<f32>,
    pub cap_style: CapStyle,
    pub join_style: JoinStyle,
    pub miter_limit: f32,
    pub dash: Dash,
}

impl GradientStroke {
    pub fn new() -> Self {
        GradientStroke {
            data: NodeData::new(NodeKind::GradientStroke),
            gradient: Gradient::default(),
            width: Animatable::Static(0.0),
            cap_style: CapStyle::Flat,
            join_style: JoinStyle::Miter,
            miter_limit: 0.0,
            dash: Dash::default(),
        }
    }

    pub fn width(&self, frame: f32) -> f32 {
        self.width.value(frame)
    }

    pub fn has_dash(&self) -> bool {
        !self.dash.is_empty()
    }
}

impl Default for GradientStroke {
    fn default() -> Self {
        GradientStroke::new()
    }
}

#[derive(Debug, Clone)]
pub struct Rect {
    pub data: NodeData,
    pub direction: Direction,
    pub position: Animatable<Vec2>,
    pub size: Animatable<Vec2>,
    pub roundness: Animatable<f32>,
}

impl Rect {
    pub fn new() -> Self {
        Rect {
            data: NodeData::new(NodeKind::Rect),
            direction: Direction::default(),
            position: Animatable::Static(Vec2::ZERO),
            size: Animatable::Static(Vec2::ZERO),
            roundness: Animatable::Static(0.0),
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::new()
    }
}

#[derive(Debug, Clone)]
pub struct Ellipse {
    pub data: NodeData,
    pub direction: Direction,
    pub position: Animatable<Vec2>,
    pub size: Animatable<Vec2>,
}

impl Ellipse {
    pub fn new() -> Self {
        Ellipse {
            data: NodeData::new(NodeKind::Ellipse),
            direction: Direction::default(),
            position: Animatable::Static(Vec2::ZERO),
            size: Animatable::Static(Vec2::ZERO),
        }
    }
}

impl Default for Ellipse {
    fn default() -> Self {
        Ellipse::new()
    }
}

#[derive(Debug, Clone)]
pub struct Polystar {
    pub data: NodeData,
    pub direction: Direction,
    pub kind: PolystarKind,
    pub position: Animatable<Vec2>,
    pub point_count: Animatable<f32>,
    pub inner_radius: Animatable<f32>,
    pub outer_radius: Animatable<f32>,
    pub inner_roundness: Animatable<f32>,
    pub outer_roundness: Animatable<f32>,
    pub rotation: Animatable<f32>,
}

impl Polystar {
    pub fn new(kind: PolystarKind) -> Self {
        Polystar {
            data: NodeData::new(NodeKind::Polystar),
            direction: Direction::default(),
            kind,
            position: Animatable::Static(Vec2::ZERO),
            point_count: Animatable::Static(0.0),
            inner_radius: Animatable::Static(0.0),
            outer_radius: Animatable::Static(0.0),
            inner_roundness: Animatable::Static(0.0),
            outer_roundness: Animatable::Static(0.0),
            rotation: Animatable::Static(0.0),
        }
    }
}

/// A free-form path shape.
#[derive(Debug, Clone, Default)]
pub struct PathNode {
    pub data: NodeData,
    pub direction: Direction,
    pub shape: AnimatableShape,
}

impl PathNode {
    pub fn new(shape: AnimatableShape) -> Self {
        PathNode {
            data: NodeData::new(NodeKind::Path),
            direction: Direction::default(),
            shape,
        }
    }
}

impl Default for NodeData {
    fn default() -> Self {
        NodeData::new(NodeKind::Path)
    }
}

/// Named frame range used for segment playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    pub start_frame: f32,
    pub end_frame: f32,
}

/// Name and visible range of a top-level layer, surfaced to players for
/// external synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    pub in_frame: f32,
    pub out_frame: f32,
}

/// Per-kind layer tallies collected by the stats pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStats {
    pub precomp_layers: u16,
    pub solid_layers: u16,
    pub shape_layers: u16,
    pub image_layers: u16,
    pub null_layers: u16,
}

/// Frame-rate and frame-range context for time conversions.
///
/// Passed by value into computations that need it (time remap in
/// particular), so layers never hold a back-reference to their owning
/// composition and the tree stays acyclic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timebase {
    pub start_frame: f32,
    pub end_frame: f32,
    pub frame_rate: f32,
}

impl Timebase {
    /// Frame span used for position scaling; the last frame is exclusive.
    pub fn frame_duration(&self) -> f32 {
        self.end_frame - self.start_frame - 1.0
    }

    pub fn duration(&self) -> f32 {
        self.frame_duration() / self.frame_rate
    }

    /// Frame at a normalized position; the position clamps to [0, 1] before
    /// scaling and the result rounds to a whole frame.
    pub fn frame_at_pos(&self, pos: f32) -> f32 {
        (pos.clamp(0.0, 1.0) * self.frame_duration()).round()
    }

    pub fn frame_at_time(&self, seconds: f32) -> f32 {
        self.frame_at_pos(seconds / self.duration())
    }
}

/// The top-level node: owns the layer tree, the asset registry, timing and
/// the marker/info surfaces players consume.
#[derive(Debug, Clone)]
pub struct Composition {
    pub data: NodeData,
    pub version: String,
    pub size: Vec2,
    pub start_frame: f32,
    pub end_frame: f32,
    pub frame_rate: f32,
    pub blend_mode: BlendMode,
    pub root_layer: Layer,
    pub assets: HashMap<String, Asset>,
    pub markers: Vec<Marker>,
    layer_info: Vec<LayerInfo>,
    stats: LayerStats,
}

impl Composition {
    pub fn new(
        size: Vec2,
        start_frame: f32,
        end_frame: f32,
        frame_rate: f32,
        root_layer: Layer,
    ) -> Result<Self, ModelError> {
        if end_frame <= start_frame {
            return Err(ModelError::InvalidFrameRange {
                start: start_frame,
                end: end_frame,
            });
        }
        Ok(Composition {
            data: NodeData::new(NodeKind::Composition),
            version: String::new(),
            size,
            start_frame,
            end_frame,
            frame_rate,
            blend_mode: BlendMode::Normal,
            root_layer,
            assets: HashMap::new(),
            markers: Vec::new(),
            layer_info: Vec::new(),
            stats: LayerStats::default(),
        })
    }

    pub fn timebase(&self) -> Timebase {
        Timebase {
            start_frame: self.start_frame,
            end_frame: self.end_frame,
            frame_rate: self.frame_rate,
        }
    }

    pub fn is_static(&self) -> bool {
        self.root_layer.data.is_static()
    }

    pub fn total_frames(&self) -> f32 {
        self.end_frame - self.start_frame
    }

    pub fn frame_duration(&self) -> f32 {
        self.timebase().frame_duration()
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn duration(&self) -> f32 {
        self.timebase().duration()
    }

    pub fn frame_at_pos(&self, pos: f32) -> f32 {
        self.timebase().frame_at_pos(pos)
    }

    pub fn frame_at_time(&self, seconds: f32) -> f32 {
        self.timebase().frame_at_time(seconds)
    }

    pub fn asset(&self, ref_id: &str) -> Option<&Asset> {
        self.assets.get(ref_id)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn find_marker(&self, name: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.name == name)
    }

    pub fn layer_info_list(&self) -> &[LayerInfo] {
        &self.layer_info
    }

    pub fn stats(&self) -> &LayerStats {
        &self.stats
    }

    /// One-time post-construction pass: resolve every repeater's maximum copy
    /// count and mark the layers that own one. Must run before the first
    /// playback query.
    pub fn process_repeaters(&mut self) {
        let mut count = 0usize;
        process_layer_repeaters(&mut self.root_layer, &mut count);
        for asset in self.assets.values_mut() {
            if let AssetData::Precomp { layers } = &mut asset.data {
                for layer in layers {
                    process_layer_repeaters(layer, &mut count);
                }
            }
        }
        tracing::debug!(repeaters = count, "repeater normalization pass done");
    }

    /// One-time post-construction pass: tally layer kinds and collect the
    /// layer-info list from the root layer's direct children.
    pub fn update_stats(&mut self) {
        self.stats = LayerStats::default();
        self.layer_info.clear();
        for child in &self.root_layer.children {
            if let Node::Layer(layer) = child {
                match layer.kind {
                    LayerKind::Precomp => self.stats.precomp_layers += 1,
                    LayerKind::Solid => self.stats.solid_layers += 1,
                    LayerKind::Shape => self.stats.shape_layers += 1,
                    LayerKind::Image => self.stats.image_layers += 1,
                    LayerKind::Null => self.stats.null_layers += 1,
                    LayerKind::Text => {}
                }
                self.layer_info.push(LayerInfo {
                    name: layer.data.name().to_owned(),
                    in_frame: layer.in_frame,
                    out_frame: layer.out_frame,
                });
            }
        }
        tracing::debug!(
            layers = self.layer_info.len(),
            "layer statistics pass done"
        );
    }
}

fn process_node_repeaters(nodes: &mut [Node], count: &mut usize) -> bool {
    let mut found = false;
    for node in nodes {
        match node {
            Node::Repeater(rep) => {
                rep.resolve_max_copies();
                *count += 1;
                found = true;
                process_node_repeaters(&mut rep.content.children, count);
            }
            Node::Group(group) => {
                found |= process_node_repeaters(&mut group.children, count);
            }
            Node::Layer(layer) => {
                process_layer_repeaters(layer, count);
            }
            _ => {}
        }
    }
    found
}

fn process_layer_repeaters(layer: &mut Layer, count: &mut usize) {
    if process_node_repeaters(&mut layer.children, count) {
        layer.has_repeater = true;
    }
}
