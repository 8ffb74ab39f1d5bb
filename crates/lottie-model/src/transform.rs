//! Layer and group transforms: per-frame matrix and opacity.

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::animatable::Animatable;
use crate::model::{NodeData, NodeKind};

/// Optional transform extension: 3D rotation components and the separated
/// (independent X/Y) position mode.
#[derive(Debug, Clone, Default)]
pub struct TransformExtra {
    pub rotation_x: Animatable<f32>,
    pub rotation_y: Animatable<f32>,
    pub rotation_z: Animatable<f32>,
    pub position_x: Animatable<f32>,
    pub position_y: Animatable<f32>,
    pub separate_position: bool,
    pub three_dimensional: bool,
}

impl TransformExtra {
    fn is_static(&self) -> bool {
        self.rotation_x.is_static()
            && self.rotation_y.is_static()
            && self.rotation_z.is_static()
            && self.position_x.is_static()
            && self.position_y.is_static()
    }
}

/// The animatable components of a transform. Rotation is in degrees, scale
/// and opacity in percent, matching the source format.
#[derive(Debug, Clone)]
pub struct TransformData {
    pub rotation: Animatable<f32>,
    pub scale: Animatable<Vec2>,
    pub position: Animatable<Vec2>,
    pub anchor: Animatable<Vec2>,
    pub opacity: Animatable<f32>,
    pub extra: Option<Box<TransformExtra>>,
}

impl Default for TransformData {
    fn default() -> Self {
        TransformData {
            rotation: Animatable::Static(0.0),
            scale: Animatable::Static(Vec2::new(100.0, 100.0)),
            position: Animatable::Static(Vec2::ZERO),
            anchor: Animatable::Static(Vec2::ZERO),
            opacity: Animatable::Static(100.0),
            extra: None,
        }
    }
}

impl TransformData {
    pub fn is_static(&self) -> bool {
        self.rotation.is_static()
            && self.scale.is_static()
            && self.position.is_static()
            && self.anchor.is_static()
            && self.opacity.is_static()
            && self.extra.as_ref().map_or(true, |e| e.is_static())
    }

    pub fn opacity(&self, frame: f32) -> f32 {
        self.opacity.value(frame) / 100.0
    }

    /// Compose `T(position) * R * S(scale) * T(-anchor)` at `frame`.
    ///
    /// With `auto_orient` set and a path-mode position track, the rotation is
    /// replaced by the motion path's tangent heading.
    pub fn matrix(&self, frame: f32, auto_orient: bool) -> Mat3 {
        let anchor = self.anchor.value(frame);
        let scale = self.scale.value(frame) / 100.0;

        let position = match &self.extra {
            Some(extra) if extra.separate_position => Vec2::new(
                extra.position_x.value(frame),
                extra.position_y.value(frame),
            ),
            _ => self.position.value(frame),
        };

        let rotation_z = if auto_orient {
            self.position.angle(frame)
        } else {
            match &self.extra {
                Some(extra) if extra.three_dimensional => extra.rotation_z.value(frame),
                _ => self.rotation.value(frame),
            }
        };

        if let Some(extra) = self.extra.as_ref().filter(|e| e.three_dimensional) {
            // Compose in 3D and project back to the 2D plane the renderer
            // draws in.
            let m = Mat4::from_translation(position.extend(0.0))
                * Mat4::from_rotation_z(-rotation_z.to_radians())
                * Mat4::from_rotation_y(extra.rotation_y.value(frame).to_radians())
                * Mat4::from_rotation_x(extra.rotation_x.value(frame).to_radians())
                * Mat4::from_scale(scale.extend(1.0))
                * Mat4::from_translation(-anchor.extend(0.0));
            return mat4_to_mat3_2d(m);
        }

        // Rotation is negated: the format treats positive rotation as
        // clockwise in y-down screen space, glam as counter-clockwise.
        Mat3::from_translation(position)
            * Mat3::from_rotation_z(-rotation_z.to_radians())
            * Mat3::from_scale(scale)
            * Mat3::from_translation(-anchor)
    }
}

fn mat4_to_mat3_2d(m: Mat4) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(m.x_axis.x, m.x_axis.y, 0.0),
        Vec3::new(m.y_axis.x, m.y_axis.y, 0.0),
        Vec3::new(m.w_axis.x, m.w_axis.y, 1.0),
    )
}

#[derive(Debug, Clone)]
enum TransformPayload {
    /// All inputs static: one matrix/opacity pair computed at construction
    /// (frame 0 stands in for every frame).
    Cached { matrix: Mat3, opacity: f32 },
    Animated(Box<TransformData>),
}

/// A transform node. Static transforms collapse to a precomputed pair so the
/// per-frame query is a load, not a matrix composition.
#[derive(Debug, Clone)]
pub struct TransformNode {
    pub data: NodeData,
    payload: TransformPayload,
}

impl TransformNode {
    pub fn new(transform: TransformData) -> Self {
        let mut data = NodeData::new(NodeKind::Transform);
        let payload = if transform.is_static() {
            data.set_static(true);
            TransformPayload::Cached {
                matrix: transform.matrix(0.0, false),
                opacity: transform.opacity(0.0),
            }
        } else {
            data.set_static(false);
            TransformPayload::Animated(Box::new(transform))
        };
        TransformNode { data, payload }
    }

    pub fn is_static(&self) -> bool {
        matches!(self.payload, TransformPayload::Cached { .. })
    }

    pub fn matrix(&self, frame: f32, auto_orient: bool) -> Mat3 {
        match &self.payload {
            TransformPayload::Cached { matrix, .. } => *matrix,
            TransformPayload::Animated(data) => data.matrix(frame, auto_orient),
        }
    }

    pub fn opacity(&self, frame: f32) -> f32 {
        match &self.payload {
            TransformPayload::Cached { opacity, .. } => *opacity,
            TransformPayload::Animated(data) => data.opacity(frame),
        }
    }
}

impl Default for TransformNode {
    fn default() -> Self {
        TransformNode::new(TransformData::default())
    }
}
