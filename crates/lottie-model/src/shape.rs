//! Vector path values and shape morphing.
//!
//! A [`ShapeData`] stores a path as one move point followed by cubic triplets
//! (out control, in control, on-curve point), the storage layout keyframed
//! shape properties animate between. Morphing interpolates the point lists
//! directly and emits a [`kurbo::BezPath`] for the renderer.

use std::sync::Once;

use glam::Vec2;
use kurbo::{BezPath, Point};

use crate::animatable::{Animatable, Interpolatable};
use crate::ModelError;

fn pt(v: Vec2) -> Point {
    Point::new(v.x as f64, v.y as f64)
}

/// A path encoded as `1 + 3n` points plus a closed flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeData {
    points: Vec<Vec2>,
    closed: bool,
}

impl ShapeData {
    pub fn new(points: Vec<Vec2>, closed: bool) -> Result<Self, ModelError> {
        if !points.is_empty() && (points.len() - 1) % 3 != 0 {
            return Err(ModelError::MalformedShape {
                points: points.len(),
            });
        }
        Ok(ShapeData { points, closed })
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Render the stored points into `out`: one move, a cubic per triplet,
    /// and a close if flagged.
    pub fn to_path(&self, out: &mut BezPath) {
        let mut path = BezPath::new();
        if let Some((first, rest)) = self.points.split_first() {
            path.move_to(pt(*first));
            for triplet in rest.chunks_exact(3) {
                path.curve_to(pt(triplet[0]), pt(triplet[1]), pt(triplet[2]));
            }
            if self.closed {
                path.close_path();
            }
        }
        *out = path;
    }

    /// Morph between two shapes at progress `t`, writing the result into
    /// `out`.
    ///
    /// Mismatched point counts truncate to the shorter list. This is a
    /// documented silent-degrade policy, not a repair: export tools can emit
    /// near-identical topologies that differ by a trailing vertex, and strict
    /// validation belongs upstream of the model. The closed flag comes from
    /// `start`.
    pub fn lerp(start: &ShapeData, end: &ShapeData, t: f32, out: &mut BezPath) {
        if start.points.len() != end.points.len() {
            static TRUNCATION_WARNED: Once = Once::new();
            TRUNCATION_WARNED.call_once(|| {
                tracing::warn!(
                    start_points = start.points.len(),
                    end_points = end.points.len(),
                    "morphing shapes with mismatched point counts; extra points dropped"
                );
            });
        }

        let len = start.points.len().min(end.points.len());
        let mut path = BezPath::new();
        if len > 0 {
            path.move_to(pt(Vec2::lerp(start.points[0], end.points[0], t)));
            let mut i = 1;
            while i + 2 < len {
                path.curve_to(
                    pt(Vec2::lerp(start.points[i], end.points[i], t)),
                    pt(Vec2::lerp(start.points[i + 1], end.points[i + 1], t)),
                    pt(Vec2::lerp(start.points[i + 2], end.points[i + 2], t)),
                );
                i += 3;
            }
            if start.closed {
                path.close_path();
            }
        }
        *out = path;
    }
}

impl Interpolatable for ShapeData {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let len = self.points.len().min(other.points.len());
        let points = (0..len)
            .map(|i| Vec2::lerp(self.points[i], other.points[i], t))
            .collect();
        ShapeData {
            points,
            closed: self.closed,
        }
    }
}

/// A shape property that renders directly into a path, avoiding the clone a
/// generic `Animatable<ShapeData>::value` would make per frame.
#[derive(Debug, Clone, Default)]
pub struct AnimatableShape(pub Animatable<ShapeData>);

impl AnimatableShape {
    pub fn is_static(&self) -> bool {
        self.0.is_static()
    }

    pub fn changed(&self, prev_frame: f32, cur_frame: f32) -> bool {
        self.0.changed(prev_frame, cur_frame)
    }

    /// Resolve the shape at `frame` into `out`.
    pub fn update_path(&self, frame: f32, out: &mut BezPath) {
        match &self.0 {
            Animatable::Static(shape) => shape.to_path(out),
            Animatable::Animated(track) => {
                let frames = track.keyframes();
                let first = &frames[0];
                if first.start_frame >= frame {
                    return first.start_value.to_path(out);
                }
                let last = &frames[frames.len() - 1];
                if last.end_frame <= frame {
                    return last.end_value.to_path(out);
                }
                let kf = &frames[track.segment_index(frame)];
                ShapeData::lerp(&kf.start_value, &kf.end_value, kf.progress(frame), out);
            }
        }
    }
}

impl From<ShapeData> for AnimatableShape {
    fn from(shape: ShapeData) -> Self {
        AnimatableShape(Animatable::Static(shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animatable::{Easing, Keyframe, KeyframeTrack};

    fn square() -> ShapeData {
        // Move + 4 cubic triplets approximating a unit square.
        let mut points = vec![Vec2::new(0.0, 0.0)];
        let corners = [
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, 0.0),
        ];
        let mut prev = Vec2::new(0.0, 0.0);
        for corner in corners {
            points.push(prev);
            points.push(corner);
            points.push(corner);
            prev = corner;
        }
        ShapeData::new(points, true).unwrap()
    }

    #[test]
    fn rejects_broken_point_counts() {
        let err = ShapeData::new(vec![Vec2::ZERO; 3], false).unwrap_err();
        assert_eq!(err, ModelError::MalformedShape { points: 3 });
        assert!(ShapeData::new(Vec::new(), false).unwrap().is_empty());
        assert!(ShapeData::new(vec![Vec2::ZERO; 4], true).is_ok());
    }

    #[test]
    fn morph_of_shape_with_itself_matches_to_path() {
        let shape = square();
        let mut direct = BezPath::new();
        shape.to_path(&mut direct);

        for t in [0.0, 0.25, 0.5, 1.0] {
            let mut morphed = BezPath::new();
            ShapeData::lerp(&shape, &shape, t, &mut morphed);
            assert_eq!(direct.elements(), morphed.elements(), "t = {t}");
        }
    }

    #[test]
    fn morph_truncates_to_shorter_shape() {
        // Flagging the policy, not endorsing it: the longer shape's trailing
        // triplet is silently dropped.
        let short = ShapeData::new(vec![Vec2::ZERO; 4], false).unwrap();
        let long = ShapeData::new(vec![Vec2::ONE; 7], false).unwrap();

        let mut out = BezPath::new();
        ShapeData::lerp(&short, &long, 0.5, &mut out);
        // One move plus one cubic survives from the four shared points.
        assert_eq!(out.elements().len(), 2);
    }

    #[test]
    fn morph_inherits_closed_flag_from_start() {
        let open = ShapeData::new(vec![Vec2::ZERO; 4], false).unwrap();
        let closed = ShapeData::new(vec![Vec2::ONE; 4], true).unwrap();

        let mut out = BezPath::new();
        ShapeData::lerp(&open, &closed, 0.5, &mut out);
        assert!(!matches!(out.elements().last(), Some(kurbo::PathEl::ClosePath)));

        ShapeData::lerp(&closed, &open, 0.5, &mut out);
        assert!(matches!(out.elements().last(), Some(kurbo::PathEl::ClosePath)));
    }

    #[test]
    fn animated_shape_interpolates_between_keyframes() {
        let from = ShapeData::new(vec![Vec2::ZERO; 4], true).unwrap();
        let to = ShapeData::new(vec![Vec2::new(10.0, 0.0); 4], true).unwrap();
        let track = KeyframeTrack::new(vec![Keyframe::new(
            0.0,
            10.0,
            Some(Easing::LINEAR),
            from.clone(),
            to,
        )])
        .unwrap();
        let shape = AnimatableShape(Animatable::Animated(track));

        let mut out = BezPath::new();
        shape.update_path(5.0, &mut out);
        match out.elements()[0] {
            kurbo::PathEl::MoveTo(p) => assert_eq!(p, Point::new(5.0, 0.0)),
            ref el => panic!("expected move, got {el:?}"),
        }

        // Clamped on both sides.
        shape.update_path(-1.0, &mut out);
        match out.elements()[0] {
            kurbo::PathEl::MoveTo(p) => assert_eq!(p, Point::new(0.0, 0.0)),
            ref el => panic!("expected move, got {el:?}"),
        }
        shape.update_path(10.0, &mut out);
        match out.elements()[0] {
            kurbo::PathEl::MoveTo(p) => assert_eq!(p, Point::new(10.0, 0.0)),
            ref el => panic!("expected move, got {el:?}"),
        }
    }
}
