//! Animatable values: keyframes, tracks and the static-or-animated wrapper.
//!
//! Every visual property in the model is an [`Animatable<T>`]: either a single
//! static value with no track overhead, or a [`KeyframeTrack<T>`] of ordered,
//! contiguous keyframes. Track evaluation is the hot path of playback, so
//! segment lookup is a binary search and interpolation allocates nothing for
//! the scalar and point types.

use glam::Vec2;
use kurbo::{CubicBez, ParamCurve, ParamCurveArclen, ParamCurveDeriv, Point};

use crate::ModelError;

/// Accuracy used for motion-path arc-length computations.
const ARCLEN_ACCURACY: f64 = 1e-4;

/// Values that can be interpolated between two keyframe endpoints.
///
/// `lerp_along` and `heading` only matter for 2D points on a motion path;
/// every other type falls back to plain linear interpolation and a zero
/// heading, mirroring how only position tracks carry path tangents.
pub trait Interpolatable: Clone {
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Position between `self` and `other` following a cubic motion path
    /// built from the keyframe's tangent pair.
    fn lerp_along(&self, other: &Self, t: f32, _out_tangent: Vec2, _in_tangent: Vec2) -> Self {
        self.lerp(other, t)
    }

    /// Tangent angle of the motion path at `t`, in degrees.
    fn heading(&self, _other: &Self, _t: f32, _out_tangent: Vec2, _in_tangent: Vec2) -> f32 {
        0.0
    }
}

impl Interpolatable for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Interpolatable for Vec2 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec2::lerp(*self, *other, t)
    }

    fn lerp_along(&self, other: &Self, t: f32, out_tangent: Vec2, in_tangent: Vec2) -> Self {
        let bez = motion_bezier(*self, *other, out_tangent, in_tangent);
        let total = bez.arclen(ARCLEN_ACCURACY);
        if total <= f64::EPSILON {
            return *self;
        }
        // Re-parameterizing by arc length is what makes motion along a
        // custom path constant-speed regardless of control point spacing.
        let p = bez.eval(bez.inv_arclen(t as f64 * total, ARCLEN_ACCURACY));
        Vec2::new(p.x as f32, p.y as f32)
    }

    fn heading(&self, other: &Self, t: f32, out_tangent: Vec2, in_tangent: Vec2) -> f32 {
        let bez = motion_bezier(*self, *other, out_tangent, in_tangent);
        let total = bez.arclen(ARCLEN_ACCURACY);
        if total <= f64::EPSILON {
            return 0.0;
        }
        let d = bez.deriv().eval(bez.inv_arclen(t as f64 * total, ARCLEN_ACCURACY));
        d.y.atan2(d.x).to_degrees() as f32
    }
}

fn motion_bezier(start: Vec2, end: Vec2, out_tangent: Vec2, in_tangent: Vec2) -> CubicBez {
    CubicBez::new(
        Point::new(start.x as f64, start.y as f64),
        Point::new((start.x + out_tangent.x) as f64, (start.y + out_tangent.y) as f64),
        Point::new((end.x + in_tangent.x) as f64, (end.y + in_tangent.y) as f64),
        Point::new(end.x as f64, end.y as f64),
    )
}

/// Cubic-bezier easing curve mapping normalized time to progress.
///
/// Control points use the CSS `cubic-bezier` convention: the curve runs from
/// (0,0) to (1,1) and `p1`/`p2` shape it in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Easing {
    pub p1: Vec2,
    pub p2: Vec2,
}

impl Easing {
    pub const LINEAR: Easing = Easing {
        p1: Vec2::new(0.0, 0.0),
        p2: Vec2::new(1.0, 1.0),
    };

    pub fn new(p1: Vec2, p2: Vec2) -> Self {
        Easing { p1, p2 }
    }

    pub fn value(&self, x: f32) -> f32 {
        // Control points on the diagonal collapse to the identity mapping;
        // taking this path keeps linear easing bit-exact.
        if self.p1.x == self.p1.y && self.p2.x == self.p2.y {
            return x.clamp(0.0, 1.0);
        }
        solve_cubic_bezier(self.p1, self.p2, x)
    }
}

/// Solve the easing curve for progress `y` at horizontal position `x` using
/// Newton-Raphson on the bezier's x polynomial.
pub fn solve_cubic_bezier(p1: Vec2, p2: Vec2, x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let mut t = x;
    for _ in 0..8 {
        let one_minus_t = 1.0 - t;
        let x_est = 3.0 * one_minus_t * one_minus_t * t * p1.x
            + 3.0 * one_minus_t * t * t * p2.x
            + t * t * t;

        let err = x_est - x;
        if err.abs() < 1e-4 {
            break;
        }

        let dx_dt = 3.0 * one_minus_t * one_minus_t * p1.x
            + 6.0 * one_minus_t * t * (p2.x - p1.x)
            + 3.0 * t * t * (1.0 - p2.x);

        if dx_dt.abs() < 1e-6 {
            break;
        }
        t -= err / dx_dt;
    }

    let one_minus_t = 1.0 - t;
    3.0 * one_minus_t * one_minus_t * t * p1.y + 3.0 * one_minus_t * t * t * p2.y + t * t * t
}

/// One keyframe segment: a value transition over `[start_frame, end_frame)`.
///
/// A missing easing curve is a hold keyframe (progress stays 0 until the next
/// segment). A tangent pair marks path-mode interpolation, which only affects
/// 2D point tracks.
#[derive(Debug, Clone)]
pub struct Keyframe<T> {
    pub start_frame: f32,
    pub end_frame: f32,
    pub easing: Option<Easing>,
    pub start_value: T,
    pub end_value: T,
    pub in_tangent: Option<Vec2>,
    pub out_tangent: Option<Vec2>,
}

impl<T: Interpolatable> Keyframe<T> {
    pub fn new(
        start_frame: f32,
        end_frame: f32,
        easing: Option<Easing>,
        start_value: T,
        end_value: T,
    ) -> Self {
        Keyframe {
            start_frame,
            end_frame,
            easing,
            start_value,
            end_value,
            in_tangent: None,
            out_tangent: None,
        }
    }

    /// Attach a motion-path tangent pair, switching the keyframe to path-mode.
    pub fn with_tangents(mut self, out_tangent: Vec2, in_tangent: Vec2) -> Self {
        self.out_tangent = Some(out_tangent);
        self.in_tangent = Some(in_tangent);
        self
    }

    pub fn is_path(&self) -> bool {
        self.out_tangent.is_some() && self.in_tangent.is_some()
    }

    /// Eased progress in [0, 1] for a frame inside this keyframe's span.
    pub fn progress(&self, frame: f32) -> f32 {
        let span = self.end_frame - self.start_frame;
        if span <= f32::EPSILON {
            return 0.0;
        }
        match self.easing {
            Some(easing) => easing.value((frame - self.start_frame) / span),
            None => 0.0,
        }
    }

    pub fn value(&self, frame: f32) -> T {
        let t = self.progress(frame);
        match (self.out_tangent, self.in_tangent) {
            (Some(out_tangent), Some(in_tangent)) => {
                self.start_value
                    .lerp_along(&self.end_value, t, out_tangent, in_tangent)
            }
            _ => self.start_value.lerp(&self.end_value, t),
        }
    }

    pub fn angle(&self, frame: f32) -> f32 {
        match (self.out_tangent, self.in_tangent) {
            (Some(out_tangent), Some(in_tangent)) => self.start_value.heading(
                &self.end_value,
                self.progress(frame),
                out_tangent,
                in_tangent,
            ),
            _ => 0.0,
        }
    }
}

/// Ordered, non-overlapping keyframes covering one property's animated range.
///
/// Queries outside the covered range clamp to the first start-value / last
/// end-value; that is defined behavior, not an error.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T> {
    frames: Vec<Keyframe<T>>,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    pub fn new(frames: Vec<Keyframe<T>>) -> Result<Self, ModelError> {
        if frames.is_empty() {
            return Err(ModelError::EmptyTrack);
        }
        let mut prev_end = f32::NEG_INFINITY;
        for kf in &frames {
            if kf.end_frame < kf.start_frame {
                return Err(ModelError::InvertedKeyframe {
                    start: kf.start_frame,
                    end: kf.end_frame,
                });
            }
            if kf.start_frame < prev_end {
                return Err(ModelError::UnorderedKeyframes {
                    frame: kf.start_frame,
                });
            }
            prev_end = kf.end_frame;
        }
        Ok(KeyframeTrack { frames })
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.frames
    }

    fn first(&self) -> &Keyframe<T> {
        &self.frames[0]
    }

    fn last(&self) -> &Keyframe<T> {
        &self.frames[self.frames.len() - 1]
    }

    /// Index of the keyframe whose `[start, end)` span holds `frame`.
    ///
    /// Only meaningful for frames strictly inside the covered range; callers
    /// clamp to the boundary values first.
    pub(crate) fn segment_index(&self, frame: f32) -> usize {
        self.frames
            .partition_point(|kf| kf.end_frame <= frame)
            .min(self.frames.len() - 1)
    }

    pub fn value(&self, frame: f32) -> T {
        if self.first().start_frame >= frame {
            return self.first().start_value.clone();
        }
        if self.last().end_frame <= frame {
            return self.last().end_value.clone();
        }
        self.frames[self.segment_index(frame)].value(frame)
    }

    /// Motion-path tangent angle at `frame`, 0 outside the covered range or
    /// for non-path tracks.
    pub fn angle(&self, frame: f32) -> f32 {
        if self.first().start_frame >= frame || self.last().end_frame <= frame {
            return 0.0;
        }
        self.frames[self.segment_index(frame)].angle(frame)
    }

    /// Whether the value can differ between the two frames. False only when
    /// both lie before the first keyframe or both lie after the last one.
    pub fn changed(&self, prev_frame: f32, cur_frame: f32) -> bool {
        let first = self.first().start_frame;
        let last = self.last().end_frame;
        !((first > prev_frame && first > cur_frame) || (last < prev_frame && last < cur_frame))
    }
}

/// A property value: one static `T`, or a keyframe track.
///
/// The loader may promote a static value to an animated one exactly once via
/// [`Animatable::animate`]; there is deliberately no way back, so playback
/// code can rely on the discriminant never changing.
#[derive(Debug, Clone)]
pub enum Animatable<T> {
    Static(T),
    Animated(KeyframeTrack<T>),
}

impl<T: Interpolatable> Animatable<T> {
    pub fn value(&self, frame: f32) -> T {
        match self {
            Animatable::Static(v) => v.clone(),
            Animatable::Animated(track) => track.value(frame),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Animatable::Static(_))
    }

    pub fn static_value(&self) -> Option<&T> {
        match self {
            Animatable::Static(v) => Some(v),
            Animatable::Animated(_) => None,
        }
    }

    pub fn track(&self) -> Option<&KeyframeTrack<T>> {
        match self {
            Animatable::Static(_) => None,
            Animatable::Animated(track) => Some(track),
        }
    }

    /// One-way promotion from static to animated; discards the static value.
    pub fn animate(&mut self, track: KeyframeTrack<T>) {
        *self = Animatable::Animated(track);
    }

    pub fn angle(&self, frame: f32) -> f32 {
        match self {
            Animatable::Static(_) => 0.0,
            Animatable::Animated(track) => track.angle(frame),
        }
    }

    pub fn changed(&self, prev_frame: f32, cur_frame: f32) -> bool {
        match self {
            Animatable::Static(_) => false,
            Animatable::Animated(track) => track.changed(prev_frame, cur_frame),
        }
    }
}

impl<T: Default> Default for Animatable<T> {
    fn default() -> Self {
        Animatable::Static(T::default())
    }
}

impl<T> From<T> for Animatable<T> {
    fn from(value: T) -> Self {
        Animatable::Static(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(values: &[(f32, f32, f32, f32)]) -> KeyframeTrack<f32> {
        let frames = values
            .iter()
            .map(|&(start, end, a, b)| Keyframe::new(start, end, Some(Easing::LINEAR), a, b))
            .collect();
        KeyframeTrack::new(frames).unwrap()
    }

    #[test]
    fn clamps_outside_covered_range() {
        let t = track(&[(0.0, 10.0, 0.0, 10.0), (10.0, 20.0, 10.0, 30.0)]);
        assert_eq!(t.value(-5.0), 0.0);
        assert_eq!(t.value(0.0), 0.0);
        assert_eq!(t.value(20.0), 30.0);
        assert_eq!(t.value(99.0), 30.0);
    }

    #[test]
    fn linear_interpolation_inside_segments() {
        let t = track(&[(0.0, 10.0, 0.0, 10.0), (10.0, 20.0, 10.0, 30.0)]);
        assert_eq!(t.value(5.0), 5.0);
        assert_eq!(t.value(15.0), 20.0);
    }

    #[test]
    fn continuous_at_shared_boundary() {
        let t = track(&[(0.0, 10.0, 0.0, 10.0), (10.0, 20.0, 10.0, 30.0)]);
        // At the shared frame the second segment takes over at its start
        // value, which equals the first segment's end value.
        assert_eq!(t.value(10.0), 10.0);
    }

    #[test]
    fn hold_keyframe_stays_at_start_value() {
        let frames = vec![Keyframe::new(0.0, 10.0, None, 1.0, 2.0)];
        let t = KeyframeTrack::new(frames).unwrap();
        assert_eq!(t.value(3.0), 1.0);
        assert_eq!(t.value(9.9), 1.0);
        assert_eq!(t.value(10.0), 2.0);
    }

    #[test]
    fn rejects_inverted_and_overlapping_keyframes() {
        let inverted = vec![Keyframe::new(10.0, 0.0, Some(Easing::LINEAR), 0.0, 1.0)];
        assert_eq!(
            KeyframeTrack::new(inverted).unwrap_err(),
            ModelError::InvertedKeyframe {
                start: 10.0,
                end: 0.0
            }
        );

        let overlapping = vec![
            Keyframe::new(0.0, 10.0, Some(Easing::LINEAR), 0.0, 1.0),
            Keyframe::new(5.0, 15.0, Some(Easing::LINEAR), 1.0, 2.0),
        ];
        assert_eq!(
            KeyframeTrack::new(overlapping).unwrap_err(),
            ModelError::UnorderedKeyframes { frame: 5.0 }
        );

        assert_eq!(
            KeyframeTrack::<f32>::new(Vec::new()).unwrap_err(),
            ModelError::EmptyTrack
        );
    }

    #[test]
    fn changed_is_false_only_outside_both_ends() {
        let t = track(&[(10.0, 20.0, 0.0, 1.0)]);
        assert!(!t.changed(0.0, 5.0));
        assert!(!t.changed(25.0, 30.0));
        assert!(t.changed(5.0, 15.0));
        assert!(t.changed(15.0, 25.0));
        assert!(t.changed(5.0, 25.0));
    }

    #[test]
    fn static_value_is_constant_and_never_changed() {
        let v = Animatable::Static(7.5f32);
        for frame in [-100.0, 0.0, 3.0, 1e6] {
            assert_eq!(v.value(frame), 7.5);
        }
        assert!(!v.changed(0.0, 100.0));
        assert_eq!(v.angle(50.0), 0.0);
    }

    #[test]
    fn promotion_is_one_way() {
        let mut v = Animatable::Static(1.0f32);
        assert!(v.is_static());
        v.animate(track(&[(0.0, 10.0, 1.0, 2.0)]));
        assert!(!v.is_static());
        assert!(v.static_value().is_none());
    }

    #[test]
    fn path_mode_moves_at_constant_speed() {
        // Deliberately lopsided control points: raw bezier-parameter sampling
        // would bunch samples near the start.
        let kf = Keyframe::new(
            0.0,
            100.0,
            Some(Easing::LINEAR),
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
        )
        .with_tangents(Vec2::new(90.0, 0.0), Vec2::new(-1.0, 0.0));
        let t = KeyframeTrack::new(vec![kf]).unwrap();

        let mut deltas = Vec::new();
        let mut prev = t.value(0.0);
        for i in 1..=20 {
            let cur = t.value(i as f32 * 5.0);
            deltas.push(prev.distance(cur));
            prev = cur;
        }
        let mean: f32 = deltas.iter().sum::<f32>() / deltas.len() as f32;
        for d in &deltas {
            assert!(
                (d - mean).abs() < mean * 0.05,
                "uneven step {d} against mean {mean}"
            );
        }
    }

    #[test]
    fn path_mode_angle_follows_tangent() {
        // Straight horizontal motion path: heading stays 0 degrees.
        let kf = Keyframe::new(
            0.0,
            10.0,
            Some(Easing::LINEAR),
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
        )
        .with_tangents(Vec2::new(30.0, 0.0), Vec2::new(-30.0, 0.0));
        let t = KeyframeTrack::new(vec![kf]).unwrap();
        assert!(t.angle(5.0).abs() < 1e-3);
        // Outside the range the angle query returns 0 by definition.
        assert_eq!(t.angle(-1.0), 0.0);
        assert_eq!(t.angle(10.0), 0.0);
    }

    #[test]
    fn easing_newton_solver_matches_endpoints() {
        let ease = Easing::new(Vec2::new(0.42, 0.0), Vec2::new(0.58, 1.0));
        assert_eq!(ease.value(0.0), 0.0);
        assert_eq!(ease.value(1.0), 1.0);
        let mid = ease.value(0.5);
        assert!((mid - 0.5).abs() < 1e-3, "symmetric ease midpoint {mid}");
    }
}
