use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use kurbo::BezPath;
use lottie_model::{
    Animatable, AnimatableShape, Easing, Keyframe, KeyframeTrack, ShapeData, TransformData,
    TransformNode,
};

fn scalar_track(keyframes: usize) -> KeyframeTrack<f32> {
    let frames = (0..keyframes)
        .map(|i| {
            Keyframe::new(
                i as f32 * 10.0,
                (i + 1) as f32 * 10.0,
                Some(Easing::new(Vec2::new(0.42, 0.0), Vec2::new(0.58, 1.0))),
                i as f32,
                (i + 1) as f32,
            )
        })
        .collect();
    KeyframeTrack::new(frames).unwrap()
}

fn path_track() -> KeyframeTrack<Vec2> {
    let kf = Keyframe::new(
        0.0,
        100.0,
        Some(Easing::LINEAR),
        Vec2::new(0.0, 0.0),
        Vec2::new(200.0, 50.0),
    )
    .with_tangents(Vec2::new(120.0, 0.0), Vec2::new(0.0, -80.0));
    KeyframeTrack::new(vec![kf]).unwrap()
}

fn morph_shape(offset: f32) -> ShapeData {
    let points = (0..31)
        .map(|i| Vec2::new(i as f32 + offset, (i as f32 * 0.7).sin() * 20.0))
        .collect();
    ShapeData::new(points, true).unwrap()
}

fn bench_tracks(c: &mut Criterion) {
    let track = scalar_track(256);
    c.bench_function("scalar_track_lookup_256", |b| {
        b.iter(|| {
            let mut acc = 0.0f32;
            for frame in 0..256 {
                acc += track.value(black_box(frame as f32 * 10.0 + 5.0));
            }
            acc
        })
    });

    let path = path_track();
    c.bench_function("path_track_arclength_eval", |b| {
        b.iter(|| path.value(black_box(37.0)))
    });

    let from = morph_shape(0.0);
    let to = morph_shape(5.0);
    let shape = AnimatableShape(Animatable::Animated(
        KeyframeTrack::new(vec![Keyframe::new(
            0.0,
            100.0,
            Some(Easing::LINEAR),
            from,
            to,
        )])
        .unwrap(),
    ));
    c.bench_function("shape_morph_31_points", |b| {
        let mut out = BezPath::new();
        b.iter(|| {
            shape.update_path(black_box(42.0), &mut out);
            out.elements().len()
        })
    });

    let mut animated = TransformData::default();
    animated.rotation = Animatable::Animated(scalar_track(4));
    let node = TransformNode::new(animated);
    c.bench_function("transform_matrix_animated", |b| {
        b.iter(|| node.matrix(black_box(17.0), false))
    });
}

criterion_group!(benches, bench_tracks);
criterion_main!(benches);
