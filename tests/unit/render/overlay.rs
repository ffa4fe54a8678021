use super::*;
use crate::foundation::core::Canvas;
use crate::playback::clip::Transport;
use crate::pose::model::{Keypoint, PoseResult};
use crate::render::surface::{DrawOp, RecordingSurface};

fn canvas() -> Canvas {
    Canvas {
        width: 200,
        height: 100,
    }
}

fn clip_at(t: f64) -> ClipState {
    ClipState {
        source_uri: "a.webm".to_owned(),
        width: 200,
        height: 100,
        duration_secs: 10.0,
        current_time_secs: t,
        transport: Transport::Paused,
    }
}

fn renderer() -> OverlayRenderer {
    OverlayRenderer::new(Rgba8::grey(150), OverlayStyle::default())
}

fn body(scores: &[f32]) -> PoseResult {
    let keypoints: Vec<Keypoint> = scores
        .iter()
        .enumerate()
        .map(|(i, &s)| Keypoint::new(format!("p{i}"), 10.0 * i as f64 + 0.4, 20.6, s))
        .collect();
    let skeleton = keypoints
        .windows(2)
        .map(|w| (w[0].clone(), w[1].clone()))
        .collect();
    PoseResult {
        keypoints,
        skeleton,
    }
}

#[test]
fn threshold_is_strictly_greater_than() {
    let poses = PoseResultSet::from(vec![body(&[0.199, 0.2, 0.201])]);
    let mut s = RecordingSurface::new(canvas());
    renderer()
        .render(&mut s, Some(&clip_at(0.0)), None, &poses, OverlayToggles::default())
        .unwrap();

    let centres: Vec<Point> = s
        .circles()
        .map(|op| match op {
            DrawOp::Circle { center, .. } => *center,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(centres, vec![Point::new(20.0, 21.0)]);
}

#[test]
fn skeleton_edges_ignore_confidence() {
    let poses = PoseResultSet::from(vec![body(&[0.0, 0.0, 0.0])]);
    let mut s = RecordingSurface::new(canvas());
    renderer()
        .render(&mut s, None, None, &poses, OverlayToggles::default())
        .unwrap();
    assert_eq!(s.lines().count(), 2);
    assert_eq!(s.circles().count(), 0);
}

#[test]
fn layer_order_is_background_video_track_pose() {
    let poses = PoseResultSet::from(vec![body(&[0.9, 0.9])]);
    let frame = FrameRGBA::solid(4, 2, [1, 1, 1, 255]);
    let mut s = RecordingSurface::new(canvas());
    renderer()
        .render(
            &mut s,
            Some(&clip_at(5.0)),
            Some(&frame),
            &poses,
            OverlayToggles::default(),
        )
        .unwrap();

    let ops = s.ops();
    assert_eq!(ops[0], DrawOp::Clear(Rgba8::grey(150)));
    assert!(matches!(ops[1], DrawOp::Image { dest, .. } if dest == canvas().rect()));
    assert!(matches!(ops[2], DrawOp::FillRect { .. }));
    // Scrub marker sits at completion fraction * canvas width.
    let DrawOp::FillRect { rect, .. } = ops[3] else {
        panic!("expected scrub marker");
    };
    assert_eq!(rect.center().x, 100.0);
    assert!(matches!(ops[4], DrawOp::Line { .. }));
    assert!(matches!(ops[5], DrawOp::Circle { .. }));
    assert!(matches!(ops[6], DrawOp::Circle { .. }));
    assert_eq!(ops.len(), 7);
}

#[test]
fn toggles_hide_layers() {
    let poses = PoseResultSet::from(vec![body(&[0.9, 0.9])]);
    let frame = FrameRGBA::solid(4, 2, [1, 1, 1, 255]);
    let mut s = RecordingSurface::new(canvas());
    let toggles = OverlayToggles {
        show_video: false,
        show_pose: false,
    };
    renderer()
        .render(&mut s, Some(&clip_at(1.0)), Some(&frame), &poses, toggles)
        .unwrap();
    assert!(!s.ops().iter().any(|op| matches!(op, DrawOp::Image { .. })));
    assert_eq!(s.lines().count() + s.circles().count(), 0);
    // Scrub track is drawn regardless.
    assert!(s.ops().iter().any(|op| matches!(op, DrawOp::FillRect { .. })));
}

#[test]
fn every_body_is_drawn_in_order() {
    let mut a = body(&[0.9]);
    a.keypoints[0].x = 1.0;
    let mut b = body(&[0.9]);
    b.keypoints[0].x = 2.0;
    let poses = PoseResultSet::from(vec![a, b]);
    let mut s = RecordingSurface::new(canvas());
    renderer()
        .render(&mut s, None, None, &poses, OverlayToggles::default())
        .unwrap();
    let xs: Vec<f64> = s
        .circles()
        .map(|op| match op {
            DrawOp::Circle { center, .. } => center.x,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(xs, vec![1.0, 2.0]);
}

#[test]
fn toggles_flip_and_report() {
    let mut t = OverlayToggles::default();
    assert!(!t.toggle_video());
    assert!(t.toggle_video());
    assert!(!t.toggle_pose());
    assert!(t.show_video && !t.show_pose);
}
