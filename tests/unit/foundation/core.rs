use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(24, 0).is_err());
}

#[test]
fn fps_frame_duration_matches_nominal_rate() {
    let fps = Fps::whole(24).unwrap();
    assert!((fps.frame_duration_secs() - 1.0 / 24.0).abs() < 1e-12);
    assert_eq!(fps.secs_to_frames_round(fps.frames_to_secs(37)), 37);
}

#[test]
fn ntsc_rate_rounds_to_nearest_slot() {
    let fps = Fps::new(30000, 1001).unwrap();
    assert_eq!(fps.secs_to_frames_round(1.0), 30);
}

#[test]
fn canvas_rect_and_byte_len() {
    let c = Canvas {
        width: 4,
        height: 2,
    };
    assert_eq!(c.rect(), Rect::new(0.0, 0.0, 4.0, 2.0));
    assert_eq!(c.byte_len(), 32);
}

#[test]
fn premultiplied_scales_colour_channels() {
    assert_eq!(Rgba8([255, 0, 0, 128]).premultiplied(), [128, 0, 0, 128]);
    assert_eq!(Rgba8::grey(150).premultiplied(), [150, 150, 150, 255]);
}
