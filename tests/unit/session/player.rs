use std::sync::{Arc, Mutex};

use super::*;
use crate::capture::memory::MemoryCaptureHost;
use crate::export::download::InMemoryDownloads;
use crate::foundation::core::Canvas;
use crate::media::source::VideoFrame;
use crate::media::synthetic::SyntheticClip;
use crate::playback::clip::{ClipMetadata, Transport};
use crate::pose::track::{PoseTrack, TrackEstimator};
use crate::render::cpu::CpuSurface;
use crate::render::surface::RecordingSurface;

const CANVAS: Canvas = Canvas {
    width: 16,
    height: 12,
};

fn cfg() -> PlayerConfig {
    let mut cfg = PlayerConfig {
        canvas: CANVAS,
        tick_rate: 8,
        ..PlayerConfig::default()
    };
    cfg.recorder.timeslice_frames = 3;
    cfg
}

fn session(
    duration: f64,
    host: MemoryCaptureHost,
    downloads: InMemoryDownloads,
) -> PlayerSession {
    PlayerSession::new(
        &cfg(),
        Box::new(SyntheticClip::new("clips/ollie.webm", CANVAS, duration).unwrap()),
        Box::new(RecordingSurface::new(CANVAS)),
        Box::new(host),
        Box::new(downloads),
    )
    .unwrap()
}

/// Synthetic clip that logs the clip time of every decoded frame.
struct TimedClip {
    inner: SyntheticClip,
    times: Arc<Mutex<Vec<f64>>>,
}

impl VideoSource for TimedClip {
    fn metadata(&self) -> &ClipMetadata {
        self.inner.metadata()
    }

    fn frame_at(&mut self, time_secs: f64) -> PoseplayResult<VideoFrame> {
        self.times.lock().unwrap().push(time_secs);
        self.inner.frame_at(time_secs)
    }
}

fn timed_session(duration: f64, host: MemoryCaptureHost) -> (PlayerSession, Arc<Mutex<Vec<f64>>>) {
    let times = Arc::new(Mutex::new(Vec::new()));
    let clip = TimedClip {
        inner: SyntheticClip::new("clips/ollie.webm", CANVAS, duration).unwrap(),
        times: times.clone(),
    };
    let s = PlayerSession::new(
        &cfg(),
        Box::new(clip),
        Box::new(RecordingSurface::new(CANVAS)),
        Box::new(host),
        Box::new(InMemoryDownloads::new()),
    )
    .unwrap();
    (s, times)
}

#[test]
fn first_tick_applies_ready_signal() {
    let mut s = session(1.0, MemoryCaptureHost::new(), InMemoryDownloads::new());
    assert!(!s.state().controller.is_ready());
    s.tick().unwrap();
    assert!(s.state().controller.is_ready());
    assert!(s.state().last_canvas().is_some());
    assert_eq!(s.ticks(), 1);
}

#[test]
fn surface_must_match_canvas() {
    let res = PlayerSession::new(
        &cfg(),
        Box::new(SyntheticClip::new("a.webm", CANVAS, 1.0).unwrap()),
        Box::new(RecordingSurface::new(Canvas {
            width: 8,
            height: 8,
        })),
        Box::new(MemoryCaptureHost::new()),
        Box::new(InMemoryDownloads::new()),
    );
    assert!(matches!(res, Err(PoseplayError::Validation(_))));
}

#[test]
fn looping_playback_never_ends() {
    let mut s = session(0.5, MemoryCaptureHost::new(), InMemoryDownloads::new());
    s.tick().unwrap();
    s.control(Control::PlayPause).unwrap();
    for _ in 0..20 {
        s.tick().unwrap();
    }
    assert!(s.state().controller.is_playing());
    assert!(s.state().export.is_idle());
}

#[test]
fn rejected_controls_do_not_abort() {
    let mut s = session(1.0, MemoryCaptureHost::new(), InMemoryDownloads::new());
    // Not ready yet, and nothing to stop.
    s.control(Control::PlayPause).unwrap();
    s.control(Control::StopRecording).unwrap();
    s.tick().unwrap();
    assert!(!s.state().controller.is_playing());
}

#[test]
fn export_records_every_tick_until_the_end() {
    let host = MemoryCaptureHost::new();
    let downloads = InMemoryDownloads::new();
    let mut s = session(1.0, host.clone(), downloads.clone());

    let report = s.run_export().unwrap();

    // 1s at 8 ticks/s: frames at 0.0 .. 0.875.
    assert_eq!(host.captured_frames(), 8);
    let expected = host.emitted_chunks().concat();
    assert!(!expected.is_empty());
    assert_eq!(report.filename, "ollie-clip.webm");
    assert_eq!(report.chunks, host.emitted_chunks().len());
    assert_eq!(downloads.get("ollie-clip.webm"), Some(expected));

    assert!(s.state().export.is_idle());
    assert!(s.state().export.captured_chunks().is_empty());
    assert!(!s.state().controller.is_playing());
    assert_eq!(s.state().controller.completion_fraction().unwrap(), 1.0);
}

#[test]
fn export_without_capture_support_fails_cleanly() {
    let mut s = session(
        1.0,
        MemoryCaptureHost::unavailable(),
        InMemoryDownloads::new(),
    );
    assert!(matches!(
        s.run_export(),
        Err(PoseplayError::CaptureUnavailable(_))
    ));
    assert!(s.state().export.is_idle());
    assert_eq!(s.state().controller.clip().unwrap().current_time_secs, 0.0);
}

#[test]
fn still_frame_waits_for_pose_estimate() {
    let track = PoseTrack::from_json_slice(
        br#"[{ "time": 0.0, "poses": [{ "pose": { "keypoints": [
            { "part": "nose", "score": 0.9, "position": { "x": 8.0, "y": 6.0 } }
        ] } }] }]"#,
        0.1,
    )
    .unwrap();
    let mut s = PlayerSession::new(
        &cfg(),
        Box::new(SyntheticClip::new("a.webm", CANVAS, 1.0).unwrap()),
        Box::new(CpuSurface::new(CANVAS).unwrap()),
        Box::new(MemoryCaptureHost::new()),
        Box::new(InMemoryDownloads::new()),
    )
    .unwrap()
    .with_estimator(Box::new(TrackEstimator::new(track)))
    .unwrap();

    let still = s.render_still(0.5, Duration::from_secs(5)).unwrap();
    assert_eq!(s.state().poses.latest().len(), 1);
    // Keypoint fill is white at the keypoint centre.
    assert_eq!(still.pixel(8, 6), Some([255, 255, 255, 255]));
}

#[test]
fn export_captures_the_frame_at_time_zero() {
    let host = MemoryCaptureHost::new();
    let (mut s, times) = timed_session(1.0, host.clone());
    s.tick().unwrap();
    s.control(Control::Seek(0.5)).unwrap();
    s.control(Control::StartExport).unwrap();
    times.lock().unwrap().clear();

    s.tick().unwrap();
    assert_eq!(host.captured_frames(), 1);
    assert_eq!(times.lock().unwrap().as_slice(), &[0.0]);
    assert_eq!(
        s.state().controller.clip().unwrap().current_time_secs,
        0.125
    );
}

#[test]
fn export_decodes_each_tick_from_the_start() {
    let host = MemoryCaptureHost::new();
    let (mut s, times) = timed_session(1.0, host.clone());

    s.run_export().unwrap();

    let times = times.lock().unwrap();
    let captured: Vec<f64> = times.iter().take(8).copied().collect();
    let expected: Vec<f64> = (0..8).map(|i| f64::from(i) * 0.125).collect();
    assert_eq!(captured, expected);
    assert_eq!(host.captured_frames(), 8);
}

#[test]
fn resuming_during_export_keeps_the_single_pass() {
    let downloads = InMemoryDownloads::new();
    let mut s = session(1.0, MemoryCaptureHost::new(), downloads.clone());
    s.tick().unwrap();
    s.control(Control::StartExport).unwrap();
    s.tick().unwrap();

    s.control(Control::PlayPause).unwrap();
    assert!(!s.state().controller.is_playing());
    s.control(Control::PlayPause).unwrap();
    assert_eq!(
        s.state().controller.clip().unwrap().transport,
        Transport::Playing { looping: false }
    );

    let mut report = None;
    for _ in 0..40 {
        if let Some(r) = s.tick().unwrap() {
            report = Some(r);
            break;
        }
    }
    let report = report.unwrap();
    assert!(downloads.get(&report.filename).is_some());
    assert!(s.state().export.is_idle());

    // Looping is back once the export is over.
    s.control(Control::PlayPause).unwrap();
    assert_eq!(
        s.state().controller.clip().unwrap().transport,
        Transport::Playing { looping: true }
    );
}
