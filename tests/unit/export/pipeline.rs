use super::*;
use crate::capture::memory::MemoryCaptureHost;
use crate::export::download::InMemoryDownloads;
use crate::playback::clip::ClipMetadata;
use crate::session::inbox::{AppEvent, Inbox};

const CANVAS: Canvas = Canvas {
    width: 8,
    height: 6,
};

fn ready_controller() -> PlaybackController {
    let mut c = PlaybackController::new(Fps::whole(24).unwrap());
    c.on_ready(ClipMetadata {
        source_uri: "media/dance.mp4".to_owned(),
        width: CANVAS.width,
        height: CANVAS.height,
        duration_secs: 2.0,
    })
    .unwrap();
    c
}

fn pipeline(
    host: MemoryCaptureHost,
    downloads: InMemoryDownloads,
    inbox: &Inbox,
    timeslice_frames: u32,
) -> ExportPipeline {
    ExportPipeline::new(
        Box::new(host),
        Box::new(downloads),
        RecorderConfig {
            timeslice_frames,
            ..RecorderConfig::default()
        },
        "-clip",
        inbox.sender(),
    )
}

fn pump(inbox: &Inbox, p: &mut ExportPipeline) -> Option<ExportReport> {
    let mut report = None;
    for event in inbox.drain() {
        if let AppEvent::Recorder(r) = event
            && let Some(done) = p.on_recorder_event(r).unwrap()
        {
            report = Some(done);
        }
    }
    report
}

fn fps() -> Fps {
    Fps::whole(30).unwrap()
}

#[test]
fn start_rewinds_and_plays_once() {
    let inbox = Inbox::new();
    let mut p = pipeline(MemoryCaptureHost::new(), InMemoryDownloads::new(), &inbox, 4);
    let mut c = ready_controller();
    c.seek_time(1.5).unwrap();
    c.play().unwrap();

    p.start_export(&mut c, CANVAS, fps()).unwrap();
    assert_eq!(p.phase(), ExportPhase::Recording);
    let clip = c.clip().unwrap();
    assert_eq!(clip.current_time_secs, 0.0);
    assert_eq!(
        clip.transport,
        crate::playback::clip::Transport::Playing { looping: false }
    );
}

#[test]
fn start_before_ready_is_not_ready() {
    let inbox = Inbox::new();
    let mut p = pipeline(MemoryCaptureHost::new(), InMemoryDownloads::new(), &inbox, 4);
    let mut c = PlaybackController::new(Fps::whole(24).unwrap());
    assert!(matches!(
        p.start_export(&mut c, CANVAS, fps()),
        Err(PoseplayError::NotReady(_))
    ));
    assert!(p.is_idle());
}

#[test]
fn missing_capture_leaves_clip_paused_at_zero() {
    let inbox = Inbox::new();
    let mut p = pipeline(
        MemoryCaptureHost::unavailable(),
        InMemoryDownloads::new(),
        &inbox,
        4,
    );
    let mut c = ready_controller();
    c.seek_time(1.0).unwrap();
    c.play().unwrap();

    assert!(matches!(
        p.start_export(&mut c, CANVAS, fps()),
        Err(PoseplayError::CaptureUnavailable(_))
    ));
    assert!(p.is_idle());
    assert!(!c.is_playing());
    assert_eq!(c.clip().unwrap().current_time_secs, 0.0);
}

#[test]
fn start_while_recording_does_not_touch_chunks() {
    let inbox = Inbox::new();
    let mut p = pipeline(MemoryCaptureHost::new(), InMemoryDownloads::new(), &inbox, 1);
    let mut c = ready_controller();
    p.start_export(&mut c, CANVAS, fps()).unwrap();

    let frame = FrameRGBA::solid(CANVAS.width, CANVAS.height, [1, 2, 3, 255]);
    p.push_frame(&frame).unwrap();
    p.push_frame(&frame).unwrap();
    assert!(pump(&inbox, &mut p).is_none());
    let before = p.captured_chunks().to_vec();
    assert_eq!(before.len(), 2);

    assert!(matches!(
        p.start_export(&mut c, CANVAS, fps()),
        Err(PoseplayError::IllegalStateTransition(_))
    ));
    assert_eq!(p.captured_chunks(), before.as_slice());
    assert_eq!(p.phase(), ExportPhase::Recording);
}

#[test]
fn end_of_clip_finalizes_and_delivers_in_arrival_order() {
    let inbox = Inbox::new();
    let host = MemoryCaptureHost::new();
    let downloads = InMemoryDownloads::new();
    let mut p = pipeline(host.clone(), downloads.clone(), &inbox, 2);
    let mut c = ready_controller();
    p.start_export(&mut c, CANVAS, fps()).unwrap();

    let frame = FrameRGBA::solid(CANVAS.width, CANVAS.height, [5, 5, 5, 255]);
    for _ in 0..5 {
        p.push_frame(&frame).unwrap();
    }
    assert!(pump(&inbox, &mut p).is_none());

    p.on_media_ended().unwrap();
    assert_eq!(p.phase(), ExportPhase::Finalizing);
    // Frames are no longer captured once the stop was requested.
    p.push_frame(&frame).unwrap();

    let report = pump(&inbox, &mut p).expect("export report");
    assert!(p.is_idle());
    assert!(p.captured_chunks().is_empty());

    assert_eq!(report.filename, "dance-clip.webm");
    let expected: Vec<u8> = host.emitted_chunks().concat();
    assert_eq!(report.chunks, host.emitted_chunks().len());
    assert_eq!(report.bytes, expected.len());
    assert_eq!(downloads.get("dance-clip.webm"), Some(expected));
    assert_eq!(host.captured_frames(), 5);
}

#[test]
fn explicit_stop_pauses_and_keeps_chunks() {
    let inbox = Inbox::new();
    let downloads = InMemoryDownloads::new();
    let mut p = pipeline(MemoryCaptureHost::new(), downloads.clone(), &inbox, 100);
    let mut c = ready_controller();
    p.start_export(&mut c, CANVAS, fps()).unwrap();
    p.push_frame(&FrameRGBA::solid(CANVAS.width, CANVAS.height, [0, 0, 0, 255]))
        .unwrap();

    p.stop_recording(&mut c).unwrap();
    assert!(!c.is_playing());
    assert_eq!(p.phase(), ExportPhase::Finalizing);
    assert!(matches!(
        p.stop_recording(&mut c),
        Err(PoseplayError::IllegalStateTransition(_))
    ));

    let report = pump(&inbox, &mut p).unwrap();
    assert_eq!(report.chunks, 1);
    assert!(downloads.get(&report.filename).is_some());
}

#[test]
fn stop_while_idle_is_rejected() {
    let inbox = Inbox::new();
    let mut p = pipeline(MemoryCaptureHost::new(), InMemoryDownloads::new(), &inbox, 4);
    let mut c = ready_controller();
    assert!(matches!(
        p.stop_recording(&mut c),
        Err(PoseplayError::IllegalStateTransition(_))
    ));
}

#[test]
fn missing_stop_ack_stays_finalizing() {
    let inbox = Inbox::new();
    let mut p = pipeline(
        MemoryCaptureHost::without_stop_ack(),
        InMemoryDownloads::new(),
        &inbox,
        4,
    );
    let mut c = ready_controller();
    p.start_export(&mut c, CANVAS, fps()).unwrap();
    p.on_media_ended().unwrap();

    assert!(pump(&inbox, &mut p).is_none());
    assert_eq!(p.phase(), ExportPhase::Finalizing);
    assert_eq!(p.captured_chunks().len(), 1);
}

#[test]
fn idle_chunks_and_acks_are_ignored() {
    let inbox = Inbox::new();
    let mut p = pipeline(MemoryCaptureHost::new(), InMemoryDownloads::new(), &inbox, 4);
    p.on_chunk(vec![1, 2, 3]);
    assert!(p.captured_chunks().is_empty());
    assert_eq!(p.on_recorder_stopped().unwrap(), None);
    assert!(p.is_idle());
}

#[test]
fn mp4_container_changes_extension() {
    let inbox = Inbox::new();
    let downloads = InMemoryDownloads::new();
    let mut p = ExportPipeline::new(
        Box::new(MemoryCaptureHost::new()),
        Box::new(downloads.clone()),
        RecorderConfig {
            container: crate::config::ContainerFormat::Mp4,
            ..RecorderConfig::default()
        },
        "-clip",
        inbox.sender(),
    );
    let mut c = ready_controller();
    p.start_export(&mut c, CANVAS, fps()).unwrap();
    p.on_media_ended().unwrap();
    let report = pump(&inbox, &mut p).unwrap();
    assert_eq!(report.filename, "dance-clip.mp4");
    assert_eq!(downloads.filenames(), vec!["dance-clip.mp4".to_owned()]);
}
