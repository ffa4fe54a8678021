use super::*;
use crate::session::inbox::{AppEvent, Inbox};

fn stream() -> CanvasStream {
    CanvasStream {
        canvas: Canvas {
            width: 4,
            height: 4,
        },
        fps: Fps::whole(10).unwrap(),
    }
}

fn cfg(timeslice_frames: u32) -> RecorderConfig {
    RecorderConfig {
        timeslice_frames,
        ..RecorderConfig::default()
    }
}

fn recorder_events(inbox: &Inbox) -> Vec<RecorderEvent> {
    inbox
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::Recorder(r) => Some(r),
            _ => None,
        })
        .collect()
}

#[test]
fn unavailable_host_rejects_capture() {
    let mut host = MemoryCaptureHost::unavailable();
    let s = stream();
    assert!(matches!(
        host.capture_stream(s.canvas, s.fps),
        Err(PoseplayError::CaptureUnavailable(_))
    ));
}

#[test]
fn chunks_are_sliced_and_flushed_in_order() {
    let inbox = Inbox::new();
    let mut host = MemoryCaptureHost::new();
    let mut rec = host.record(stream(), cfg(2), inbox.sender()).unwrap();
    rec.start().unwrap();

    let frame = FrameRGBA::solid(4, 4, [9, 8, 7, 255]);
    for _ in 0..3 {
        rec.push_frame(&frame).unwrap();
    }
    rec.request_data().unwrap();
    rec.stop().unwrap();

    let events = recorder_events(&inbox);
    // header + 2 frames, then the flushed third frame, then the stop ack.
    assert_eq!(events.len(), 3);
    let RecorderEvent::Chunk(first) = &events[0] else {
        panic!("expected chunk");
    };
    assert_eq!(&first[..4], MEMORY_RECORDING_MAGIC);
    assert_eq!(first.len(), 4 + 8 + 2 * 8);
    assert!(matches!(&events[1], RecorderEvent::Chunk(c) if c.len() == 8));
    assert_eq!(events[2], RecorderEvent::Stopped);

    assert_eq!(host.emitted_chunks().len(), 2);
    assert_eq!(host.captured_frames(), 3);
}

#[test]
fn stop_without_ack_emits_final_chunk_only() {
    let inbox = Inbox::new();
    let mut host = MemoryCaptureHost::without_stop_ack();
    let mut rec = host.record(stream(), cfg(100), inbox.sender()).unwrap();
    rec.start().unwrap();
    rec.push_frame(&FrameRGBA::solid(4, 4, [0, 0, 0, 255]))
        .unwrap();
    rec.stop().unwrap();

    let events = recorder_events(&inbox);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], RecorderEvent::Chunk(_)));
}

#[test]
fn frames_after_stop_are_rejected() {
    let inbox = Inbox::new();
    let mut host = MemoryCaptureHost::new();
    let mut rec = host.record(stream(), cfg(1), inbox.sender()).unwrap();
    rec.start().unwrap();
    rec.stop().unwrap();
    assert!(
        rec.push_frame(&FrameRGBA::solid(4, 4, [0, 0, 0, 255]))
            .is_err()
    );
    assert!(rec.stop().is_err());
}
