use super::*;

fn bogus() -> FfmpegSinkOpts {
    FfmpegSinkOpts {
        binary: PathBuf::from("/nonexistent/filmgrid/ffmpeg"),
        container: VideoContainer::Webm,
    }
}

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: 30,
    }
}

#[test]
fn missing_binary_is_unsupported_format() {
    let err = ensure_encoder(&bogus()).unwrap_err();
    assert!(matches!(err, FilmError::UnsupportedFormat(_)), "{err}");
    let mut sink = FfmpegSink::new(bogus());
    let err = sink.begin(cfg(16, 16)).unwrap_err();
    assert!(matches!(err, FilmError::UnsupportedFormat(_)), "{err}");
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let mut sink = FfmpegSink::new(bogus());
    let err = sink.begin(cfg(15, 16)).unwrap_err();
    assert!(matches!(err, FilmError::Validation(_)));
    let err = sink
        .begin(SinkConfig {
            fps: 0,
            ..cfg(16, 16)
        })
        .unwrap_err();
    assert!(matches!(err, FilmError::Validation(_)));
}

#[test]
fn push_and_end_require_begin() {
    let mut sink = FfmpegSink::new(bogus());
    let frame = Surface::filled(2, 2, crate::foundation::core::Rgba8::rgb(0, 0, 0)).unwrap();
    assert!(sink.push_frame(0, &frame).is_err());
    assert!(sink.end().is_err());
    assert!(sink.take_output().is_none());
}

#[test]
fn container_metadata() {
    assert_eq!(VideoContainer::default(), VideoContainer::Webm);
    assert_eq!(VideoContainer::Webm.mime(), "video/webm");
    assert_eq!(VideoContainer::Mp4.encoder(), "libx264");
    let opts = FfmpegSinkOpts::new(VideoContainer::Mp4);
    let sink = FfmpegSink::new(opts);
    let args = sink.output_args();
    assert!(args.contains(&"frag_keyframe+empty_moov"));
    assert_eq!(args.last(), Some(&"pipe:1"));
}

#[test]
fn encodes_webm_when_ffmpeg_is_available() {
    if !is_container_supported(VideoContainer::Webm) {
        eprintln!("skipping: ffmpeg with libvpx-vp9 not available");
        return;
    }
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(VideoContainer::Webm));
    sink.begin(cfg(32, 32)).unwrap();
    let frame = Surface::filled(32, 32, crate::foundation::core::Rgba8::rgb(200, 10, 10)).unwrap();
    for i in 0..6 {
        sink.push_frame(i, &frame).unwrap();
    }
    sink.end().unwrap();
    let bytes = sink.take_output().unwrap();
    // EBML magic.
    assert_eq!(&bytes[..4], &[0x1A, 0x45, 0xDF, 0xA3]);
}

#[cfg(target_os = "linux")]
#[test]
fn dropping_a_running_sink_stops_the_encoder() {
    let Ok(mut child) = Command::new("sleep")
        .arg("30")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    else {
        eprintln!("skipping: no sleep binary");
        return;
    };
    let pid = child.id();
    let mut sink = FfmpegSink::new(bogus());
    sink.stdin = child.stdin.take();
    sink.stdout_drain = child.stdout.take().map(spawn_drain);
    sink.stderr_drain = child.stderr.take().map(spawn_drain);
    sink.child = Some(child);
    sink.cfg = Some(cfg(16, 16));

    let started = std::time::Instant::now();
    drop(sink);
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    // Reaped, so no zombie entry is left behind.
    assert!(!std::path::Path::new(&format!("/proc/{pid}")).exists());
}

#[test]
fn dropping_an_unstarted_sink_is_quiet() {
    let mut sink = FfmpegSink::new(bogus());
    assert!(sink.begin(cfg(16, 16)).is_err());
    drop(sink);
    drop(FfmpegSink::new(FfmpegSinkOpts::new(VideoContainer::Mp4)));
}
