//! End-to-end tests: chat command to frames arriving at the voice sink.

use futures::StreamExt;
use soundboard::transports::{ChannelConnector, ChannelListener, ChannelSink};
use soundboard::{
    Command, DecodeError, PlaybackError, PlaybackTarget, Soundboard, SoundboardConfig,
    SoundboardError,
};
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;

type Session = (PlaybackTarget, Vec<Vec<u8>>, bool);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write_container(dir: &Path, identifier: &str, payloads: &[&[u8]]) {
    let mut bytes = Vec::new();
    for payload in payloads {
        bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        bytes.extend_from_slice(payload);
    }
    std::fs::write(dir.join(format!("{identifier}.dca")), bytes).unwrap();
}

fn config_for(dir: &Path) -> SoundboardConfig {
    let yaml = format!(
        "sounds_dir: '{}'\nsettle_delay_ms: 250\nchannel_capacity: 1\nsounds:\n  airhorn: airhorn\n  moo: cow_moo\n  broken: broken\n",
        dir.display()
    );
    SoundboardConfig::from_yaml_str(&yaml).unwrap()
}

/// Accepts sessions until the connector goes away, recording the payloads
/// and the active flag left behind by each one.
fn spawn_voice_client(mut listener: ChannelListener) -> JoinHandle<Vec<Session>> {
    tokio::spawn(async move {
        let mut sessions = Vec::new();
        while let Some(sink) = listener.accept().await {
            sessions.push(drain(sink).await);
        }
        sessions
    })
}

async fn drain(mut sink: ChannelSink) -> Session {
    let target = sink.target().clone();
    let mut frames = Vec::new();
    while let Some(frame) = sink.next().await {
        frames.push(frame.into_inner());
    }
    (target, frames, sink.is_active())
}

#[tokio::test(start_paused = true)]
async fn command_to_sink_preserves_frame_order() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_container(dir.path(), "airhorn", &[&[0xAB, 0xCD], &[0x01, 0x02, 0x03], &[], &[0xFF]]);

    let config = config_for(dir.path());
    let (connector, listener) = config.loopback_connector();
    let client = spawn_voice_client(listener);

    let router = config.router();
    let worker = Soundboard::with_directory(&config, connector).spawn(config.queue_depth);

    let command = router.route("!AirHorn").unwrap();
    let identifier = command.sound().unwrap();
    let target = PlaybackTarget::new("guild-1", "voice-1");
    let summary = worker.submit(identifier, target.clone()).await.unwrap();
    assert_eq!(summary.frames_sent, 4);
    assert!(summary.elapsed >= Duration::from_millis(500));

    worker.shutdown().await;

    let sessions = client.await.unwrap();
    assert_eq!(sessions.len(), 1);
    let (seen_target, frames, active_after) = &sessions[0];
    assert_eq!(seen_target, &target);
    assert_eq!(frames, &vec![vec![0xAB, 0xCD], vec![0x01, 0x02, 0x03], vec![], vec![0xFF]]);
    assert!(!active_after);
}

#[tokio::test(start_paused = true)]
async fn failures_do_not_stop_the_soundboard() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_container(dir.path(), "cow_moo", &[&[1], &[2]]);
    // Announces 16 bytes, carries 2.
    std::fs::write(dir.path().join("broken.dca"), [0x10, 0x00, 0x01, 0x02]).unwrap();

    let config = config_for(dir.path());
    let (connector, listener) = config.loopback_connector();
    let client = spawn_voice_client(listener);
    let worker = Soundboard::with_directory(&config, connector).spawn(config.queue_depth);
    let target = PlaybackTarget::new("guild-1", "voice-1");

    // Mapped in the config but never written to disk.
    let missing = worker.submit("airhorn", target.clone()).await.unwrap_err();
    assert!(matches!(missing, SoundboardError::Decode(DecodeError::ResourceNotFound { .. })));
    assert!(!missing.recovery_suggestions().is_empty());

    let broken = worker.submit("broken", target.clone()).await.unwrap_err();
    assert!(matches!(broken, SoundboardError::Decode(DecodeError::MalformedContainer { .. })));

    worker.submit("cow_moo", target.clone()).await.unwrap();
    worker.shutdown().await;

    let sessions = client.await.unwrap();
    assert_eq!(sessions.len(), 1, "decode failures must not open a session");
    assert_eq!(sessions[0].1, vec![vec![1], vec![2]]);
}

#[tokio::test(start_paused = true)]
async fn sink_hanging_up_mid_stream_is_a_transport_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_container(dir.path(), "cow_moo", &[&[1], &[2], &[3], &[4]]);

    let config = config_for(dir.path());
    let (connector, mut listener) = ChannelConnector::new(1);
    let board = Soundboard::with_directory(&config, connector);

    let client = tokio::spawn(async move {
        let mut sink = listener.accept().await.unwrap();
        let first = sink.recv().await.unwrap();
        drop(sink);
        first.into_inner()
    });

    let err = board
        .load_and_play("cow_moo", &PlaybackTarget::new("g", "c"))
        .await
        .unwrap_err();
    match err {
        SoundboardError::Playback(PlaybackError::Transport { frames_sent, total_frames, .. }) => {
            assert!((1..4).contains(&frames_sent));
            assert_eq!(total_frames, 4);
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(client.await.unwrap(), vec![1]);
}

#[tokio::test]
async fn help_and_unknown_commands_play_nothing() {
    let router = SoundboardConfig::default().router();

    match router.route("!help").unwrap() {
        Command::Help { messages } => {
            let all = messages.join("\n");
            assert!(all.contains("!airhorn"));
            assert!(all.contains("!whileitlasted"));
        }
        other => panic!("expected help, got {other:?}"),
    }

    let unknown = router.route("!doesnotexist").unwrap();
    assert_eq!(unknown.sound(), None);
    assert_eq!(unknown.replies().len(), 1);
    assert_eq!(router.route("airhorn"), None);
}
