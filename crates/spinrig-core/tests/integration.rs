//! Integration tests for spinrig-core
//!
//! These tests stand in for the rig's Python helpers with `sh -c` scripts,
//! so they run anywhere a POSIX shell is available.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use spinrig_core::{
    Actuator, BeltCommand, Command, CommandChannel, ConnectionState, DynRelay, LinkStatus,
    Mailbox, ProcessRelay, RelayCommand, RelayOutcome, Rig, RigEvent, RigWorker, SensorPoller,
    SensorReading, SliderCommand, WorkerOptions,
};
use tokio::time::timeout;

/// A relay that runs `script` through the shell.
fn shell_relay(name: &str, script: &str) -> ProcessRelay {
    let command = RelayCommand::from_argv(["sh", "-c", script].map(String::from)).unwrap();
    ProcessRelay::new(name, command).with_timeout(Some(Duration::from_secs(10)))
}

/// A relay that copies the mailbox aside and prints `line`.
fn echo_relay(name: &str, mailbox: &Path, copy: &Path, line: &str) -> ProcessRelay {
    let script = format!(
        "cat '{}' > '{}'; echo '{}'",
        mailbox.display(),
        copy.display(),
        line
    );
    shell_relay(name, &script)
}

#[tokio::test]
async fn test_relay_sees_mailbox_contents() {
    let dir = tempfile::tempdir().unwrap();
    let mailbox = dir.path().join("temp/bluetoothSM.txt");
    let copy = dir.path().join("seen.txt");

    let relay = echo_relay("belt", &mailbox, &copy, "Python: Passed message");
    let mut belt = CommandChannel::new(Actuator::Belt, Mailbox::new(&mailbox), relay);

    let report = belt.send(BeltCommand::SetStep(125).into()).await.unwrap();
    assert_eq!(report.outcome, RelayOutcome::Success);
    assert_eq!(belt.state(), ConnectionState::Enabled);
    assert_eq!(std::fs::read_to_string(&copy).unwrap(), "5\n2\n1\nz");
}

#[tokio::test]
async fn test_silent_relay_is_library_missing() {
    let dir = tempfile::tempdir().unwrap();
    let relay = shell_relay("slider", "exit 1");
    let mut slider = CommandChannel::new(
        Actuator::Slider,
        Mailbox::new(dir.path().join("bluetooth.txt")),
        relay,
    );

    let report = slider.send(SliderCommand::Up.into()).await.unwrap();
    assert_eq!(report.outcome, RelayOutcome::LibraryMissing);
    assert_eq!(report.output.exit_code, Some(1));
    assert_eq!(slider.state(), ConnectionState::Disabled);
}

#[tokio::test]
async fn test_device_not_found_on_stdout_only() {
    let dir = tempfile::tempdir().unwrap();
    let relay = shell_relay(
        "slider",
        "echo 'Python: Could not find available Bluetooth device.'; echo 'traceback' >&2",
    );
    let mut slider = CommandChannel::new(
        Actuator::Slider,
        Mailbox::new(dir.path().join("bluetooth.txt")),
        relay,
    );

    let report = slider.send(SliderCommand::Stop.into()).await.unwrap();
    assert_eq!(report.outcome, RelayOutcome::DeviceNotFound);
}

#[tokio::test]
async fn test_sensor_relay_parses_reading() {
    let mut poller = SensorPoller::new(shell_relay("sensor", "printf '71.6  48.0\\n'"));

    let reading = poller.poll().await.unwrap();
    assert_eq!(reading, SensorReading::new(71.6, 48.0));
}

#[tokio::test]
async fn test_worker_with_shell_relays() {
    let dir = tempfile::tempdir().unwrap();
    let slider_box = dir.path().join("bluetooth.txt");
    let belt_box = dir.path().join("bluetoothSM.txt");
    let slider_copy = dir.path().join("slider_seen.txt");
    let belt_copy = dir.path().join("belt_seen.txt");

    let rig = Rig {
        slider: CommandChannel::new(
            Actuator::Slider,
            Mailbox::new(&slider_box),
            Arc::new(echo_relay(
                "slider",
                &slider_box,
                &slider_copy,
                "Python: Passed message",
            )) as DynRelay,
        ),
        belt: CommandChannel::new(
            Actuator::Belt,
            Mailbox::new(&belt_box),
            Arc::new(echo_relay("belt", &belt_box, &belt_copy, "")) as DynRelay,
        ),
        sensor: SensorPoller::new(Arc::new(shell_relay("sensor", "echo '70.0  50.0'")) as DynRelay),
    };
    let options = WorkerOptions {
        sensor_interval: Duration::from_millis(200),
        ..Default::default()
    };
    let (worker, mut handle) = RigWorker::new(rig, options).unwrap();
    let join = tokio::spawn(worker.run());

    handle
        .send(Command::Send(BeltCommand::SetSpeed(120).into()))
        .await
        .unwrap();

    let snapshot = timeout(Duration::from_secs(10), async {
        loop {
            match handle.events.recv().await {
                Some(RigEvent::Snapshot(snapshot)) if snapshot.belt == ConnectionState::Disabled => {
                    return snapshot;
                }
                Some(_) => {}
                None => panic!("worker stopped"),
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(snapshot.link, LinkStatus::BeltDisabled);
    assert_eq!(snapshot.slider, ConnectionState::Enabled);
    assert_eq!(std::fs::read_to_string(&belt_copy).unwrap(), "0\n2\n1\nv");

    handle.send(Command::Shutdown).await.unwrap();
    timeout(Duration::from_secs(10), join).await.unwrap().unwrap();
}
