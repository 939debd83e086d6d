//! Timed-activation sessions: activation, self-timeout, duration
//! revisions, and the single-session guarantee.

use std::time::Duration;

use device_command_types::{Command, StatusReport};
use relay_actuator::{MockPin, Relay};
use tokio::sync::mpsc;

fn drain(rx: &mut mpsc::Receiver<StatusReport>) -> Vec<StatusReport> {
    let mut reports = Vec::new();
    while let Ok(report) = rx.try_recv() {
        reports.push(report);
    }
    reports
}

#[tokio::test(start_paused = true)]
async fn indefinite_on_raises_the_pin_and_stays_high() {
    let pin = MockPin::new();
    let mut relay = Relay::new(pin.clone(), "Pump");
    relay.configure().await;

    let (reply_tx, mut reply_rx) = mpsc::channel(8);
    relay.execute(Command::on("Pump", None, reply_tx)).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let reports = drain(&mut reply_rx);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("Pump - On indefinitely"));
    assert!(!reports[0].is_error);
    assert!(relay.get());
    assert!(relay.session_active());

    // No timeout ever fires for an indefinite activation.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(relay.get());
    assert!(relay.session_active());
    assert!(drain(&mut reply_rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn timed_on_times_out_with_exactly_one_final_report() {
    let pin = MockPin::new();
    let mut relay = Relay::new(pin.clone(), "Pump");
    relay.configure().await;

    let (reply_tx, mut reply_rx) = mpsc::channel(8);
    relay
        .execute(Command::on("Pump", Some(Duration::from_secs(5)), reply_tx))
        .await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let reports = drain(&mut reply_rx);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("Pump - On for 5s"));
    assert!(relay.get());

    tokio::time::sleep(Duration::from_secs(6)).await;

    let reports = drain(&mut reply_rx);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("Pump - Off after"));
    assert!(!relay.get());
    assert!(!relay.session_active());
}

#[tokio::test(start_paused = true)]
async fn repeating_on_with_the_same_duration_is_a_no_op() {
    let pin = MockPin::new();
    let mut relay = Relay::new(pin.clone(), "Pump");
    relay.configure().await;

    let (reply_tx, mut reply_rx) = mpsc::channel(8);
    relay
        .execute(Command::on("Pump", None, reply_tx.clone()))
        .await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let writes_after_start = pin.write_count();

    relay.execute(Command::on("Pump", None, reply_tx)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    // One activation report total, no extra writes, still one session.
    assert_eq!(drain(&mut reply_rx).len(), 1);
    assert_eq!(pin.write_count(), writes_after_start);
    assert!(relay.session_active());
}

#[tokio::test(start_paused = true)]
async fn revision_changes_the_running_sessions_duration() {
    let pin = MockPin::new();
    let mut relay = Relay::new(pin.clone(), "Pump");
    relay.configure().await;

    let (reply_tx, mut reply_rx) = mpsc::channel(8);
    relay
        .execute(Command::on(
            "Pump",
            Some(Duration::from_secs(10)),
            reply_tx.clone(),
        ))
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    relay
        .execute(Command::on("Pump", Some(Duration::from_secs(3)), reply_tx))
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let reports = drain(&mut reply_rx);
    assert_eq!(reports.len(), 2);
    assert!(reports[0].message.contains("Pump - On for 10s"));
    assert!(reports[1].message.contains("Changing on duration to 3s"));
    assert!(relay.get());
    assert!(relay.session_active());

    // The session ends on the revised schedule, well before the
    // original ten seconds.
    tokio::time::sleep(Duration::from_secs(4)).await;
    let reports = drain(&mut reply_rx);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("Pump - Off after"));
    assert!(!relay.get());
    assert!(!relay.session_active());
}

#[tokio::test(start_paused = true)]
async fn zero_duration_revision_cancels_the_session() {
    let pin = MockPin::new();
    let mut relay = Relay::new(pin.clone(), "Pump");
    relay.configure().await;

    let (reply_tx, mut reply_rx) = mpsc::channel(8);
    relay
        .execute(Command::on(
            "Pump",
            Some(Duration::from_secs(30)),
            reply_tx.clone(),
        ))
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    drain(&mut reply_rx);

    // An On with no duration against a timed session revises it to
    // zero, which ends it immediately.
    relay.execute(Command::on("Pump", None, reply_tx)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let reports = drain(&mut reply_rx);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("Pump - Off after"));
    assert!(!relay.get());
    assert!(!relay.session_active());
}

#[tokio::test(start_paused = true)]
async fn pump_scenario_indefinite_then_revised_to_five_seconds() {
    let pin = MockPin::new();
    let mut relay = Relay::new(pin.clone(), "Pump");
    relay.configure().await;

    let (reply_tx, mut reply_rx) = mpsc::channel(8);

    relay
        .execute(Command::on("Pump", None, reply_tx.clone()))
        .await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let reports = drain(&mut reply_rx);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("Pump - On indefinitely"));
    assert!(relay.get());

    relay
        .execute(Command::on("Pump", Some(Duration::from_secs(5)), reply_tx))
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let reports = drain(&mut reply_rx);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("Changing on duration to 5s"));

    tokio::time::sleep(Duration::from_secs(6)).await;
    let reports = drain(&mut reply_rx);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("Pump - Off after"));
    assert!(!relay.get());
    assert!(!relay.session_active());
}
