use crate::RunningState;
use crate::tests::{FakeServerFactory, Recorder, ServerEvent, supervisor_with};

use std::sync::Arc;
use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::contains_substring;
use tokio::time::timeout;

#[tokio::test]
async fn given_stopped_when_start_then_running_published_with_url() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor = supervisor_with(FakeServerFactory::new(recorder.clone()));
    let mut observer = supervisor.subscribe();

    // When
    supervisor.start_server(8080).await;

    // Then
    assert_eq!(
        supervisor.current_state(),
        RunningState::Running { port: 8080 }
    );
    let initial = observer.try_recv().unwrap();
    assert!(initial.is_initial());
    let running = observer.try_recv().unwrap();
    assert_eq!(running.state, RunningState::Running { port: 8080 });
    assert_eq!(running.message, "Server running on http://192.168.1.5:8080");
    assert_eq!(
        recorder.events(),
        vec![ServerEvent::Create(8080), ServerEvent::Start(8080)]
    );
    assert_eq!(recorder.live(), 1);
}

#[tokio::test]
async fn given_nothing_running_when_stop_then_stopped_still_published() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor = supervisor_with(FakeServerFactory::new(recorder.clone()));
    let mut observer = supervisor.subscribe();
    observer.try_recv();

    // When
    supervisor.stop_server().await;

    // Then
    let update = observer.try_recv().unwrap();
    assert_eq!(update.state, RunningState::Stopped);
    assert_eq!(update.message, "Server stopped");
    assert_eq!(update.sequence, 1);
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn given_running_on_p_when_start_on_q_then_p_stopped_before_q_created() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor = supervisor_with(FakeServerFactory::new(recorder.clone()));
    supervisor.start_server(8080).await;
    let mut observer = supervisor.subscribe();
    observer.try_recv();

    // When
    supervisor.start_server(9090).await;

    // Then
    assert_eq!(
        recorder.events(),
        vec![
            ServerEvent::Create(8080),
            ServerEvent::Start(8080),
            ServerEvent::Stop(8080),
            ServerEvent::Create(9090),
            ServerEvent::Start(9090),
        ]
    );
    assert_eq!(
        supervisor.current_state(),
        RunningState::Running { port: 9090 }
    );
    assert_eq!(recorder.live(), 1);

    let states: Vec<RunningState> = std::iter::from_fn(|| observer.try_recv())
        .map(|u| u.state)
        .collect();
    assert_eq!(
        states,
        vec![RunningState::Stopped, RunningState::Running { port: 9090 }]
    );
}

#[tokio::test]
async fn given_start_error_when_start_then_stopped_with_reason() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor =
        supervisor_with(FakeServerFactory::new(recorder.clone()).failing_start_on(8080));

    // When
    supervisor.start_server(8080).await;

    // Then
    assert_eq!(supervisor.current_state(), RunningState::Stopped);
    let status = supervisor.latest_status();
    assert_that!(
        status.message,
        contains_substring("Failed to start server: Address already in use")
    );
    assert_eq!(recorder.live(), 0);
    assert_eq!(supervisor.server_url(), None);
}

#[tokio::test]
async fn given_create_error_when_start_then_stopped_with_reason() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor =
        supervisor_with(FakeServerFactory::new(recorder.clone()).failing_create_on(80));

    // When
    supervisor.start_server(80).await;

    // Then
    assert_eq!(supervisor.current_state(), RunningState::Stopped);
    assert_that!(
        supervisor.latest_status().message,
        contains_substring("Permission denied")
    );
    assert_eq!(recorder.events(), vec![ServerEvent::Create(80)]);
}

#[tokio::test]
async fn given_running_when_restart_on_bad_port_fails_then_old_server_is_gone() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor =
        supervisor_with(FakeServerFactory::new(recorder.clone()).failing_start_on(9090));
    supervisor.start_server(8080).await;

    // When
    supervisor.start_server(9090).await;

    // Then
    assert_eq!(supervisor.current_state(), RunningState::Stopped);
    assert_eq!(recorder.live(), 0);
    assert!(recorder.events().contains(&ServerEvent::Stop(8080)));
}

#[tokio::test]
async fn given_concurrent_starts_when_settled_then_never_two_live_handles() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor = supervisor_with(
        FakeServerFactory::new(recorder.clone())
            .with_start_delay(Duration::from_millis(5))
            .with_stop_delay(Duration::from_millis(5)),
    );

    // When
    let mut tasks = Vec::new();
    for i in 0..10u16 {
        let supervisor = supervisor.clone();
        tasks.push(tokio::spawn(async move {
            if i % 3 == 2 {
                supervisor.stop_server().await;
            } else {
                supervisor.start_server(8000 + i).await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // Then
    assert_eq!(recorder.max_live(), 1);
    match supervisor.current_state() {
        RunningState::Running { .. } => assert_eq!(recorder.live(), 1),
        RunningState::Stopped => assert_eq!(recorder.live(), 0),
    }
}

#[tokio::test]
async fn given_running_on_8080_when_stop_twice_then_stopped_each_time_within_deadline() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor = supervisor_with(FakeServerFactory::new(recorder.clone()));
    let mut observer = supervisor.subscribe();
    observer.try_recv();
    supervisor.start_server(8080).await;
    assert_eq!(
        observer.try_recv().map(|u| u.state),
        Some(RunningState::Running { port: 8080 })
    );

    // When
    let deadline = supervisor.stop_policy().deadline() + Duration::from_millis(500);
    let first = timeout(deadline, supervisor.stop_server()).await;
    let second = timeout(deadline, supervisor.stop_server()).await;

    // Then
    assert!(first.is_ok());
    assert!(second.is_ok());
    let states: Vec<RunningState> = std::iter::from_fn(|| observer.try_recv())
        .map(|u| u.state)
        .collect();
    assert_eq!(states, vec![RunningState::Stopped, RunningState::Stopped]);
    assert_eq!(recorder.live(), 0);
}

#[tokio::test]
async fn given_running_when_shutdown_then_stopped_and_later_starts_ignored() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor = supervisor_with(FakeServerFactory::new(recorder.clone()));
    supervisor.start_server(8080).await;

    // When
    supervisor.shutdown().await;
    supervisor.start_server(9090).await;

    // Then
    assert!(supervisor.is_torn_down());
    assert_eq!(supervisor.current_state(), RunningState::Stopped);
    assert_eq!(recorder.live(), 0);
    assert!(!recorder.events().contains(&ServerEvent::Create(9090)));
}

#[tokio::test]
async fn given_running_when_supervisor_dropped_then_server_instance_released() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor = supervisor_with(FakeServerFactory::new(recorder.clone()));
    supervisor.start_server(8080).await;
    assert_eq!(recorder.live(), 1);

    // When
    drop(supervisor);

    // Then
    assert_eq!(recorder.live(), 0);
}

#[tokio::test]
async fn given_running_when_server_url_then_uses_resolved_address() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor = supervisor_with(FakeServerFactory::new(recorder));

    // When
    supervisor.start_server(8081).await;

    // Then
    assert_eq!(
        supervisor.server_url().as_deref(),
        Some("http://192.168.1.5:8081")
    );
}

#[tokio::test]
async fn given_slow_stop_when_stop_call_cancelled_then_state_matches_handle() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor = supervisor_with(
        FakeServerFactory::new(recorder.clone()).with_stop_delay(Duration::from_millis(200)),
    );
    supervisor.start_server(8080).await;

    // When
    let cancelled = timeout(Duration::from_millis(10), supervisor.stop_server()).await;

    // Then
    assert!(cancelled.is_err());
    assert_eq!(recorder.live(), 0);
    assert_eq!(supervisor.current_state(), RunningState::Stopped);
    assert_eq!(supervisor.latest_status().message, "Server stopped");
}

#[tokio::test]
async fn given_slow_stop_when_restart_cancelled_then_state_matches_handle() {
    // Given
    let recorder = Arc::new(Recorder::default());
    let supervisor = supervisor_with(
        FakeServerFactory::new(recorder.clone()).with_stop_delay(Duration::from_millis(200)),
    );
    supervisor.start_server(8080).await;

    // When
    let cancelled = timeout(Duration::from_millis(10), supervisor.start_server(9090)).await;

    // Then
    assert!(cancelled.is_err());
    assert_eq!(recorder.live(), 0);
    assert_eq!(supervisor.current_state(), RunningState::Stopped);
    assert!(!recorder.events().contains(&ServerEvent::Create(9090)));

    // The supervisor keeps working afterwards
    supervisor.start_server(9090).await;
    assert_eq!(
        supervisor.current_state(),
        RunningState::Running { port: 9090 }
    );
    assert_eq!(recorder.live(), 1);
}
