mod supervisor;

use crate::{
    EmbeddedServer, EmbeddedServerError, EmbeddedServerFactory, EmbeddedServerResult,
    FixedAddressResolver, LifecycleSupervisor, NotificationSink, PresentationError,
    PresentationResult, StopPolicy,
};

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

pub(crate) const TEST_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5));

/// Collaborator calls observed by the fake embedded server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ServerEvent {
    Create(u16),
    Start(u16),
    Stop(u16),
}

/// Shared log of calls plus live-instance accounting.
#[derive(Default)]
pub(crate) struct Recorder {
    events: Mutex<Vec<ServerEvent>>,
    live: AtomicUsize,
    max_live: AtomicUsize,
}

impl Recorder {
    pub(crate) fn events(&self) -> Vec<ServerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub(crate) fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    fn record(&self, event: ServerEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub(crate) struct FakeServerFactory {
    recorder: Arc<Recorder>,
    failing_create: Vec<u16>,
    failing_start: Vec<u16>,
    start_delay: Duration,
    stop_delay: Duration,
}

impl FakeServerFactory {
    pub(crate) fn new(recorder: Arc<Recorder>) -> Self {
        Self {
            recorder,
            failing_create: Vec::new(),
            failing_start: Vec::new(),
            start_delay: Duration::ZERO,
            stop_delay: Duration::ZERO,
        }
    }

    pub(crate) fn failing_create_on(mut self, port: u16) -> Self {
        self.failing_create.push(port);
        self
    }

    pub(crate) fn failing_start_on(mut self, port: u16) -> Self {
        self.failing_start.push(port);
        self
    }

    pub(crate) fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub(crate) fn with_stop_delay(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }
}

#[async_trait]
impl EmbeddedServerFactory for FakeServerFactory {
    async fn create(&self, port: u16) -> EmbeddedServerResult<Box<dyn EmbeddedServer>> {
        self.recorder.record(ServerEvent::Create(port));

        if self.failing_create.contains(&port) {
            return Err(EmbeddedServerError::create(port, "Permission denied"));
        }

        let live = self.recorder.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder.max_live.fetch_max(live, Ordering::SeqCst);

        Ok(Box::new(FakeServer {
            port,
            recorder: self.recorder.clone(),
            fail_start: self.failing_start.contains(&port),
            start_delay: self.start_delay,
            stop_delay: self.stop_delay,
        }))
    }
}

struct FakeServer {
    port: u16,
    recorder: Arc<Recorder>,
    fail_start: bool,
    start_delay: Duration,
    stop_delay: Duration,
}

#[async_trait]
impl EmbeddedServer for FakeServer {
    fn port(&self) -> u16 {
        self.port
    }

    async fn start(&mut self, non_blocking: bool) -> EmbeddedServerResult<()> {
        assert!(non_blocking, "supervisor must start non-blocking");
        self.recorder.record(ServerEvent::Start(self.port));
        tokio::time::sleep(self.start_delay).await;

        if self.fail_start {
            return Err(EmbeddedServerError::start("Address already in use"));
        }
        Ok(())
    }

    async fn stop(&mut self, _grace_period: Duration, _force_timeout: Duration) {
        self.recorder.record(ServerEvent::Stop(self.port));
        tokio::time::sleep(self.stop_delay).await;
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.recorder.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Which notification form a message went to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shown {
    Ongoing(String),
    Dismissible(String),
}

#[derive(Default)]
pub(crate) struct FakeSink {
    pub(crate) deny_ongoing: bool,
    pub(crate) fail_dismissible: bool,
    shown: Mutex<Vec<Shown>>,
}

impl FakeSink {
    pub(crate) fn denying_ongoing() -> Self {
        Self {
            deny_ongoing: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_everything() -> Self {
        Self {
            deny_ongoing: true,
            fail_dismissible: true,
            ..Self::default()
        }
    }

    pub(crate) fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }
}

impl NotificationSink for FakeSink {
    fn present_ongoing(&self, message: &str) -> PresentationResult<()> {
        if self.deny_ongoing {
            return Err(PresentationError::foreground_denied(
                "foreground service start not allowed",
            ));
        }
        self.shown
            .lock()
            .unwrap()
            .push(Shown::Ongoing(message.to_string()));
        Ok(())
    }

    fn present_dismissible(&self, message: &str) -> PresentationResult<()> {
        if self.fail_dismissible {
            return Err(PresentationError::notification_failed(
                "notifications disabled",
            ));
        }
        self.shown
            .lock()
            .unwrap()
            .push(Shown::Dismissible(message.to_string()));
        Ok(())
    }
}

pub(crate) fn test_policy() -> StopPolicy {
    StopPolicy::new(Duration::from_millis(50), Duration::from_millis(100))
}

pub(crate) fn supervisor_with(factory: FakeServerFactory) -> Arc<LifecycleSupervisor> {
    Arc::new(LifecycleSupervisor::new(
        Arc::new(factory),
        Arc::new(FixedAddressResolver(TEST_ADDRESS)),
        test_policy(),
    ))
}

/// Poll `condition` until it holds or a second passes.
pub(crate) async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}
