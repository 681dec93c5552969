//! Shared fixtures for console integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use console::traits::{CommandGateway, MockCommandGateway, MockTelemetryChannel, TelemetryChannel};
use console::{Console, ConsoleResult, ConsoleUpdate, TelemetryEvent};
use shared::{
    BridgeResponse, BridgeSnapshot, EnergyUpdateResponse, InitializeResponse, LockResponse,
    Material, PortalId, PortalSnapshot, ResponseStatus, ScanResponse, SetParametersResponse,
    SweepCandidate, SweepRequest, SystemState, SystemStatus, TransferResponse,
};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub type TestConsole = Console<MockTelemetryChannel, MockCommandGateway>;

/// Telemetry channel whose event stream the test scripts by hand
pub fn scripted_channel() -> (MockTelemetryChannel, mpsc::Sender<TelemetryEvent>) {
    let (tx, rx) = mpsc::channel(32);
    let mut channel = MockTelemetryChannel::new();
    channel.expect_connect().returning(|| Ok(()));
    channel.expect_updates().return_once(move || Ok(rx));
    channel.expect_disconnect().returning(|| Ok(()));
    channel.expect_is_connected().returning(|| true);
    (channel, tx)
}

/// Console wired to a scripted channel, with its run loop spawned
pub fn spawn_console(
    gateway: MockCommandGateway,
) -> (
    Arc<TestConsole>,
    mpsc::Sender<TelemetryEvent>,
    JoinHandle<ConsoleResult<()>>,
) {
    let (channel, tx) = scripted_channel();
    let console = Arc::new(Console::new(channel, gateway));
    let runner = {
        let console = console.clone();
        tokio::spawn(async move { console.run().await })
    };
    (console, tx, runner)
}

pub fn portal_snapshot(freq: f64) -> PortalSnapshot {
    PortalSnapshot {
        freq,
        stability: 0.97,
        power: 13_500.0,
        energy: 27_000.0,
        floor_temp: -196.0,
        floor_contact: true,
        safety_status: true,
        payload_volume: 0.1,
        payload_mass: 75.0,
        status_log: vec!["[INFO] Floor/coolant sensors OK.".to_string()],
    }
}

pub fn running_frame(strength: f64) -> SystemState {
    SystemState {
        status: SystemStatus::Running,
        run_id: Some("run_7".to_string()),
        portal1: Some(portal_snapshot(32.0)),
        portal2: Some(portal_snapshot(32.08)),
        bridge: BridgeSnapshot {
            strength,
            transfer_energy: 0.0,
            detune: 0.08,
            status_log: vec![],
        },
    }
}

/// Send a connect event and wait until the console has applied it
pub async fn connect<T, G>(console: &Arc<Console<T, G>>, tx: &mpsc::Sender<TelemetryEvent>)
where
    T: TelemetryChannel,
    G: CommandGateway,
{
    let mut updates = console.subscribe();
    tx.send(TelemetryEvent::Connected).await.unwrap();
    wait_for(&mut updates, |u| {
        matches!(u, ConsoleUpdate::ConnectionChanged { connected: true })
    })
    .await;
}

/// Send a frame and wait until the console has applied it
pub async fn push_frame(
    console: &Arc<TestConsole>,
    tx: &mpsc::Sender<TelemetryEvent>,
    frame: SystemState,
) {
    let mut updates = console.subscribe();
    tx.send(TelemetryEvent::Frame(Box::new(frame))).await.unwrap();
    wait_for(&mut updates, |u| matches!(u, ConsoleUpdate::Snapshot(_))).await;
}

/// Send a disconnect event and wait until the console has applied it
pub async fn push_disconnect(console: &Arc<TestConsole>, tx: &mpsc::Sender<TelemetryEvent>) {
    let mut updates = console.subscribe();
    tx.send(TelemetryEvent::Disconnected).await.unwrap();
    wait_for(&mut updates, |u| {
        matches!(u, ConsoleUpdate::ConnectionChanged { connected: false })
    })
    .await;
}

/// Wait for the first update matching the predicate
pub async fn wait_for<F>(
    updates: &mut tokio::sync::broadcast::Receiver<ConsoleUpdate>,
    predicate: F,
) -> ConsoleUpdate
where
    F: Fn(&ConsoleUpdate) -> bool,
{
    timeout(TEST_TIMEOUT, async {
        loop {
            let update = updates.recv().await.expect("update stream closed");
            if predicate(&update) {
                return update;
            }
        }
    })
    .await
    .expect("timed out waiting for console update")
}

pub fn success_lock(portal: PortalId) -> LockResponse {
    LockResponse {
        status: ResponseStatus::Success,
        message: None,
        portal: portal.number(),
        locked: true,
    }
}

pub fn candidate(freq: f64, strength: f64) -> SweepCandidate {
    SweepCandidate {
        freq1: freq,
        freq2: freq,
        energy1: 9_000.0,
        energy2: 9_000.0,
        bridge_strength: strength,
    }
}

/// Expect lock commands for the given portals to succeed
pub fn expect_locks(gateway: &mut MockCommandGateway, portals: &[PortalId]) {
    for &portal in portals {
        gateway
            .expect_lock_portal()
            .withf(move |p| *p == portal)
            .times(1)
            .returning(move |p| Ok(success_lock(p)));
    }
}

/// Gateway whose sweep blocks until the test releases it; every other
/// command is refused. Used to hold a sweep in flight deterministically.
pub struct BlockingSweepGateway {
    pub release: Arc<Notify>,
    pub sweep_calls: Arc<AtomicUsize>,
    results: Vec<SweepCandidate>,
}

impl BlockingSweepGateway {
    pub fn new(results: Vec<SweepCandidate>) -> Self {
        Self {
            release: Arc::new(Notify::new()),
            sweep_calls: Arc::new(AtomicUsize::new(0)),
            results,
        }
    }

    fn refused<T>(command: &'static str) -> ConsoleResult<T> {
        Err(console::ConsoleError::CommandFailed {
            command,
            message: "unexpected command in this test".to_string(),
        })
    }
}

#[async_trait]
impl CommandGateway for BlockingSweepGateway {
    async fn initialize(&self, _: f64, _: f64) -> ConsoleResult<InitializeResponse> {
        Self::refused("initialize")
    }

    async fn set_parameters(&self, _: f64, _: f64) -> ConsoleResult<SetParametersResponse> {
        Self::refused("set_parameters")
    }

    async fn update_energy(&self, _: f64) -> ConsoleResult<EnergyUpdateResponse> {
        Self::refused("update_energy")
    }

    async fn form_bridge(&self) -> ConsoleResult<BridgeResponse> {
        Self::refused("form_bridge")
    }

    async fn transfer_payload(&self) -> ConsoleResult<TransferResponse> {
        Self::refused("transfer_payload")
    }

    async fn parameter_sweep(&self, _: SweepRequest) -> ConsoleResult<Vec<SweepCandidate>> {
        self.sweep_calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(self.results.clone())
    }

    async fn apply_optimal(&self, _: SweepCandidate) -> ConsoleResult<()> {
        Self::refused("apply_optimal_parameters")
    }

    async fn scan_portal(&self, _: PortalId) -> ConsoleResult<ScanResponse> {
        Self::refused("scan_portal")
    }

    async fn lock_portal(&self, _: PortalId) -> ConsoleResult<LockResponse> {
        Self::refused("lock_portal")
    }

    async fn load_payload(&self, _: PortalId, _: Material, _: f64, _: f64) -> ConsoleResult<()> {
        Self::refused("load_payload")
    }
}
