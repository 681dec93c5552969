//! Main console implementation
//!
//! Orchestrates the telemetry channel, command gateway, and core state
//! machines using dependency injection. All shared state is owned here;
//! components never reach into each other directly; cross-component reads
//! (such as the transfer gate reading coupling strength) go through the
//! shared snapshot.

use tokio::sync::{broadcast, Mutex, RwLock};

use shared::{
    BridgeResponse, EnergyUpdateResponse, InitializeResponse, Material, PortalId, ScanResponse,
    SetParametersResponse, SweepCandidate, SweepRequest, SystemState, TransferResponse,
    FREQ_MAX_HZ, FREQ_MIN_HZ,
};

use crate::core::transport::{ensure_bridge_permitted, ensure_transfer_permitted};
use crate::core::{
    ConsoleState, LockStatus, PayloadDescriptor, PayloadLedger, SweepOptimizer, SweepPhase,
    TransportLocks,
};
use crate::error::{ConsoleError, ConsoleResult};
use crate::traits::{CommandGateway, TelemetryChannel};
use crate::types::{ConsoleUpdate, TelemetryEvent};

pub struct Console<T, G>
where
    T: TelemetryChannel,
    G: CommandGateway,
{
    telemetry: Mutex<T>,
    gateway: G,
    state: RwLock<ConsoleState>,
    optimizer: Mutex<SweepOptimizer>,
    locks: Mutex<TransportLocks>,
    ledger: Mutex<PayloadLedger>,
    update_tx: broadcast::Sender<ConsoleUpdate>,
}

impl<T, G> Console<T, G>
where
    T: TelemetryChannel,
    G: CommandGateway,
{
    pub fn new(telemetry: T, gateway: G) -> Self {
        let (update_tx, _) = broadcast::channel(100);
        Self {
            telemetry: Mutex::new(telemetry),
            gateway,
            state: RwLock::new(ConsoleState::new()),
            optimizer: Mutex::new(SweepOptimizer::new()),
            locks: Mutex::new(TransportLocks::new()),
            ledger: Mutex::new(PayloadLedger::new()),
            update_tx,
        }
    }

    /// Subscribe to operator-facing updates
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleUpdate> {
        self.update_tx.subscribe()
    }

    /// Connect the telemetry channel and process inbound events until the
    /// channel ends. Frames are applied in arrival order, each one fully
    /// before the next; commands issued concurrently do not block this
    /// loop.
    pub async fn run(&self) -> ConsoleResult<()> {
        let mut updates = {
            let mut telemetry = self.telemetry.lock().await;
            telemetry.connect().await?;
            telemetry.updates().await?
        };
        while let Some(event) = updates.recv().await {
            self.handle_telemetry(event).await;
        }
        Ok(())
    }

    /// Tear down the telemetry transport
    pub async fn shutdown(&self) -> ConsoleResult<()> {
        self.telemetry.lock().await.disconnect().await
    }

    async fn handle_telemetry(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::Connected => {
                if self.state.write().await.set_connected(true) {
                    let _ = self
                        .update_tx
                        .send(ConsoleUpdate::ConnectionChanged { connected: true });
                }
            }
            TelemetryEvent::Frame(frame) => {
                self.state.write().await.apply_frame((*frame).clone());
                let _ = self.update_tx.send(ConsoleUpdate::Snapshot(frame));
            }
            TelemetryEvent::Disconnected => {
                let changed = self.state.write().await.set_connected(false);
                if changed {
                    // A connection reset ends the lock session.
                    self.locks.lock().await.reset();
                    let _ = self
                        .update_tx
                        .send(ConsoleUpdate::ConnectionChanged { connected: false });
                }
            }
        }
    }

    // --- queries ---------------------------------------------------------

    pub async fn snapshot(&self) -> Option<SystemState> {
        self.state.read().await.snapshot().cloned()
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.is_connected()
    }

    pub async fn transport_ready(&self) -> bool {
        self.locks.lock().await.transport_ready()
    }

    pub async fn lock_status(&self, portal: PortalId) -> LockStatus {
        self.locks.lock().await.status(portal)
    }

    pub async fn sweep_phase(&self) -> SweepPhase {
        self.optimizer.lock().await.phase()
    }

    pub async fn sweep_results(&self) -> Vec<SweepCandidate> {
        self.optimizer.lock().await.results().to_vec()
    }

    pub async fn staged_payload(&self) -> Option<PayloadDescriptor> {
        self.ledger.lock().await.staged().cloned()
    }

    pub async fn assigned_payload(&self, portal: PortalId) -> Option<PayloadDescriptor> {
        self.ledger.lock().await.assigned(portal).cloned()
    }

    // --- session ---------------------------------------------------------

    /// Initialize a fresh run. Success starts a new session: locks, sweep
    /// results, and payload assignments all reset.
    pub async fn initialize(
        &self,
        payload_volume: f64,
        payload_mass: f64,
    ) -> ConsoleResult<InitializeResponse> {
        let response = self.surfaced(
            "initialize",
            self.gateway.initialize(payload_volume, payload_mass).await,
        )?;
        self.locks.lock().await.reset();
        self.optimizer.lock().await.reset();
        self.ledger.lock().await.reset();
        let _ = self.update_tx.send(ConsoleUpdate::SessionReset {
            run_id: response.run_id.clone(),
        });
        Ok(response)
    }

    /// Manual tuning: set both operating frequencies, validated against
    /// the apparatus band before any network call.
    pub async fn set_parameters(
        &self,
        frequency1: f64,
        frequency2: f64,
    ) -> ConsoleResult<SetParametersResponse> {
        if let Err(e) = validate_frequency(frequency1).and(validate_frequency(frequency2)) {
            return self.surfaced_err("set_parameters", e);
        }
        self.surfaced(
            "set_parameters",
            self.gateway.set_parameters(frequency1, frequency2).await,
        )
    }

    pub async fn update_energy(&self, dt: f64) -> ConsoleResult<EnergyUpdateResponse> {
        if !(dt > 0.0) {
            return self.surfaced_err(
                "update_energy",
                ConsoleError::InvalidParameter {
                    message: format!("dt must be positive, got {dt}"),
                },
            );
        }
        self.surfaced("update_energy", self.gateway.update_energy(dt).await)
    }

    pub async fn scan(&self, portal: PortalId) -> ConsoleResult<ScanResponse> {
        self.surfaced("scan_portal", self.gateway.scan_portal(portal).await)
    }

    // --- sweep optimizer -------------------------------------------------

    /// Run one parameter sweep over the requested neighborhood. A second
    /// sweep while one is in flight is rejected locally; the rejection is
    /// an invariant, not a UI nicety.
    pub async fn run_sweep(&self, request: SweepRequest) -> ConsoleResult<usize> {
        if let Err(e) = validate_sweep_request(&request) {
            return self.surfaced_err("parameter_sweep", e);
        }
        if let Err(e) = self.optimizer.lock().await.begin() {
            return self.surfaced_err("parameter_sweep", e);
        }
        match self.gateway.parameter_sweep(request).await {
            Ok(results) => {
                let candidates = results.len();
                let best_strength = results
                    .iter()
                    .map(|c| c.bridge_strength)
                    .fold(None, |best: Option<f64>, s| {
                        Some(best.map_or(s, |b| b.max(s)))
                    });
                self.optimizer.lock().await.complete(results);
                let _ = self.update_tx.send(ConsoleUpdate::SweepCompleted {
                    candidates,
                    best_strength,
                });
                Ok(candidates)
            }
            Err(error) => {
                self.optimizer.lock().await.fail();
                self.surfaced_err("parameter_sweep", error)
            }
        }
    }

    /// Apply the strongest candidate from the last sweep. Results are kept
    /// so the operator may apply the same optimum again.
    pub async fn apply_optimal(&self) -> ConsoleResult<SweepCandidate> {
        let candidate = {
            let optimizer = self.optimizer.lock().await;
            match optimizer.select_optimal() {
                Ok(candidate) => candidate.clone(),
                Err(e) => return self.surfaced_err("apply_optimal_parameters", e),
            }
        };
        self.surfaced(
            "apply_optimal_parameters",
            self.gateway.apply_optimal(candidate.clone()).await,
        )?;
        Ok(candidate)
    }

    // --- transport locks -------------------------------------------------

    /// Lock one endpoint for transport. Locked is terminal for the session.
    pub async fn lock(&self, portal: PortalId) -> ConsoleResult<()> {
        if let Err(e) = self.locks.lock().await.ensure_can_lock(portal) {
            return self.surfaced_err("lock_portal", e);
        }
        let response = self.surfaced("lock_portal", self.gateway.lock_portal(portal).await)?;
        if !response.locked {
            // A success envelope without the confirmation flag is a refusal.
            return self.surfaced_err(
                "lock_portal",
                ConsoleError::CommandFailed {
                    command: "lock_portal",
                    message: response
                        .message
                        .unwrap_or_else(|| format!("{portal} refused the transport lock")),
                },
            );
        }
        let transport_ready = {
            let mut locks = self.locks.lock().await;
            locks.mark_locked(portal);
            locks.transport_ready()
        };
        let _ = self.update_tx.send(ConsoleUpdate::LockChanged {
            portal,
            status: LockStatus::Locked,
            transport_ready,
        });
        Ok(())
    }

    /// Form the bridge. Requires both endpoints locked and a live channel.
    pub async fn form_bridge(&self) -> ConsoleResult<BridgeResponse> {
        let gate = {
            let locks = self.locks.lock().await;
            let connected = self.state.read().await.is_connected();
            ensure_bridge_permitted(&locks, connected)
        };
        if let Err(e) = gate {
            return self.surfaced_err("form_bridge", e);
        }
        self.surfaced("form_bridge", self.gateway.form_bridge().await)
    }

    /// Attempt the payload transfer. Joint readiness is necessary but not
    /// sufficient: the coupling strength is re-read from the latest
    /// snapshot at this moment, never cached from an earlier reading.
    pub async fn transfer(&self) -> ConsoleResult<TransferResponse> {
        let gate = {
            let locks = self.locks.lock().await;
            let live_strength = self.state.read().await.live_bridge_strength();
            ensure_transfer_permitted(&locks, live_strength)
        };
        if let Err(e) = gate {
            return self.surfaced_err("transfer_payload", e);
        }
        let response = self.surfaced("transfer_payload", self.gateway.transfer_payload().await)?;
        let _ = self.update_tx.send(ConsoleUpdate::TransferAttempted {
            accepted: response.transfer_result,
            bridge_strength: response.bridge_strength,
        });
        Ok(response)
    }

    // --- payload ledger --------------------------------------------------

    pub async fn stage_payload(
        &self,
        material: Material,
        volume_m3: f64,
    ) -> ConsoleResult<PayloadDescriptor> {
        let result = self
            .ledger
            .lock()
            .await
            .stage(material, volume_m3)
            .map(|d| d.clone());
        self.surfaced("stage_payload", result)
    }

    pub async fn set_staged_volume(&self, volume_m3: f64) -> ConsoleResult<PayloadDescriptor> {
        let result = self
            .ledger
            .lock()
            .await
            .set_volume(volume_m3)
            .map(|d| d.clone());
        self.surfaced("stage_payload", result)
    }

    pub async fn set_staged_mass(&self, mass_kg: f64) -> ConsoleResult<PayloadDescriptor> {
        let result = self
            .ledger
            .lock()
            .await
            .set_mass(mass_kg)
            .map(|d| d.clone());
        self.surfaced("stage_payload", result)
    }

    pub async fn set_staged_material(&self, material: Material) -> ConsoleResult<PayloadDescriptor> {
        let result = self
            .ledger
            .lock()
            .await
            .set_material(material)
            .map(|d| d.clone());
        self.surfaced("stage_payload", result)
    }

    /// Commit the staged payload to one endpoint. The ledger stays locked
    /// across the exchange so exactly one commit per unoccupied endpoint
    /// can be in flight; on failure staging is left untouched.
    pub async fn commit_payload(&self, portal: PortalId) -> ConsoleResult<PayloadDescriptor> {
        let mut ledger = self.ledger.lock().await;
        let descriptor = match ledger.ensure_can_commit(portal) {
            Ok(descriptor) => descriptor.clone(),
            Err(e) => return self.surfaced_err("load_payload", e),
        };
        if let Err(e) = self
            .gateway
            .load_payload(
                portal,
                descriptor.material,
                descriptor.volume_m3,
                descriptor.mass_kg,
            )
            .await
        {
            return self.surfaced_err("load_payload", e);
        }
        let committed = self.surfaced("load_payload", ledger.commit(portal))?;
        let _ = self
            .update_tx
            .send(ConsoleUpdate::PayloadCommitted { portal });
        Ok(committed)
    }

    // --- error surfacing -------------------------------------------------

    /// Push a failed result to the operator update stream before returning
    /// it, so command and precondition failures are always observable.
    fn surfaced<R>(&self, command: &'static str, result: ConsoleResult<R>) -> ConsoleResult<R> {
        if let Err(error) = &result {
            let _ = self.update_tx.send(ConsoleUpdate::CommandError {
                command,
                message: error.to_string(),
            });
        }
        result
    }

    fn surfaced_err<R>(&self, command: &'static str, error: ConsoleError) -> ConsoleResult<R> {
        self.surfaced(command, Err(error))
    }
}

fn validate_frequency(frequency: f64) -> ConsoleResult<()> {
    if (FREQ_MIN_HZ..=FREQ_MAX_HZ).contains(&frequency) {
        Ok(())
    } else {
        Err(ConsoleError::InvalidParameter {
            message: format!(
                "frequency must be within {FREQ_MIN_HZ}-{FREQ_MAX_HZ} Hz, got {frequency}"
            ),
        })
    }
}

fn validate_sweep_request(request: &SweepRequest) -> ConsoleResult<()> {
    validate_frequency(request.base_freq)?;
    if !(request.range > 0.0) {
        return Err(ConsoleError::InvalidParameter {
            message: format!("sweep range must be positive, got {}", request.range),
        });
    }
    if request.steps == 0 {
        return Err(ConsoleError::InvalidParameter {
            message: "sweep needs at least one step".to_string(),
        });
    }
    Ok(())
}
