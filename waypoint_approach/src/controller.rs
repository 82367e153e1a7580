/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! the approach state machine.
//!
//! A session runs `Idle -> Acquiring -> Approaching -> Arrived`, or ends in `Aborted(reason)` from any non-terminal state.
//! The control policy is "align once, then drive straight and re-check the distance each tick":
//!   - Acquiring: wait (bounded) for a first telemetry sample, enable control mode and send one orientation command
//!     with the initial bearing to the target
//!   - Approaching: each tick reads the latest telemetry, stops if we are within the arrival threshold, otherwise sends
//!     one forward command. Telemetry that disappears mid-approach is fatal (no retries), as is a rejected command
//!
//! Cancellation is cooperative. It is checked at every tick boundary and right before each command, under a command
//! gate that [`SessionControl::abort`] also acquires - once `abort()` returns no further command can go out.
//! Commands that are already in flight are not preempted

use std::{fmt, sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}}};
use serde::Serialize;
use tokio::sync::watch;
use waypoint_common::{angle::Angle360, geo::{self, GeoCoordinate}, debug, info, warn};

use crate::actuation::{ActuationPort, ControlCommand};
use crate::config::{ApproachConfig, HeadingPolicy};
use crate::errors::{ApproachError, Result};
use crate::telemetry::{TelemetrySink, VehicleState};

/* #region target and states ***********************************************************************************/

/// where we want to go, and how close is close enough. Immutable for the duration of one approach
#[derive(Debug,Clone,Copy,PartialEq,Serialize)]
pub struct NavigationTarget {
    pub destination: GeoCoordinate,
    pub arrival_threshold_m: f64,
}

impl NavigationTarget {
    pub const DEFAULT_THRESHOLD_M: f64 = 1.0;

    pub fn new (destination: GeoCoordinate, arrival_threshold_m: f64) -> Result<Self> {
        if !destination.is_valid() {
            return Err( ApproachError::InvalidTarget( format!("destination {destination} out of range")))
        }
        if !arrival_threshold_m.is_finite() || arrival_threshold_m <= 0.0 {
            return Err( ApproachError::InvalidTarget( format!("arrival threshold {arrival_threshold_m} not positive")))
        }
        Ok( NavigationTarget { destination, arrival_threshold_m } )
    }

    pub fn with_default_threshold (destination: GeoCoordinate) -> Result<Self> {
        NavigationTarget::new( destination, Self::DEFAULT_THRESHOLD_M)
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{} (±{}m)", self.destination, self.arrival_threshold_m)
    }
}

/// why a session ended without arriving. This is what the UI layer renders
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize)]
pub enum AbortReason {
    ControlModeUnavailable,
    NoTelemetry,
    TelemetryLost,
    ActuationRejected,
    Cancelled,
}

impl AbortReason {
    /// all reasons except an explicit cancellation are failures
    pub fn is_failure (&self) -> bool { *self != AbortReason::Cancelled }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AbortReason::ControlModeUnavailable => "virtual stick control mode not available",
            AbortReason::NoTelemetry => "no telemetry received",
            AbortReason::TelemetryLost => "telemetry lost during approach",
            AbortReason::ActuationRejected => "control command rejected",
            AbortReason::Cancelled => "cancelled",
        };
        write!( f, "{msg}")
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize)]
pub enum ApproachState {
    #[default]
    Idle,
    Acquiring,
    Approaching,
    Arrived,
    Aborted(AbortReason),
}

impl ApproachState {
    pub fn is_terminal (&self) -> bool {
        matches!( self, ApproachState::Arrived | ApproachState::Aborted(_))
    }

    pub fn abort_reason (&self) -> Option<AbortReason> {
        if let ApproachState::Aborted(reason) = self { Some(*reason) } else { None }
    }
}

impl fmt::Display for ApproachState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApproachState::Aborted(reason) => write!( f, "Aborted({reason})"),
            other => write!( f, "{other:?}")
        }
    }
}

/* #endregion target and states */

/* #region SessionControl **************************************************************************************/

/// the part of a session that is shared with handles: current state (observable through a watch channel),
/// transition history, last known distance and the cancellation flag/gate
#[derive(Debug)]
pub struct SessionControl {
    id: u32,
    state: watch::Sender<ApproachState>,
    history: Mutex<Vec<ApproachState>>,
    distance: Mutex<Option<f64>>,
    cancelled: AtomicBool,
    command_gate: tokio::sync::Mutex<()>,
}

impl SessionControl {
    pub fn new (id: u32) -> Self {
        let (state,_) = watch::channel( ApproachState::Idle);
        SessionControl {
            id,
            state,
            history: Mutex::new( Vec::new()),
            distance: Mutex::new( None),
            cancelled: AtomicBool::new( false),
            command_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn id (&self) -> u32 { self.id }

    pub fn state (&self) -> ApproachState { *self.state.borrow() }

    pub fn subscribe (&self) -> watch::Receiver<ApproachState> { self.state.subscribe() }

    /// all states we transitioned into (excluding the initial Idle), in order
    pub fn history (&self) -> Vec<ApproachState> {
        self.history.lock().unwrap_or_else( |e| e.into_inner()).clone()
    }

    pub fn distance (&self) -> Option<f64> {
        *self.distance.lock().unwrap_or_else( |e| e.into_inner())
    }

    fn set_distance (&self, d: f64) {
        *self.distance.lock().unwrap_or_else( |e| e.into_inner()) = Some(d);
    }

    pub fn is_cancelled (&self) -> bool { self.cancelled.load( Ordering::Acquire) }

    /// terminal states are sticky - once we are Arrived or Aborted nothing overwrites it.
    /// Returns true if the state was changed
    fn transition (&self, new_state: ApproachState) -> bool {
        let changed = self.state.send_if_modified( |state| {
            if state.is_terminal() || *state == new_state {
                false
            } else {
                *state = new_state;
                self.history.lock().unwrap_or_else( |e| e.into_inner()).push( new_state);
                true
            }
        });

        if changed {
            match new_state {
                ApproachState::Aborted(reason) if reason.is_failure() => warn!("session {} aborted: {}", self.id, reason),
                _ => info!("session {} -> {}", self.id, new_state)
            }
        }
        changed
    }

    /// external cancellation. Waits for a command that is currently in flight, after that no command is sent anymore.
    /// Returns the resulting state (which is only `Aborted(Cancelled)` if the session was not terminal yet)
    pub async fn abort (&self) -> ApproachState {
        let _gate = self.command_gate.lock().await;
        self.cancelled.store( true, Ordering::Release);
        self.transition( ApproachState::Aborted( AbortReason::Cancelled));
        self.state()
    }
}

/* #endregion SessionControl */

/* #region ApproachSession *************************************************************************************/

/// summary of a finished session
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct ApproachReport {
    pub session_id: u32,
    pub target: NavigationTarget,
    pub state: ApproachState,
    pub n_ticks: u64,
    pub n_commands: u64,
    pub last_distance_m: Option<f64>,
    pub bearing_deg: Option<f64>,
}

impl ApproachReport {
    pub fn arrived (&self) -> bool { self.state == ApproachState::Arrived }
}

type Step<T> = std::result::Result<T,AbortReason>;

/// the runtime instance of one approach. Shares (but does not own) the telemetry sink and the actuation port
pub struct ApproachSession {
    control: Arc<SessionControl>,
    sink: Arc<TelemetrySink>,
    port: Arc<dyn ActuationPort>,
    config: ApproachConfig,
    target: NavigationTarget,

    bearing: Option<Angle360>,  // the initial (or, for Continuous policy, last) bearing to the target
    control_enabled: bool,
    n_ticks: u64,
    n_commands: u64,
}

impl ApproachSession {
    pub fn new (id: u32, sink: Arc<TelemetrySink>, port: Arc<dyn ActuationPort>, config: ApproachConfig, target: NavigationTarget) -> Self {
        ApproachSession {
            control: Arc::new( SessionControl::new(id)),
            sink,
            port,
            config,
            target,
            bearing: None,
            control_enabled: false,
            n_ticks: 0,
            n_commands: 0,
        }
    }

    pub fn control (&self) -> Arc<SessionControl> { self.control.clone() }

    pub fn target (&self) -> &NavigationTarget { &self.target }

    /// drive the session to a terminal state
    pub async fn run (mut self) -> ApproachReport {
        info!("session {} approaching {}", self.control.id, self.target);

        let outcome = match self.execute().await {
            Ok(()) => ApproachState::Arrived,
            Err(reason) => ApproachState::Aborted(reason)
        };
        self.control.transition( outcome);

        if self.control_enabled {
            if let Err(e) = self.port.disable_control_mode().await {
                warn!("session {} failed to release control mode: {}", self.control.id, e)
            }
        }

        let report = ApproachReport {
            session_id: self.control.id,
            target: self.target,
            state: self.control.state(),
            n_ticks: self.n_ticks,
            n_commands: self.n_commands,
            last_distance_m: self.control.distance(),
            bearing_deg: self.bearing.map( |b| b.degrees()),
        };
        info!("session {} finished: {} after {} ticks, {} commands", report.session_id, report.state, report.n_ticks, report.n_commands);
        report
    }

    async fn execute (&mut self) -> Step<()> {
        if !self.port.is_control_mode_available() {
            return Err( AbortReason::ControlModeUnavailable)
        }
        self.enter( ApproachState::Acquiring)?;

        let initial = self.acquire().await?;
        self.enable_control().await?;

        let bearing = geo::bearing( &initial.position, &self.target.destination);
        self.bearing = Some(bearing);
        debug!("session {} initial position {}, bearing {}", self.control.id, initial.position, bearing);
        self.issue( ControlCommand::orientation( bearing.degrees() as f32)).await?;

        self.enter( ApproachState::Approaching)?;
        loop {
            self.check_cancelled()?;
            if self.tick().await? {
                return Ok(())
            }
            self.pace().await;
        }
    }

    /// bounded wait for the first telemetry sample
    async fn acquire (&mut self) -> Step<VehicleState> {
        let n_attempts = self.config.acquire_attempts.max(1);

        for attempt in 1..=n_attempts {
            self.check_cancelled()?;
            if let Some(state) = self.sink.latest() {
                return Ok(state)
            }
            debug!("session {} no telemetry yet (attempt {}/{})", self.control.id, attempt, n_attempts);
            if attempt < n_attempts {
                tokio::time::sleep( self.config.acquire_interval).await;
            }
        }
        Err( AbortReason::NoTelemetry)
    }

    async fn enable_control (&mut self) -> Step<()> {
        self.check_cancelled()?;
        match self.port.enable_control_mode( &self.config.control_modes).await {
            Ok(()) => {
                self.control_enabled = true;
                debug!("session {} control modes set: {}", self.control.id, self.config.control_modes);
                Ok(())
            }
            Err(e) => {
                warn!("session {} failed to enable control mode: {}", self.control.id, e);
                Err( AbortReason::ControlModeUnavailable)
            }
        }
    }

    /// one read-decide-act cycle. Returns true if we arrived
    async fn tick (&mut self) -> Step<bool> {
        self.n_ticks += 1;

        let state = self.sink.latest().ok_or( AbortReason::TelemetryLost)?;
        let dist = geo::distance( &state.position, &self.target.destination);
        self.control.set_distance( dist);

        if dist < self.target.arrival_threshold_m {
            debug!("session {} tick {}: {:.2}m to target, arrived", self.control.id, self.n_ticks, dist);
            return Ok(true)
        }

        let yaw = match self.config.heading_policy {
            HeadingPolicy::AlignOnce => 0.0,
            HeadingPolicy::HoldAligned => self.bearing.map( |b| b.degrees()).unwrap_or(0.0),
            HeadingPolicy::Continuous => {
                let b = geo::bearing( &state.position, &self.target.destination);
                self.bearing = Some(b);
                b.degrees()
            }
        };

        debug!("session {} tick {}: {:.2}m to target", self.control.id, self.n_ticks, dist);
        self.issue( ControlCommand::forward( self.config.forward_pitch, yaw as f32)).await?;
        Ok(false)
    }

    /// send exactly one command, never retried. The gate makes the cancellation check and the send atomic with respect to abort()
    async fn issue (&mut self, cmd: ControlCommand) -> Step<()> {
        let _gate = self.control.command_gate.lock().await;
        if self.control.is_cancelled() {
            return Err( AbortReason::Cancelled)
        }

        match self.port.send( cmd).await {
            Ok(()) => {
                self.n_commands += 1;
                Ok(())
            }
            Err(e) => {
                warn!("session {} {} rejected: {}", self.control.id, cmd, e);
                Err( AbortReason::ActuationRejected)
            }
        }
    }

    fn enter (&self, state: ApproachState) -> Step<()> {
        self.check_cancelled()?;
        self.control.transition( state);
        Ok(())
    }

    fn check_cancelled (&self) -> Step<()> {
        if self.control.is_cancelled() { Err( AbortReason::Cancelled) } else { Ok(()) }
    }

    async fn pace (&self) {
        if self.config.tick_interval.is_zero() {
            tokio::task::yield_now().await
        } else {
            tokio::time::sleep( self.config.tick_interval).await
        }
    }
}

/* #endregion ApproachSession */
