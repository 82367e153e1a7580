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

//! a kinematic stand-in for the vendor aircraft, used by the `fly_to` demo and integration tests.
//!
//! This is not a flight dynamics model. Commands are interpreted relative to the current heading: pitch is the
//! forward speed, roll the lateral (right) speed and vertical_throttle the climb rate, all in m/s. Yaw is an
//! absolute heading that we turn to, either instantly or with a bounded yaw rate. Position is integrated on the great circle

use std::{sync::{Arc, Mutex}, time::Duration};
use serde::{Serialize,Deserialize};
use async_trait::async_trait;
use tokio::task::JoinHandle;
use uom::si::{f64::Length, length::meter};
use waypoint_common::{angle::Angle360, geo::{self, GeoCoordinate}, debug, info};

use crate::actuation::{ActuationPort, ControlCommand, ControlModes, YawControlMode};
use crate::errors::{ApproachError, Result, actuation_error, op_failed};
use crate::telemetry::{Attitude, GroundVelocity, TelemetryListener, TelemetrySource, VehicleState};

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub start: GeoCoordinate,
    pub altitude_m: f64,
    pub heading_deg: f64,
    pub yaw_rate_deg_s: Option<f64>, // max turn rate, None turns instantly
    pub telemetry_interval: Duration, // simulation step and telemetry cadence
    pub connected: bool,              // false simulates "no aircraft"
    pub control_mode_available: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            start: GeoCoordinate::from_lat_lon_degrees( 37.4275, -122.1697),
            altitude_m: 20.0,
            heading_deg: 0.0,
            yaw_rate_deg_s: None,
            telemetry_interval: Duration::from_millis(20),
            connected: true,
            control_mode_available: true,
        }
    }
}

#[derive(Debug)]
struct SimState {
    position: GeoCoordinate,
    altitude_m: f64,
    heading: Angle360,
    commanded_yaw: Option<f64>,
    forward: f64,
    lateral: f64,
    climb: f64,
    control_enabled: bool,
    n_commands: u64,
}

/// the simulated vehicle. Implements [`ActuationPort`] directly, telemetry is produced by a [`SimTelemetrySource`]
#[derive(Debug)]
pub struct SimulatedAircraft {
    config: SimConfig,
    state: Mutex<SimState>,
}

impl SimulatedAircraft {
    pub fn new (config: SimConfig) -> Self {
        let state = SimState {
            position: config.start,
            altitude_m: config.altitude_m,
            heading: Angle360::from_degrees( config.heading_deg),
            commanded_yaw: None,
            forward: 0.0,
            lateral: 0.0,
            climb: 0.0,
            control_enabled: false,
            n_commands: 0,
        };
        SimulatedAircraft { config, state: Mutex::new(state) }
    }

    pub fn config (&self) -> &SimConfig { &self.config }

    fn lock (&self) -> std::sync::MutexGuard<'_,SimState> {
        self.state.lock().unwrap_or_else( |e| e.into_inner())
    }

    /// advance the simulation by `dt` and return the resulting vehicle state
    pub fn step (&self, dt: Duration) -> VehicleState {
        let dt = dt.as_secs_f64();
        let mut guard = self.lock();
        let s = &mut *guard;

        if let Some(yaw) = s.commanded_yaw {
            let turn = s.heading.turn_to( &Angle360::from_degrees( yaw));
            s.heading = match self.config.yaw_rate_deg_s {
                Some(rate) => {
                    let max_turn = rate.abs() * dt;
                    s.heading + turn.clamp( -max_turn, max_turn)
                }
                None => Angle360::from_degrees( yaw)
            };
        }

        let fwd = s.forward * dt;
        let lat = s.lateral * dt;
        if fwd != 0.0 || lat != 0.0 {
            let dir = s.heading.degrees() + lat.atan2( fwd).to_degrees();
            s.position = geo::destination( &s.position, dir, fwd.hypot( lat));
        }
        s.altitude_m += s.climb * dt;

        Self::vehicle_state_of( s)
    }

    /// current state without advancing time
    pub fn vehicle_state (&self) -> VehicleState {
        Self::vehicle_state_of( &self.lock())
    }

    pub fn n_commands (&self) -> u64 { self.lock().n_commands }

    pub fn is_control_enabled (&self) -> bool { self.lock().control_enabled }

    fn vehicle_state_of (s: &SimState) -> VehicleState {
        let h = s.heading.radians();
        let (sin_h, cos_h) = (h.sin(), h.cos());
        let velocity = GroundVelocity {
            north: s.forward * cos_h - s.lateral * sin_h,
            east: s.forward * sin_h + s.lateral * cos_h,
            down: -s.climb,
        };
        let attitude = Attitude { pitch: 0.0, roll: 0.0, yaw: s.heading.degrees() };

        VehicleState::new( s.position, Length::new::<meter>( s.altitude_m))
            .with_attitude( attitude)
            .with_velocity( velocity)
    }
}

#[async_trait]
impl ActuationPort for SimulatedAircraft {
    fn is_control_mode_available (&self) -> bool {
        self.config.connected && self.config.control_mode_available
    }

    async fn enable_control_mode (&self, modes: &ControlModes) -> Result<()> {
        if !self.is_control_mode_available() {
            return Err( actuation_error("virtual stick mode not available"))
        }
        if modes.yaw != YawControlMode::Angle {
            return Err( actuation_error( format!("unsupported yaw control mode {:?}", modes.yaw)))
        }
        info!("simulated aircraft control enabled ({})", modes);
        self.lock().control_enabled = true;
        Ok(())
    }

    async fn send (&self, command: ControlCommand) -> Result<()> {
        let mut s = self.lock();
        if !s.control_enabled {
            return Err( actuation_error("control mode not enabled"))
        }

        s.commanded_yaw = Some( command.yaw as f64);
        s.forward = command.pitch as f64;
        s.lateral = command.roll as f64;
        s.climb = command.vertical_throttle as f64;
        s.n_commands += 1;
        Ok(())
    }

    async fn disable_control_mode (&self) -> Result<()> {
        let mut s = self.lock();
        s.control_enabled = false;
        s.forward = 0.0;
        s.lateral = 0.0;
        s.climb = 0.0;
        s.commanded_yaw = None;
        debug!("simulated aircraft control released");
        Ok(())
    }
}

/// pushes simulated [`VehicleState`]s to a listener at the configured telemetry interval
pub struct SimTelemetrySource {
    aircraft: Arc<SimulatedAircraft>,
    task: Option<JoinHandle<()>>,
}

impl SimTelemetrySource {
    pub fn new (aircraft: Arc<SimulatedAircraft>) -> Self {
        SimTelemetrySource { aircraft, task: None }
    }

    pub fn is_monitoring (&self) -> bool { self.task.is_some() }
}

impl TelemetrySource for SimTelemetrySource {
    fn start_monitoring (&mut self, listener: Arc<dyn TelemetryListener>) -> Result<()> {
        if !self.aircraft.config.connected {
            return Err( ApproachError::TelemetrySourceUnavailable( "no aircraft connected".into()))
        }
        if self.task.is_some() {
            return Err( op_failed("already monitoring"))
        }
        let rt = tokio::runtime::Handle::try_current()
            .map_err( |e| ApproachError::TelemetrySourceUnavailable( e.to_string()))?;

        let aircraft = self.aircraft.clone();
        let dt = aircraft.config.telemetry_interval.max( Duration::from_millis(1));

        self.task = Some( rt.spawn( async move {
            let mut interval = tokio::time::interval( dt);
            loop {
                interval.tick().await;
                listener.on_state_update( aircraft.step( dt));
            }
        }));
        info!("monitoring simulated aircraft state");
        Ok(())
    }

    fn stop_monitoring (&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SimTelemetrySource {
    fn drop (&mut self) { self.stop_monitoring() }
}
