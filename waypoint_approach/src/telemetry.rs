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

//! the inbound side: vehicle state snapshots and the synchronized slot that holds the latest one

use std::{fmt, sync::{Arc, Mutex, atomic::{AtomicU64, Ordering}}};
use serde::Serialize;
use uom::si::{f64::Length, length::meter};
use waypoint_common::{geo::GeoCoordinate, trace};

use crate::errors::Result;

/// vehicle attitude in degrees (opaque to the controller, passed through for observers)
#[derive(Debug,Clone,Copy,Default,PartialEq,Serialize)]
pub struct Attitude {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

/// ground referenced velocity in m/s
#[derive(Debug,Clone,Copy,Default,PartialEq,Serialize)]
pub struct GroundVelocity {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

impl GroundVelocity {
    pub fn ground_speed (&self) -> f64 { self.north.hypot( self.east) }
}

/// immutable snapshot of what the telemetry source reported
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct VehicleState {
    pub position: GeoCoordinate,
    pub altitude: Length,
    pub attitude: Attitude,
    pub velocity: Option<GroundVelocity>,
}

impl VehicleState {
    pub fn new (position: GeoCoordinate, altitude: Length) -> Self {
        VehicleState { position, altitude, attitude: Attitude::default(), velocity: None }
    }

    pub fn at_lat_lon_alt (lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        VehicleState::new( GeoCoordinate::from_lat_lon_degrees( lat_deg, lon_deg), Length::new::<meter>( alt_m))
    }

    pub fn with_attitude (mut self, attitude: Attitude) -> Self {
        self.attitude = attitude;
        self
    }

    pub fn with_velocity (mut self, velocity: GroundVelocity) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn altitude_meters (&self) -> f64 { self.altitude.get::<meter>() }
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "VehicleState( pos: {}, alt: {:.1}m, yaw: {:.1}", self.position, self.altitude_meters(), self.attitude.yaw)?;
        if let Some(v) = &self.velocity { write!( f, ", gs: {:.2}m/s", v.ground_speed())?; }
        write!( f, ")")
    }
}

/// the callback contract for telemetry producers. Has to be callable at any rate and from any thread
pub trait TelemetryListener: Send + Sync {
    fn on_state_update (&self, state: VehicleState);
}

/// the latest observed [`VehicleState`], shared between exactly one producer (the telemetry callback) and any
/// number of readers. Whole snapshots are swapped under a mutex so readers can never observe a torn state.
/// Note that neither `update` nor `latest` hold the lock for longer than a clone
#[derive(Debug,Default)]
pub struct TelemetrySink {
    latest: Mutex<Option<VehicleState>>,
    n_updates: AtomicU64,
}

impl TelemetrySink {
    pub fn new () -> Self { TelemetrySink::default() }

    pub fn new_shared () -> Arc<Self> { Arc::new( TelemetrySink::default()) }

    /// replace the latest snapshot. No validation - garbage in is the responsibility of the source
    pub fn update (&self, state: VehicleState) {
        trace!("vehicle altitude: {:.2} meters", state.altitude_meters());

        let mut latest = self.latest.lock().unwrap_or_else( |e| e.into_inner());
        *latest = Some(state);
        self.n_updates.fetch_add( 1, Ordering::Relaxed);
    }

    /// the most recent snapshot, or None if there never was an update (or the sink was reset)
    pub fn latest (&self) -> Option<VehicleState> {
        self.latest.lock().unwrap_or_else( |e| e.into_inner()).clone()
    }

    /// drop the current snapshot - subsequent reads return None until the next update
    pub fn clear (&self) {
        *self.latest.lock().unwrap_or_else( |e| e.into_inner()) = None;
    }

    pub fn n_updates (&self) -> u64 { self.n_updates.load( Ordering::Relaxed) }
}

impl TelemetryListener for TelemetrySink {
    fn on_state_update (&self, state: VehicleState) { self.update( state) }
}

/// the external collaborator that produces telemetry. `start_monitoring` registers the listener (the vendor
/// delegate pattern) and fails if there is no vehicle to monitor
pub trait TelemetrySource {
    fn start_monitoring (&mut self, listener: Arc<dyn TelemetryListener>) -> Result<()>;
    fn stop_monitoring (&mut self);
}
