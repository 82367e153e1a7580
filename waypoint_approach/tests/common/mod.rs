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

#![allow(unused)]

//! scripted collaborators shared by the integration tests

use std::{sync::{Arc, Mutex, atomic::{AtomicUsize, Ordering}}, time::Duration};
use async_trait::async_trait;
use uom::si::{f64::Length, length::meter};
use waypoint_common::geo::GeoCoordinate;
use waypoint_approach::{
    errors::actuation_error, ActuationPort, ApproachConfig, ControlCommand, ControlModes, Result, TelemetrySink, VehicleState
};

pub type SendHook = Box<dyn Fn(usize,&ControlCommand) + Send + Sync>;

/// an ActuationPort that records every send attempt (including rejected ones) and can be scripted to
/// fail or to react to commands
pub struct ScriptedPort {
    pub available: bool,
    pub enable_fails: bool,
    pub fail_at: Option<usize>, // 0-based index of the send attempt that gets rejected
    pub on_send: Option<SendHook>,

    sent: Mutex<Vec<ControlCommand>>,
    n_enable: AtomicUsize,
    n_disable: AtomicUsize,
}

impl ScriptedPort {
    pub fn new () -> Self {
        ScriptedPort {
            available: true,
            enable_fails: false,
            fail_at: None,
            on_send: None,
            sent: Mutex::new( Vec::new()),
            n_enable: AtomicUsize::new(0),
            n_disable: AtomicUsize::new(0),
        }
    }

    pub fn unavailable (mut self) -> Self { self.available = false; self }
    pub fn failing_enable (mut self) -> Self { self.enable_fails = true; self }
    pub fn failing_at (mut self, idx: usize) -> Self { self.fail_at = Some(idx); self }

    pub fn on_send (mut self, f: impl Fn(usize,&ControlCommand) + Send + Sync + 'static) -> Self {
        self.on_send = Some( Box::new(f));
        self
    }

    pub fn sent (&self) -> Vec<ControlCommand> { self.sent.lock().unwrap().clone() }
    pub fn n_sent (&self) -> usize { self.sent.lock().unwrap().len() }
    pub fn n_enable (&self) -> usize { self.n_enable.load( Ordering::SeqCst) }
    pub fn n_disable (&self) -> usize { self.n_disable.load( Ordering::SeqCst) }
}

#[async_trait]
impl ActuationPort for ScriptedPort {
    fn is_control_mode_available (&self) -> bool { self.available }

    async fn enable_control_mode (&self, _modes: &ControlModes) -> Result<()> {
        self.n_enable.fetch_add( 1, Ordering::SeqCst);
        if self.enable_fails { Err( actuation_error("enable refused")) } else { Ok(()) }
    }

    async fn send (&self, command: ControlCommand) -> Result<()> {
        let idx = {
            let mut sent = self.sent.lock().unwrap();
            sent.push( command);
            sent.len() - 1
        };
        if let Some(f) = &self.on_send { f( idx, &command) }

        if self.fail_at == Some(idx) { Err( actuation_error("command rejected")) } else { Ok(()) }
    }

    async fn disable_control_mode (&self) -> Result<()> {
        self.n_disable.fetch_add( 1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn origin () -> GeoCoordinate { GeoCoordinate::from_lat_lon_degrees( 37.4275, -122.1697) }

pub fn state_at (pos: GeoCoordinate) -> VehicleState {
    VehicleState::new( pos, Length::new::<meter>( 10.0))
}

pub fn sink_at (pos: GeoCoordinate) -> Arc<TelemetrySink> {
    let sink = TelemetrySink::new_shared();
    sink.update( state_at( pos));
    sink
}

/// no pauses between ticks, quick acquisition timeout
pub fn fast_config () -> ApproachConfig {
    ApproachConfig {
        tick_interval: Duration::ZERO,
        acquire_attempts: 3,
        acquire_interval: Duration::from_millis(1),
        ..ApproachConfig::default()
    }
}

/// paced ticks so that tests can interleave with a running session
pub fn paced_config () -> ApproachConfig {
    ApproachConfig { tick_interval: Duration::from_millis(5), ..fast_config() }
}

/// poll until `cond` holds or we give up after ~2sec
pub async fn wait_for (cond: impl Fn()->bool) -> bool {
    for _ in 0..400 {
        if cond() { return true }
        tokio::time::sleep( Duration::from_millis(5)).await;
    }
    cond()
}
