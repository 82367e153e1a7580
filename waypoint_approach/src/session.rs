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

//! the invocation surface for the (external) UI layer: start an approach, query its status, abort it

use std::{collections::HashMap, sync::{Arc, Mutex, atomic::{AtomicU32, Ordering}}};
use serde::Serialize;
use tokio::{sync::watch, task::JoinHandle};
use waypoint_common::{geo::GeoCoordinate, info};

use crate::actuation::ActuationPort;
use crate::config::ApproachConfig;
use crate::controller::{AbortReason, ApproachReport, ApproachSession, ApproachState, NavigationTarget, SessionControl};
use crate::errors::{ApproachError, Result};
use crate::telemetry::TelemetrySink;

/// what the UI gets to see of a session
#[derive(Debug,Clone,Copy,PartialEq,Serialize)]
pub struct ApproachStatus {
    pub session_id: u32,
    pub state: ApproachState,
    pub abort_reason: Option<AbortReason>,
    pub distance_m: Option<f64>,
}

impl From<&SessionControl> for ApproachStatus {
    fn from (control: &SessionControl) -> Self {
        let state = control.state();
        ApproachStatus { session_id: control.id(), state, abort_reason: state.abort_reason(), distance_m: control.distance() }
    }
}

/// handle for a spawned session
pub struct SessionHandle {
    control: Arc<SessionControl>,
    task: JoinHandle<ApproachReport>,
}

impl SessionHandle {
    pub fn id (&self) -> u32 { self.control.id() }

    pub fn status (&self) -> ApproachStatus { ApproachStatus::from( self.control.as_ref()) }

    pub fn history (&self) -> Vec<ApproachState> { self.control.history() }

    /// state change notifications
    pub fn subscribe (&self) -> watch::Receiver<ApproachState> { self.control.subscribe() }

    /// cancel the session. After this returns no further command is sent
    pub async fn abort (&self) -> ApproachState { self.control.abort().await }

    /// wait for the session to finish
    pub async fn join (self) -> Result<ApproachReport> {
        Ok( self.task.await? )
    }
}

/// owns the shared collaborators and makes sure there is at most one active session at a time.
/// Only the last [`ApproachService::MAX_FINISHED_SESSIONS`] terminated sessions are kept for status queries
pub struct ApproachService {
    sink: Arc<TelemetrySink>,
    port: Arc<dyn ActuationPort>,
    config: ApproachConfig,

    next_id: AtomicU32,
    sessions: Mutex<HashMap<u32,Arc<SessionControl>>>,
}

impl ApproachService {
    pub const MAX_FINISHED_SESSIONS: usize = 16;

    pub fn new (sink: Arc<TelemetrySink>, port: Arc<dyn ActuationPort>, config: ApproachConfig) -> Self {
        ApproachService { sink, port, config, next_id: AtomicU32::new(1), sessions: Mutex::new( HashMap::new()) }
    }

    pub fn config (&self) -> &ApproachConfig { &self.config }

    pub fn sink (&self) -> &Arc<TelemetrySink> { &self.sink }

    /// start a new session for the given destination on the current tokio runtime.
    /// Fails if the target is invalid or another session has not terminated yet
    pub fn start_approach (&self, destination: GeoCoordinate, threshold_m: f64) -> Result<SessionHandle> {
        let target = NavigationTarget::new( destination, threshold_m)?;

        let mut sessions = self.sessions.lock().unwrap_or_else( |e| e.into_inner());
        if let Some(active) = sessions.values().find( |c| !c.state().is_terminal()) {
            return Err( ApproachError::SessionActive( active.id()))
        }

        Self::prune_finished( &mut sessions);

        let id = self.next_id.fetch_add( 1, Ordering::Relaxed);
        let session = ApproachSession::new( id, self.sink.clone(), self.port.clone(), self.config.clone(), target);
        let control = session.control();
        sessions.insert( id, control.clone());

        info!("starting session {} to {}", id, target);
        let task = tokio::spawn( session.run());
        Ok( SessionHandle { control, task } )
    }

    /// start with the configured default arrival threshold
    pub fn start_approach_default (&self, destination: GeoCoordinate) -> Result<SessionHandle> {
        self.start_approach( destination, self.config.arrival_threshold_m)
    }

    pub fn status (&self, id: u32) -> Result<ApproachStatus> {
        let control = self.session_control( id)?;
        Ok( ApproachStatus::from( control.as_ref()) )
    }

    pub async fn abort (&self, id: u32) -> Result<ApproachState> {
        let control = self.session_control( id)?;
        Ok( control.abort().await )
    }

    /// the currently running session, if any
    pub fn active_session (&self) -> Option<u32> {
        let sessions = self.sessions.lock().unwrap_or_else( |e| e.into_inner());
        sessions.values().find( |c| !c.state().is_terminal()).map( |c| c.id())
    }

    /// number of sessions we still can report on
    pub fn n_sessions (&self) -> usize {
        self.sessions.lock().unwrap_or_else( |e| e.into_inner()).len()
    }

    /// drop the oldest terminated sessions. Outstanding handles keep their own reference
    fn prune_finished (sessions: &mut HashMap<u32,Arc<SessionControl>>) {
        let mut finished: Vec<u32> = sessions.values().filter( |c| c.state().is_terminal()).map( |c| c.id()).collect();
        if finished.len() > Self::MAX_FINISHED_SESSIONS {
            finished.sort_unstable();
            for id in &finished[..finished.len() - Self::MAX_FINISHED_SESSIONS] {
                sessions.remove( id);
            }
        }
    }

    fn session_control (&self, id: u32) -> Result<Arc<SessionControl>> {
        let sessions = self.sessions.lock().unwrap_or_else( |e| e.into_inner());
        sessions.get( &id).cloned().ok_or( ApproachError::UnknownSession(id))
    }
}
