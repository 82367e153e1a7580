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

use std::{path::Path, time::Duration};
use serde::{Serialize,Deserialize};

use crate::actuation::ControlModes;
use crate::errors::Result;

/// how the session handles heading after the initial alignment.
/// With the default (AlignOnce) forward commands carry yaw 0 and lateral drift is never compensated
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize,Deserialize)]
pub enum HeadingPolicy {
    /// align once during acquisition, forward commands carry yaw 0
    #[default]
    AlignOnce,
    /// align once, forward commands keep the initial bearing as yaw
    HoldAligned,
    /// recompute the bearing to the target each tick and use it as yaw
    Continuous,
}

/// configuration of approach sessions. All fields have defaults so that partial RON files are accepted
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct ApproachConfig {
    pub arrival_threshold_m: f64, // default arrival radius if the caller does not specify one
    pub forward_pitch: f32,       // magnitude of the forward translation command
    pub tick_interval: Duration,  // pause between control ticks (zero means we only yield)
    pub acquire_attempts: u32,    // how often we try to get an initial telemetry sample
    pub acquire_interval: Duration, // pause between acquisition attempts
    pub heading_policy: HeadingPolicy,
    pub control_modes: ControlModes,
}

impl Default for ApproachConfig {
    fn default() -> Self {
        ApproachConfig {
            arrival_threshold_m: 1.0,
            forward_pitch: 5.0,
            tick_interval: Duration::from_millis(50),
            acquire_attempts: 10,
            acquire_interval: Duration::from_millis(100),
            heading_policy: HeadingPolicy::AlignOnce,
            control_modes: ControlModes::default(),
        }
    }
}

/// load a RON config from the filesystem
pub fn load_config<C> (path: impl AsRef<Path>) -> Result<C> where C: for <'a> Deserialize<'a> {
    let data = std::fs::read( path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}
