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

//! the outbound side: control commands, control mode configuration and the port that accepts them

use std::fmt;
use serde::{Serialize,Deserialize};
use async_trait::async_trait;

use crate::errors::Result;

/// one virtual-stick command. Units are defined by the configured [`ControlModes`]. With the default modes
/// pitch/roll are ground velocities (m/s), yaw is an absolute heading (degrees) and vertical_throttle a
/// vertical velocity (m/s)
#[derive(Debug,Clone,Copy,Default,PartialEq,Serialize,Deserialize)]
pub struct ControlCommand {
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    pub vertical_throttle: f32,
}

impl ControlCommand {
    pub fn new (pitch: f32, roll: f32, yaw: f32, vertical_throttle: f32) -> Self {
        ControlCommand { pitch, roll, yaw, vertical_throttle }
    }

    /// turn to heading `yaw` without translating
    pub fn orientation (yaw: f32) -> Self {
        ControlCommand { pitch: 0.0, roll: 0.0, yaw, vertical_throttle: 0.0 }
    }

    /// translate forward with given pitch while holding yaw
    pub fn forward (pitch: f32, yaw: f32) -> Self {
        ControlCommand { pitch, roll: 0.0, yaw, vertical_throttle: 0.0 }
    }

    pub fn is_translation (&self) -> bool {
        self.pitch != 0.0 || self.roll != 0.0 || self.vertical_throttle != 0.0
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "ControlCommand( pitch: {:.2}, roll: {:.2}, yaw: {:.2}, throttle: {:.2})", self.pitch, self.roll, self.yaw, self.vertical_throttle)
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum RollPitchControlMode { Angle, Velocity }

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum YawControlMode { Angle, AngularVelocity }

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum VerticalControlMode { Velocity, Position }

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum CoordinateSystem { Ground, Body }

/// control mode flags that are applied once when control is enabled (not per command)
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
#[serde(default)]
pub struct ControlModes {
    pub roll_pitch: RollPitchControlMode,
    pub yaw: YawControlMode,
    pub vertical: VerticalControlMode,
    pub coordinate_system: CoordinateSystem,
}

impl Default for ControlModes {
    fn default() -> Self {
        ControlModes {
            roll_pitch: RollPitchControlMode::Velocity,
            yaw: YawControlMode::Angle,
            vertical: VerticalControlMode::Velocity,
            coordinate_system: CoordinateSystem::Ground,
        }
    }
}

impl fmt::Display for ControlModes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "roll/pitch: {:?}, yaw: {:?}, vertical: {:?}, coordinates: {:?}", self.roll_pitch, self.yaw, self.vertical, self.coordinate_system)
    }
}

/// the abstract command sink, implemented by the vendor SDK adapter (or a simulator).
///
/// Ports are shared (`Arc<dyn ActuationPort>`), hence `&self` receivers. Each `send` is awaited to completion
/// before the caller proceeds - there is never more than one command in flight per session
#[async_trait]
pub trait ActuationPort: Send + Sync {
    /// can the vehicle be put into virtual-stick (velocity) control mode
    fn is_control_mode_available (&self) -> bool;

    /// enter virtual-stick control mode and apply the given mode flags
    async fn enable_control_mode (&self, modes: &ControlModes) -> Result<()>;

    /// forward one command. An Err means the command was rejected
    async fn send (&self, command: ControlCommand) -> Result<()>;

    /// leave virtual-stick control mode. This is not a command and is called at most once per session
    async fn disable_control_mode (&self) -> Result<()> { Ok(()) }
}
