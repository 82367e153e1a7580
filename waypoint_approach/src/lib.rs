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

//! single-aircraft waypoint approach: a control session reads the latest vehicle state from a [`TelemetrySink`],
//! aligns the heading with the bearing to a [`NavigationTarget`], then drives forward through an [`ActuationPort`]
//! until the great-circle distance is within the arrival threshold.
//!
//! The vendor SDK is an external collaborator that pushes telemetry ([`TelemetryListener`]) and accepts commands
//! ([`ActuationPort`]). [`sim`] provides a kinematic stand-in for both

pub mod errors;
pub mod config;
pub mod telemetry;
pub mod actuation;
pub mod controller;
pub mod session;
pub mod sim;

pub use errors::{ApproachError, Result};
pub use config::{ApproachConfig, HeadingPolicy, load_config};
pub use telemetry::{Attitude, GroundVelocity, TelemetryListener, TelemetrySink, TelemetrySource, VehicleState};
pub use actuation::{ActuationPort, ControlCommand, ControlModes};
pub use controller::{AbortReason, ApproachReport, ApproachSession, ApproachState, NavigationTarget, SessionControl};
pub use session::{ApproachService, ApproachStatus, SessionHandle};
