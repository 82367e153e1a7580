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

use thiserror::Error;
use waypoint_common::GeoError;

pub type Result<T> = std::result::Result<T,ApproachError>;

/// errors for API misuse and collaborator failures. Note that the outcome of an approach session is not an
/// error - it is reported as a structured [`crate::AbortReason`] / [`crate::ApproachState`]
#[derive(Error,Debug)]
pub enum ApproachError {

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config error {0}")]
    ConfigError( #[from] ron::error::SpannedError),

    #[error("geo error {0}")]
    GeoError( #[from] GeoError),

    #[error("invalid target {0}")]
    InvalidTarget(String),

    #[error("telemetry source unavailable {0}")]
    TelemetrySourceUnavailable(String),

    #[error("actuation error {0}")]
    ActuationError(String),

    #[error("session {0} still active")]
    SessionActive(u32),

    #[error("unknown session {0}")]
    UnknownSession(u32),

    #[error("session task failed {0}")]
    JoinError( #[from] tokio::task::JoinError),

    #[error("operation failed {0}")]
    OpFailedError(String)
}

pub fn actuation_error (msg: impl ToString)->ApproachError {
    ApproachError::ActuationError(msg.to_string())
}

pub fn op_failed (msg: impl ToString)->ApproachError {
    ApproachError::OpFailedError(msg.to_string())
}
