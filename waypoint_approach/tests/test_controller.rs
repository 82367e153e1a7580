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

mod common;

use std::{sync::Arc, time::Duration};
use waypoint_common::geo::GeoCoordinate;
use waypoint_approach::{
    AbortReason, ActuationPort, ApproachConfig, ApproachSession, ApproachState, HeadingPolicy, NavigationTarget, TelemetrySink
};
use common::*;

use ApproachState::*;

/// tests for the approach state machine, run with "cargo test --test test_controller -- --nocapture"

fn session (sink: &Arc<TelemetrySink>, port: &Arc<ScriptedPort>, config: ApproachConfig, dest: GeoCoordinate, threshold: f64) -> ApproachSession {
    let target = NavigationTarget::new( dest, threshold).unwrap();
    let port: Arc<dyn ActuationPort> = port.clone();
    ApproachSession::new( 1, sink.clone(), port, config, target)
}

#[tokio::test]
async fn test_no_telemetry () {
    let sink = TelemetrySink::new_shared();
    let port = Arc::new( ScriptedPort::new());
    let s = session( &sink, &port, fast_config(), origin(), 1.0);
    let control = s.control();

    let report = s.run().await;
    println!("{report:?}");

    assert_eq!( report.state, Aborted( AbortReason::NoTelemetry));
    assert_eq!( control.history(), vec![Acquiring, Aborted( AbortReason::NoTelemetry)]);
    assert_eq!( port.n_sent(), 0);
    assert_eq!( port.n_enable(), 0);
    assert_eq!( port.n_disable(), 0);
}

#[tokio::test]
async fn test_arrival_after_one_forward () {
    let start = origin();
    let dest = start.destination( 90.0, 2.0);
    let sink = sink_at( start);

    let s2 = sink.clone();
    let port = Arc::new( ScriptedPort::new().on_send( move |idx, cmd| {
        if idx == 1 { s2.update( state_at( start.destination( 90.0, 1.5))) } // now 0.5m away
    }));

    let s = session( &sink, &port, fast_config(), dest, 1.0);
    let control = s.control();
    let report = s.run().await;
    println!("{report:?}");

    assert!( report.arrived());
    assert_eq!( control.history(), vec![Acquiring, Approaching, Arrived]);

    let sent = port.sent();
    assert_eq!( sent.len(), 2);
    assert!( !sent[0].is_translation()); // orientation first
    assert!( (sent[0].yaw - 90.0).abs() < 0.01);
    assert!( sent[1].is_translation());
    assert_eq!( sent[1].pitch, 5.0);
    assert_eq!( report.n_commands, 2);
    assert_eq!( report.n_ticks, 2);
    assert!( report.last_distance_m.unwrap() < 1.0);
    assert_eq!( port.n_disable(), 1);
}

#[tokio::test]
async fn test_already_within_threshold () {
    let start = origin();
    let sink = sink_at( start);
    let port = Arc::new( ScriptedPort::new());

    let report = session( &sink, &port, fast_config(), start, 1.0).run().await;

    assert!( report.arrived());
    assert_eq!( report.bearing_deg, Some(0.0));
    let sent = port.sent();
    assert_eq!( sent.len(), 1); // only the orientation command
    assert_eq!( sent[0].yaw, 0.0);
    assert!( !sent[0].is_translation());
}

#[tokio::test]
async fn test_control_mode_unavailable () {
    let sink = sink_at( origin());
    let port = Arc::new( ScriptedPort::new().unavailable());
    let s = session( &sink, &port, fast_config(), origin().destination( 0.0, 10.0), 1.0);
    let control = s.control();

    let report = s.run().await;

    assert_eq!( report.state, Aborted( AbortReason::ControlModeUnavailable));
    assert_eq!( control.history(), vec![Aborted( AbortReason::ControlModeUnavailable)]);
    assert_eq!( port.n_sent(), 0);
    assert_eq!( port.n_enable(), 0);
}

#[tokio::test]
async fn test_enable_failure () {
    let sink = sink_at( origin());
    let port = Arc::new( ScriptedPort::new().failing_enable());
    let s = session( &sink, &port, fast_config(), origin().destination( 0.0, 10.0), 1.0);
    let control = s.control();

    let report = s.run().await;

    assert_eq!( control.history(), vec![Acquiring, Aborted( AbortReason::ControlModeUnavailable)]);
    assert_eq!( port.n_enable(), 1);
    assert_eq!( port.n_sent(), 0);
    assert_eq!( port.n_disable(), 0); // never enabled, nothing to release
}

#[tokio::test]
async fn test_send_failure_is_fatal () {
    let sink = sink_at( origin());
    let port = Arc::new( ScriptedPort::new().failing_at(1)); // first forward command is rejected
    let s = session( &sink, &port, fast_config(), origin().destination( 45.0, 10.0), 1.0);
    let control = s.control();

    let report = s.run().await;
    println!("{report:?}");

    assert_eq!( report.state, Aborted( AbortReason::ActuationRejected));
    assert_eq!( control.history(), vec![Acquiring, Approaching, Aborted( AbortReason::ActuationRejected)]);
    assert_eq!( port.n_sent(), 2); // no retry
    assert_eq!( report.n_commands, 1);
    assert_eq!( port.n_disable(), 1);

    tokio::time::sleep( Duration::from_millis(20)).await;
    assert_eq!( port.n_sent(), 2);
}

#[tokio::test]
async fn test_telemetry_lost () {
    let start = origin();
    let sink = sink_at( start);

    let s2 = sink.clone();
    let port = Arc::new( ScriptedPort::new().on_send( move |idx, _| {
        if idx == 1 { s2.clear() }
    }));

    let s = session( &sink, &port, fast_config(), start.destination( 180.0, 10.0), 1.0);
    let control = s.control();
    let report = s.run().await;

    assert_eq!( report.state, Aborted( AbortReason::TelemetryLost));
    assert_eq!( control.history(), vec![Acquiring, Approaching, Aborted( AbortReason::TelemetryLost)]);
    assert_eq!( port.n_sent(), 2);
}

#[tokio::test]
async fn test_abort_stops_commands () {
    let sink = sink_at( origin());
    let port = Arc::new( ScriptedPort::new());
    let s = session( &sink, &port, paced_config(), origin().destination( 270.0, 50.0), 1.0);
    let control = s.control();

    let task = tokio::spawn( s.run());
    assert!( wait_for( || port.n_sent() >= 3).await);

    let state = control.abort().await;
    let n_sent = port.n_sent();
    println!("aborted after {n_sent} commands");
    assert_eq!( state, Aborted( AbortReason::Cancelled));

    tokio::time::sleep( Duration::from_millis(30)).await;
    assert_eq!( port.n_sent(), n_sent);

    let report = task.await.unwrap();
    assert_eq!( report.state, Aborted( AbortReason::Cancelled));
    assert_eq!( control.history(), vec![Acquiring, Approaching, Aborted( AbortReason::Cancelled)]);
    assert_eq!( port.n_sent(), n_sent);
    assert_eq!( port.n_disable(), 1);
}

#[tokio::test]
async fn test_abort_while_acquiring () {
    let sink = TelemetrySink::new_shared(); // never gets a sample
    let port = Arc::new( ScriptedPort::new());
    let config = ApproachConfig { acquire_attempts: 100, acquire_interval: Duration::from_millis(10), ..fast_config() };
    let s = session( &sink, &port, config, origin().destination( 0.0, 10.0), 1.0);
    let control = s.control();

    let task = tokio::spawn( s.run());
    assert!( wait_for( || control.state() == Acquiring).await);

    assert_eq!( control.abort().await, Aborted( AbortReason::Cancelled));
    let report = task.await.unwrap();
    println!("{report:?}");

    assert_eq!( report.state, Aborted( AbortReason::Cancelled));
    assert_eq!( control.history(), vec![Acquiring, Aborted( AbortReason::Cancelled)]);
    assert_eq!( port.n_sent(), 0);
    assert_eq!( port.n_enable(), 0);
    assert_eq!( port.n_disable(), 0);
}

#[tokio::test]
async fn test_orientation_rejected () {
    let sink = sink_at( origin());
    let port = Arc::new( ScriptedPort::new().failing_at(0));
    let s = session( &sink, &port, fast_config(), origin().destination( 90.0, 10.0), 1.0);
    let control = s.control();

    let report = s.run().await;
    println!("{report:?}");

    assert_eq!( report.state, Aborted( AbortReason::ActuationRejected));
    assert_eq!( control.history(), vec![Acquiring, Aborted( AbortReason::ActuationRejected)]);
    assert_eq!( port.n_sent(), 1); // the orientation command, never retried
    assert_eq!( report.n_commands, 0);
    assert_eq!( report.n_ticks, 0);
    assert_eq!( port.n_disable(), 1); // control was enabled before the rejection
}

#[tokio::test]
async fn test_terminal_state_is_sticky () {
    let start = origin();
    let sink = sink_at( start);
    let port = Arc::new( ScriptedPort::new());
    let s = session( &sink, &port, fast_config(), start, 1.0);
    let control = s.control();

    let report = s.run().await;
    assert!( report.arrived());

    assert_eq!( control.abort().await, Arrived);
    assert_eq!( control.state(), Arrived);
    assert_eq!( control.history(), vec![Acquiring, Approaching, Arrived]);
}

#[tokio::test]
async fn test_state_notifications () {
    let start = origin();
    let sink = sink_at( start);
    let port = Arc::new( ScriptedPort::new());
    let s = session( &sink, &port, fast_config(), start, 1.0);
    let control = s.control();
    let mut rx = control.subscribe();
    assert_eq!( *rx.borrow(), Idle);

    s.run().await;

    assert!( rx.has_changed().unwrap());
    assert_eq!( *rx.borrow_and_update(), Arrived);
}

/// run until the second forward command (index 2) gets rejected and return the first forward yaw
async fn forward_yaw (policy: HeadingPolicy) -> (f32, f32) {
    let start = origin();
    let dest = start.destination( 90.0, 10.0);
    let sink = sink_at( start);

    let s2 = sink.clone();
    let port = Arc::new( ScriptedPort::new().failing_at(2).on_send( move |idx, _| {
        if idx == 0 { s2.update( state_at( start.destination( 0.0, 10.0))) } // drift north while turning
    }));

    let config = ApproachConfig { heading_policy: policy, ..fast_config() };
    session( &sink, &port, config, dest, 1.0).run().await;

    let sent = port.sent();
    assert_eq!( sent.len(), 3);
    (sent[0].yaw, sent[1].yaw)
}

#[tokio::test]
async fn test_heading_policies () {
    let (orient, fwd) = forward_yaw( HeadingPolicy::AlignOnce).await;
    println!("align-once: {orient} {fwd}");
    assert!( (orient - 90.0).abs() < 0.01);
    assert_eq!( fwd, 0.0);

    let (orient, fwd) = forward_yaw( HeadingPolicy::HoldAligned).await;
    println!("hold-aligned: {orient} {fwd}");
    assert!( (fwd - 90.0).abs() < 0.01);

    let (orient, fwd) = forward_yaw( HeadingPolicy::Continuous).await;
    println!("continuous: {orient} {fwd}");
    assert!( (fwd - 135.0).abs() < 0.5);
}
