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

use std::{path::PathBuf, sync::Arc, time::Duration};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use waypoint_common::{geo::GeoCoordinate, info, warn};
use waypoint_approach::{
    load_config, ApproachConfig, ApproachService, ApproachState, HeadingPolicy, TelemetrySink, TelemetrySource,
    sim::{SimConfig, SimTelemetrySource, SimulatedAircraft}
};

#[derive(Debug,Clone,Copy,ValueEnum)]
enum Heading { AlignOnce, HoldAligned, Continuous }

impl From<Heading> for HeadingPolicy {
    fn from (h: Heading) -> Self {
        match h {
            Heading::AlignOnce => HeadingPolicy::AlignOnce,
            Heading::HoldAligned => HeadingPolicy::HoldAligned,
            Heading::Continuous => HeadingPolicy::Continuous,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = "fly a simulated aircraft to the given target coordinates")]
pub struct Args {
    /// approach config (RON). Built-in defaults with hold-aligned heading if not set
    #[arg(short,long)]
    config: Option<PathBuf>,

    /// arrival threshold in meters (overrides config)
    #[arg(short,long)]
    threshold: Option<f64>,

    /// heading policy (overrides config)
    #[arg(long,value_enum)]
    heading: Option<Heading>,

    /// simulated start latitude in degrees. Defaults to a point 25m south-west of the target
    #[arg(long,allow_negative_numbers=true,requires="start_lon")]
    start_lat: Option<f64>,

    /// simulated start longitude in degrees
    #[arg(long,allow_negative_numbers=true,requires="start_lat")]
    start_lon: Option<f64>,

    /// max approach time in seconds before we abort
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// target latitude in degrees
    #[arg(allow_negative_numbers=true)]
    lat: f64,

    /// target longitude in degrees
    #[arg(allow_negative_numbers=true)]
    lon: f64,
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let mut config: ApproachConfig = match &args.config {
        Some(path) => load_config( path)?,
        None => ApproachConfig { heading_policy: HeadingPolicy::HoldAligned, ..ApproachConfig::default() }
    };
    if let Some(heading) = args.heading { config.heading_policy = heading.into() }

    let target = GeoCoordinate::try_from_lat_lon_degrees( args.lat, args.lon)?;
    let start = match (args.start_lat, args.start_lon) {
        (Some(lat), Some(lon)) => GeoCoordinate::try_from_lat_lon_degrees( lat, lon)?,
        _ => target.destination( 225.0, 25.0)
    };

    let aircraft = Arc::new( SimulatedAircraft::new( SimConfig { start, ..SimConfig::default() }));
    let sink = TelemetrySink::new_shared();
    let mut telemetry = SimTelemetrySource::new( aircraft.clone());
    telemetry.start_monitoring( sink.clone())?;

    let service = ApproachService::new( sink.clone(), aircraft.clone(), config);
    let threshold = args.threshold.unwrap_or( service.config().arrival_threshold_m);

    println!("flying from {} to {} ({:.1}m, policy {:?})", start, target, start.distance_to( &target), service.config().heading_policy);
    let handle = service.start_approach( target, threshold)?;

    let mut rx = handle.subscribe();
    let deadline = tokio::time::sleep( Duration::from_secs( args.timeout));
    tokio::pin!(deadline);

    while !rx.borrow_and_update().is_terminal() {
        tokio::select! {
            res = rx.changed() => {
                if res.is_err() { break }
                let state = *rx.borrow();
                if !state.is_terminal() { println!("  state: {}", state) }
            }
            _ = &mut deadline => {
                warn!("approach timed out after {}s", args.timeout);
                handle.abort().await;
            }
            _ = tokio::signal::ctrl_c() => {
                println!("  aborting..");
                handle.abort().await;
            }
        }
    }

    println!("  state: {}", *rx.borrow());

    let history = handle.history();
    let report = handle.join().await?;
    telemetry.stop_monitoring();

    println!("transitions: {}", history.iter().map( |s| s.to_string()).collect::<Vec<_>>().join(" -> "));
    println!("{}", ron::ser::to_string_pretty( &report, ron::ser::PrettyConfig::default())?);
    if let Some(state) = sink.latest() {
        println!("final {} ({:.2}m from target)", state, state.position.distance_to( &target));
    }

    if !report.arrived() {
        std::process::exit(1);
    }
    Ok(())
}
