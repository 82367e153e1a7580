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

use std::{fmt, cmp, ops};
use serde::{Serialize,Deserialize};

/// fold degrees into [-90,90] (latitude semantics - values beyond the poles are mirrored back)
#[inline]
pub fn normalize_90 (d:f64) -> f64 {
    let x = d % 360.0;

    if x < -90.0 { -180.0 - x }
    else if x > 90.0 { 180.0 - x }
    else { x }
}

/// fold degrees into [-180,180] (longitude semantics)
#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;

    if x < -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

/// fold degrees into [0,360). Note the second modulo - a tiny negative remainder would otherwise round up to 360.0
#[inline]
pub fn normalize_360 (d: f64) -> f64 {
    ((d % 360.0) + 360.0) % 360.0
}

/// signed smallest difference `to - from` in degrees, in [-180,180]
#[inline]
pub fn angle_difference (from: f64, to: f64) -> f64 {
    normalize_180( to - from)
}

/// a compass angle (degrees clockwise from true north) that is always normalized into [0,360)
#[derive(Copy,Clone,Default,Serialize,Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Angle360(f64);

impl Angle360 {
    pub const NORTH: Angle360 = Angle360(0.0);
    pub const EAST: Angle360 = Angle360(90.0);
    pub const SOUTH: Angle360 = Angle360(180.0);
    pub const WEST: Angle360 = Angle360(270.0);

    #[inline]
    pub fn from_degrees (deg: f64) -> Self { Angle360( normalize_360(deg)) }

    #[inline]
    pub fn from_radians (rad: f64) -> Self { Angle360( normalize_360( rad.to_degrees())) }

    #[inline] pub fn degrees (&self) -> f64 { self.0 }
    #[inline] pub fn radians (&self) -> f64 { self.0.to_radians() }

    #[inline] pub fn sin (&self) -> f64 { self.0.to_radians().sin() }
    #[inline] pub fn cos (&self) -> f64 { self.0.to_radians().cos() }

    /// the opposite direction
    pub fn reciprocal (&self) -> Self { Angle360::from_degrees( self.0 + 180.0) }

    /// signed turn in degrees [-180,180] that gets us from self to `other`
    pub fn turn_to (&self, other: &Angle360) -> f64 { angle_difference( self.0, other.0) }
}

impl From<f64> for Angle360 {
    fn from (deg: f64) -> Self { Angle360::from_degrees(deg) }
}

impl From<Angle360> for f64 {
    fn from (a: Angle360) -> Self { a.0 }
}

impl fmt::Display for Angle360 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.1}°", self.0) }
}

impl fmt::Debug for Angle360 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Angle360({})", self.0) }
}

impl cmp::PartialEq for Angle360 {
    fn eq(&self, other: &Self) -> bool { self.0 == other.0 }
}

impl cmp::PartialOrd for Angle360 {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> { self.0.partial_cmp( &other.0) }
}

//--- allowed num ops (results are re-normalized)

impl ops::Add<f64> for Angle360 {
    type Output = Self;
    fn add (self, rhs: f64) -> Self::Output { Angle360::from_degrees( self.0 + rhs) }
}

impl ops::Sub<f64> for Angle360 {
    type Output = Self;
    fn sub (self, rhs: f64) -> Self::Output { Angle360::from_degrees( self.0 - rhs) }
}
