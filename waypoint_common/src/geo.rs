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

//! great-circle math on the mean earth sphere.
//! All functions take and return decimal degrees (angles) and meters (lengths). The earth model is a sphere
//! of radius [`MEAN_EARTH_RADIUS`]

use std::{f64::consts::PI, fmt};
use serde::{Serialize,Deserialize};
use uom::si::{f64::Length, length::meter};
use geo::{Destination, Distance, Point};
use geo::algorithm::line_measures::metric_spaces::HaversineMeasure;

use crate::{sin, cos, atan2, rad, deg};
use crate::angle::{Angle360, normalize_180, normalize_90};
use crate::geo_constants::MEAN_EARTH_RADIUS;
use crate::errors::{GeoError, Result};

/* #region GeoCoordinate ***************************************************************************************/

/// immutable geographic position in decimal degrees.
/// Serializes as `{lat,lon}`, deserializes also from `latitude|y` and `longitude|x` field names
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GeoCoordinate {
    #[serde(rename="lat", alias="latitude", alias="y")]
    latitude: f64,

    #[serde(rename="lon", alias="longitude", alias="x")]
    longitude: f64,
}

impl GeoCoordinate {
    /// unchecked ctor - this is what telemetry sources use (we don't validate vehicle data)
    pub const fn from_lat_lon_degrees (latitude: f64, longitude: f64) -> Self {
        GeoCoordinate { latitude, longitude }
    }

    /// checked ctor for user provided input
    pub fn try_from_lat_lon_degrees (latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err( GeoError::InvalidLatitude(latitude))
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err( GeoError::InvalidLongitude(longitude))
        }
        Ok( GeoCoordinate { latitude, longitude } )
    }

    /// fold arbitrary degrees back into the valid latitude/longitude ranges
    pub fn normalized (latitude: f64, longitude: f64) -> Self {
        GeoCoordinate { latitude: normalize_90(latitude), longitude: normalize_180(longitude) }
    }

    #[inline] pub fn latitude (&self) -> f64 { self.latitude }
    #[inline] pub fn longitude (&self) -> f64 { self.longitude }

    pub fn is_valid (&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn bearing_to (&self, other: &GeoCoordinate) -> Angle360 { bearing( self, other) }
    pub fn distance_to (&self, other: &GeoCoordinate) -> f64 { distance( self, other) }
    pub fn haversine_length (&self, other: &GeoCoordinate) -> Length { Length::new::<meter>( distance( self, other)) }
    pub fn destination (&self, bearing_deg: f64, distance_m: f64) -> GeoCoordinate { destination( self, bearing_deg, distance_m) }

    /// geo uses x/y order
    pub fn point (&self) -> Point { Point::new( self.longitude, self.latitude) }

    pub fn from_point (p: Point) -> Self { GeoCoordinate { latitude: p.y(), longitude: p.x() } }
}

impl From<GeoCoordinate> for Point {
    fn from (c: GeoCoordinate) -> Self { c.point() }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.7},{:.7}]", self.latitude, self.longitude)
    }
}

/* #endregion GeoCoordinate */

/* #region great circle functions ******************************************************************************/

/// initial great-circle bearing from `from` to `to` (degrees clockwise from true north, in [0,360)).
///
/// The same-point case is degenerate - by convention we return 0.0 (north). Antipodal points do not have a unique
/// great circle and the result is numerically unstable there (but never NaN for finite input)
pub fn bearing (from: &GeoCoordinate, to: &GeoCoordinate) -> Angle360 {
    if from == to { return Angle360::NORTH }

    let lat1 = rad(from.latitude);
    let lat2 = rad(to.latitude);
    let dlon = rad(to.longitude - from.longitude);

    let y = sin(dlon) * cos(lat2);
    let x = cos(lat1) * sin(lat2) - sin(lat1) * cos(lat2) * cos(dlon);

    let b = deg( atan2(y,x));
    if b.is_finite() { Angle360::from_degrees(b) } else { Angle360::NORTH }
}

/// the haversine metric space on our mean earth sphere
pub fn mean_earth_sphere () -> HaversineMeasure { HaversineMeasure::new( MEAN_EARTH_RADIUS) }

/// haversine surface distance in meters between `a` and `b` on the mean earth sphere.
/// This is symmetric and exactly 0.0 for identical points
pub fn distance (a: &GeoCoordinate, b: &GeoCoordinate) -> f64 {
    let d = mean_earth_sphere().distance( a.point(), b.point());
    if d.is_nan() && a.is_valid() && b.is_valid() {
        PI * MEAN_EARTH_RADIUS // rounding pushed a (near) antipodal haversine past 1
    } else {
        d
    }
}

/// the point reached when travelling `distance_m` meters from `from` along the great circle with initial bearing `bearing_deg`
pub fn destination (from: &GeoCoordinate, bearing_deg: f64, distance_m: f64) -> GeoCoordinate {
    let p = mean_earth_sphere().destination( from.point(), bearing_deg, distance_m);
    GeoCoordinate::from_lat_lon_degrees( p.y(), normalize_180( p.x()))
}

/* #endregion great circle functions */
