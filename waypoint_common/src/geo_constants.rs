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

/// common geodetic constants that should be consistent through waypoint crates

/// mean earth radius in meters. This is the sphere all our great-circle computations are based on
pub const MEAN_EARTH_RADIUS: f64 = 6371000.0;

/// length of one degree of arc on the mean earth sphere (≈111,195m)
pub const METERS_PER_DEGREE: f64 = MEAN_EARTH_RADIUS * std::f64::consts::PI / 180.0;
