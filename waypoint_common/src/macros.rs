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

/*
 * we intercept logging/tracing macros here to have a central place where we can remove/replace them.
 * Note these resolve tracing through our own re-export, i.e. user crates still need tracing as a dependency
 * only if they want to use it directly
 */

#[macro_export]
macro_rules! trace {
    ( $( $id:ident = $e:expr ),* ) => { $crate::tracing::trace!( $( $id = $e ),* ) };
    ( $( $e: expr ),* ) => { $crate::tracing::trace!( $( $e ),* ) }
}

#[macro_export]
macro_rules! debug {
    ( $( $id:ident = $e:expr ),* ) => { $crate::tracing::debug!( $( $id = $e ),* ) };
    ( $( $e: expr ),* ) => { $crate::tracing::debug!( $( $e ),* ) }
}

#[macro_export]
macro_rules! info {
    ( $( $id:ident = $e:expr ),* ) => { $crate::tracing::info!( $( $id = $e ),* ) };
    ( $( $e: expr ),* ) => { $crate::tracing::info!( $( $e ),* ) }
}

#[macro_export]
macro_rules! warn {
    ( $( $id:ident = $e:expr ),* ) => { $crate::tracing::warn!( $( $id = $e ),* ) };
    ( $( $e: expr ),* ) => { $crate::tracing::warn!( $( $e ),* ) }
}

#[macro_export]
macro_rules! error {
    ( $( $id:ident = $e:expr ),* ) => { $crate::tracing::error!( $( $id = $e ),* ) };
    ( $( $e: expr ),* ) => { $crate::tracing::error!( $( $e ),* ) }
}
