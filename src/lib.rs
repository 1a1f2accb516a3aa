// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Asset Runtime - interned, reference-counted assets with background loading
//!
//! Named, typed assets are shared through a per-type cache, created either
//! immediately or on a single background job worker, and freed exactly when
//! their last handle is destroyed.

pub mod assets;
pub mod config;
pub mod error;
pub mod frame;
pub mod jobs;
pub mod prelude;
pub mod resources;
pub mod runtime;


pub use assets::*;
pub use config::*;
pub use error::*;
pub use frame::*;
pub use jobs::*;
pub use resources::*;
pub use runtime::*;
