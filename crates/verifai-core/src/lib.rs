// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Verifai — Core types, errors, and geometry shared across all crates.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod types;

pub use config::ServiceConfig;
pub use dispatch::Dispatcher;
pub use error::{ErrorClass, VerifaiError};
pub use geometry::{FractionalBox, PixelBox, PixelRect};
pub use types::*;
