pub mod api;
pub mod channel;
pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod geo;
pub mod maps;
pub mod polyline;
pub mod reporter;
pub mod state;

#[cfg(test)]
mod test_support;

pub use controller::{RouteUpdate, SessionController};
pub use error::{Error, Result};
pub use geo::{Coordinate, Route};
