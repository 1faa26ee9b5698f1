extern crate smallvec;
extern crate ordered_float;
extern crate failure;
#[macro_use] extern crate failure_derive;

pub mod network;
pub mod rollingstock;
pub mod input;
pub mod cost;
pub mod modal;
pub mod freight;


pub type AppResult<T> = Result<T, failure::Error>;

pub use crate::cost::CostBreakdown;
pub use crate::freight::FreightNetwork;
pub use crate::input::builder::{build_network, NetworkBuilder, Records};
pub use crate::input::parameters::{ConfigError, Parameter, ParameterStore, RailParams, RoadParams};
pub use crate::modal::{RailwayNetwork, RegroupStep, RoadwayNetwork};
pub use crate::network::{Network, NetworkError};
