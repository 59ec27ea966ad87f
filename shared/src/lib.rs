pub mod animation;
pub mod camera;
pub mod colors;
pub mod config;
pub mod geo;
pub mod layout;
pub mod navigator;
pub mod registry;
pub mod route;
pub mod scene;
pub mod selection;
pub mod spatial;
pub mod spring;
pub mod style;

pub use config::{ConfigError, NavigatorConfig};
pub use geo::{LonLat, Pose, ScreenSize};
pub use navigator::{NavigatorEvents, RegionNavigator};
pub use registry::{FeatureCollection, GeoRegistry, PointOfInterest, Region, RegionTable, RegistryError};
pub use route::Route;
pub use selection::{Phase, SelectionState};
