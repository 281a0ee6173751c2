// Service exports
pub mod maps;
pub mod orchestrator;
pub mod registry;
pub mod report;

pub use maps::{DistanceLookup, GoogleMapsClient, MapsError};
pub use orchestrator::{Orchestrator, SearchTimeouts};
pub use registry::{JobRegistry, RegistryError};
pub use report::{FileReportSink, ReportSink, SinkError};
