pub mod field_view;
pub mod init;
pub mod orchestrator;
pub mod tile_store;

pub use field_view::{FieldKey, FieldView, LoadPhase};
pub use init::{InitOptions, SeriesResponse, determine_current_range, initialize_fields};
pub use orchestrator::{CancelToken, FetchPlanner, FetchRequest, GapFetchPlanner};
pub use tile_store::{TileStore, TileWrite, WriteMode};
