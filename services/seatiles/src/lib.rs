//! Daily slippy tiles of ocean products for cruise support.
//!
//! Reads one gridded field per product and day, renders it into an XYZ tile
//! pyramid under `{tile_dir}/{product}/{date}` and keeps the viewer's
//! `layer_config.json` in step with the dates on disk.

pub mod config;
pub mod driver;
pub mod error;
pub mod layers;
pub mod loader;
pub mod products;
pub mod retry;

pub use config::SeatilesConfig;
pub use driver::{
    backfill, last_days, process_all, process_grid_file, process_product, render_grid, tiles_exist, today_utc,
    DayReport, ProductOutcome,
};
pub use error::{ensure_not_future, DateInFuture, RetrievalError};
pub use products::{Product, UnknownProduct};
pub use retry::RetryPolicy;
