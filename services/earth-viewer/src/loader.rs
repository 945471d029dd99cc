//! Reading grib2json layer files.

use earth_common::{EarthResult, GridRecord, Product};
use field::GridSampler;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// A decoded layer ready for sampling.
#[derive(Debug, Clone)]
pub struct Layer {
    pub product: Product,
    pub source: PathBuf,
    pub sampler: GridSampler,
}

impl Layer {
    /// "wind 2014-01-31 00:00 UTC"
    pub fn describe(&self) -> String {
        let valid = self.sampler.grid().header().valid_time();
        format!("{} {}", self.product, valid.format("%Y-%m-%d %H:%M UTC"))
    }
}

/// Parse a JSON array of `{header, data}` records.
pub async fn read_records(path: &Path) -> EarthResult<Vec<GridRecord>> {
    let bytes = tokio::fs::read(path).await?;
    let records: Vec<GridRecord> = serde_json::from_slice(&bytes)?;
    debug!(path = %path.display(), records = records.len(), bytes = bytes.len(), "Read records");
    Ok(records)
}

/// Read `path` and build `product` from its records.
pub async fn load_layer(path: &Path, product: Product) -> EarthResult<Layer> {
    let records = read_records(path).await?;
    let grid = product.build(&records)?;
    info!(
        product = %product,
        nx = grid.header().nx,
        ny = grid.header().ny,
        kind = ?grid.kind(),
        "Loaded layer"
    );
    Ok(Layer {
        product,
        source: path.to_path_buf(),
        sampler: GridSampler::new(Arc::new(grid)),
    })
}
