//! Asynchronous dataset loading.
//!
//! Every dataset is an independent task producing a [`LoadOutcome`]; tasks run
//! concurrently and may complete in any order. Applying an outcome to the
//! scene happens afterwards, synchronously, one outcome at a time.

use formats::{
    BoundaryFeature, FeatureAliases, FormatError, RasterGrid, parse_asc, parse_boundaries,
};
use futures_util::future::{join_all, FutureExt, LocalBoxFuture};
use thiserror::Error;
use tracing::info;

use crate::config::ViewerConfig;
use crate::fetch::{DataSource, FetchError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

#[derive(Debug)]
pub enum LoadOutcome {
    Raster {
        key: String,
        result: Result<RasterGrid, LoadError>,
    },
    Country {
        code: String,
        result: Result<Vec<BoundaryFeature>, LoadError>,
    },
    GlobalBoundaries {
        result: Result<Vec<BoundaryFeature>, LoadError>,
    },
}

pub async fn load_raster(source: &DataSource, url: &str) -> Result<RasterGrid, LoadError> {
    let text = source.fetch_text(url).await?;
    let grid = parse_asc(&text)?;
    info!(
        url,
        nrows = grid.nrows,
        ncols = grid.ncols,
        min = grid.min,
        max = grid.max,
        "raster parsed"
    );
    Ok(grid)
}

pub async fn load_boundaries(
    source: &DataSource,
    url: &str,
    aliases: &FeatureAliases,
) -> Result<Vec<BoundaryFeature>, LoadError> {
    let text = source.fetch_text(url).await?;
    Ok(parse_boundaries(&text, aliases)?)
}

/// Issues every raster, country and global-boundary load at once.
pub async fn load_all(config: &ViewerConfig, source: &DataSource) -> Vec<LoadOutcome> {
    let mut tasks: Vec<LocalBoxFuture<'_, LoadOutcome>> = Vec::new();

    for dataset in &config.datasets {
        tasks.push(
            async move {
                LoadOutcome::Raster {
                    key: dataset.key.clone(),
                    result: load_raster(source, &dataset.url).await,
                }
            }
            .boxed_local(),
        );
    }

    tasks.push(
        async move {
            LoadOutcome::GlobalBoundaries {
                result: load_boundaries(source, &config.global_boundaries_url, &config.aliases)
                    .await,
            }
        }
        .boxed_local(),
    );

    for country in &config.countries {
        tasks.push(
            async move {
                LoadOutcome::Country {
                    code: country.code.clone(),
                    result: load_boundaries(source, &country.boundary_url, &config.aliases).await,
                }
            }
            .boxed_local(),
        );
    }

    join_all(tasks).await
}
