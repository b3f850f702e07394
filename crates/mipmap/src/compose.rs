//! Pyramid composition: four children in, one parent tile out.

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::codec;
use crate::config::MipmapConfig;
use crate::error::Result;
use crate::quadrant::{self, Quadrant};
use crate::raster::{PixelFormat, RasterBuffer};

/// The optional child tiles of one parent, by quadrant.
///
/// A missing child leaves its quadrant fully transparent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildTiles<'a> {
    pub nw: Option<&'a Path>,
    pub ne: Option<&'a Path>,
    pub sw: Option<&'a Path>,
    pub se: Option<&'a Path>,
}

impl<'a> ChildTiles<'a> {
    pub fn new(
        nw: Option<&'a Path>,
        ne: Option<&'a Path>,
        sw: Option<&'a Path>,
        se: Option<&'a Path>,
    ) -> Self {
        Self { nw, ne, sw, se }
    }

    /// Set the child for `quadrant`.
    pub fn with(mut self, quadrant: Quadrant, path: &'a Path) -> Self {
        match quadrant {
            Quadrant::NorthWest => self.nw = Some(path),
            Quadrant::NorthEast => self.ne = Some(path),
            Quadrant::SouthWest => self.sw = Some(path),
            Quadrant::SouthEast => self.se = Some(path),
        }
        self
    }

    pub fn get(&self, quadrant: Quadrant) -> Option<&'a Path> {
        match quadrant {
            Quadrant::NorthWest => self.nw,
            Quadrant::NorthEast => self.ne,
            Quadrant::SouthWest => self.sw,
            Quadrant::SouthEast => self.se,
        }
    }

    /// Number of children present.
    pub fn count(&self) -> usize {
        Quadrant::ALL.iter().filter(|q| self.get(**q).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Builds parent tiles from their children.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: MipmapConfig,
}

impl Compositor {
    pub fn new(config: MipmapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MipmapConfig {
        &self.config
    }

    /// Compose a parent tile from `children` and write it to `output`.
    ///
    /// Odd or zero dimensions are rejected before any file is touched. With no
    /// children an empty (fully transparent) tile is still written. The first
    /// failure ends the call; nothing is retried.
    pub fn compose(
        &self,
        output: &Path,
        width: usize,
        height: usize,
        format: PixelFormat,
        children: &ChildTiles<'_>,
    ) -> Result<()> {
        let _span = info_span!("compose", output = %output.display()).entered();
        let start = Instant::now();

        let parent = self.compose_tile(width, height, format, children)?;
        codec::encode(output, &parent, self.config.compression.level())?;

        info!(
            width,
            height,
            %format,
            children = children.count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "composed tile"
        );
        Ok(())
    }

    /// Compose a parent tile in memory without encoding it.
    pub fn compose_tile(
        &self,
        width: usize,
        height: usize,
        format: PixelFormat,
        children: &ChildTiles<'_>,
    ) -> Result<RasterBuffer> {
        quadrant::validate_dimensions(width, height)?;
        let mut parent = RasterBuffer::new(width, height, format)?;

        if self.config.parallel && children.count() > 1 {
            let present: Vec<(Quadrant, &Path)> = Quadrant::ALL
                .iter()
                .filter_map(|&q| children.get(q).map(|path| (q, path)))
                .collect();

            // Quadrants are disjoint, so each child is reduced on its own and
            // the halves are copied in afterwards.
            let halves = present
                .par_iter()
                .map(|&(q, path)| {
                    quadrant::downsample(q, path, width, height, format).map(|half| (q, half))
                })
                .collect::<Result<Vec<_>>>()?;

            for (q, half) in &halves {
                quadrant::write_quadrant(&mut parent, *q, half);
            }
            debug!(children = halves.len(), "filled quadrants in parallel");
        } else {
            for q in Quadrant::ALL {
                quadrant::downsample_into(&mut parent, q, children.get(q))?;
            }
        }

        Ok(parent)
    }
}

/// Compose one parent tile with the default configuration.
///
/// `colored` selects RGBA tiles; otherwise tiles are gray+alpha. Each of
/// `nw`, `ne`, `sw`, `se` is the child tile for that quadrant, if any.
#[allow(clippy::too_many_arguments)]
pub fn compose(
    output: &Path,
    width: usize,
    height: usize,
    colored: bool,
    nw: Option<&Path>,
    ne: Option<&Path>,
    sw: Option<&Path>,
    se: Option<&Path>,
) -> Result<()> {
    Compositor::default().compose(
        output,
        width,
        height,
        PixelFormat::from_colored(colored),
        &ChildTiles::new(nw, ne, sw, se),
    )
}
