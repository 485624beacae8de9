//! The top-level fractal code of an image.

use std::io::Write;
use std::sync::Arc;

use serde::Deserialize;

use super::metadata::check_dimensions;
use super::{EncodeProgress, MetaData};
use crate::codec::{ByteReader, ByteWriter};
use crate::error::{FormatError, FractalError};
use crate::image::{Canvas, Channel, DoubleImage, Raster};
use crate::options::{DecoderOptions, EncoderOptions};
use crate::tree::{TreeStats, TriangleTree};

const FRACTAL_MAGIC: &str = "FRACTAL";

/// Which channels are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageType {
    /// One luminance tree.
    #[default]
    Greyscale,
    /// Red, green and blue trees.
    Color,
}

impl ImageType {
    /// Channels in file order.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            ImageType::Greyscale => &[Channel::Grey],
            ImageType::Color => &Channel::RGB,
        }
    }

    fn mode_byte(self) -> u8 {
        match self {
            ImageType::Greyscale => 0,
            ImageType::Color => 1,
        }
    }

    fn from_mode_byte(mode: u8) -> Result<Self, FormatError> {
        match mode {
            0 => Ok(ImageType::Greyscale),
            1 => Ok(ImageType::Color),
            other => Err(FormatError::InvalidChannelMode(other)),
        }
    }
}

/// One [`TriangleTree`] per channel plus the header.
///
/// ```text
/// "FRACTAL" width:i32 height:i32 name:u16-prefixed mode:u8 TREE{1|3}
/// ```
#[derive(Debug, Clone)]
pub struct FractalImage {
    image_type: ImageType,
    metadata: MetaData,
    trees: Vec<TriangleTree>,
}

impl FractalImage {
    /// Prepare to encode `raster`. `source` is the path the image was read
    /// from; its basename is recorded in the header.
    pub fn new(raster: Raster, image_type: ImageType, options: EncoderOptions, source: &str) -> Self {
        let metadata = MetaData::new(raster.width(), raster.height(), source);
        let raster = Arc::new(raster);
        let trees = image_type
            .channels()
            .iter()
            .map(|&channel| {
                TriangleTree::new(DoubleImage::new(
                    Arc::clone(&raster),
                    channel,
                    options.clone(),
                ))
            })
            .collect();
        Self {
            image_type,
            metadata,
            trees,
        }
    }

    #[inline]
    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    #[inline]
    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    #[inline]
    pub fn trees(&self) -> &[TriangleTree] {
        &self.trees
    }

    /// Triangles across all channels.
    pub fn triangle_count(&self) -> usize {
        self.trees.iter().map(TriangleTree::len).sum()
    }

    pub fn stats(&self) -> Vec<(Channel, TreeStats)> {
        self.trees
            .iter()
            .map(|t| (t.image().channel(), t.stats()))
            .collect()
    }

    /// Run every channel's tree to completion.
    pub fn encode(&mut self, progress: &mut dyn EncodeProgress) {
        for tree in &mut self.trees {
            let channel = tree.image().channel();
            let cutoff = tree.image().options().error_cutoff;
            progress.channel_started(channel);
            while let Some(id) = tree.assign_one(cutoff) {
                let terminal = tree.forest().get(id).is_terminal();
                progress.triangle_processed(
                    channel,
                    id,
                    terminal,
                    tree.unassigned().len(),
                    tree.len(),
                );
            }
            let stats = tree.stats();
            tracing::debug!(?channel, %stats, "Channel encoded");
            progress.channel_finished(channel, &stats);
        }
    }

    pub fn serialize<W: Write>(&self, out: W) -> Result<(), FormatError> {
        let mut out = ByteWriter::new(out);
        out.write_magic(FRACTAL_MAGIC)?;
        self.metadata.write(&mut out)?;
        out.write_u8(self.image_type.mode_byte())?;
        for tree in &self.trees {
            tree.serialize(&mut out)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let mut buf = Vec::new();
        self.serialize(&mut buf)?;
        Ok(buf)
    }

    /// Parse a complete fractal stream.
    pub fn unserialize(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut input = ByteReader::new(bytes);
        input.expect_magic(FRACTAL_MAGIC)?;
        let metadata = MetaData::read(&mut input)?;
        let image_type = ImageType::from_mode_byte(input.read_u8()?)?;

        // Trees get their pixels when decoding.
        let placeholder = Arc::new(Raster::filled(0, 0, false, 0));
        let trees = image_type
            .channels()
            .iter()
            .map(|&channel| {
                let image =
                    DoubleImage::new(Arc::clone(&placeholder), channel, EncoderOptions::default());
                TriangleTree::unserialize(&mut input, image)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if input.remaining() > 0 {
            tracing::debug!(trailing = input.remaining(), "Ignoring trailing bytes");
        }
        tracing::info!(
            width = metadata.width,
            height = metadata.height,
            source = %metadata.source_filename,
            triangles = trees.iter().map(TriangleTree::len).sum::<usize>(),
            "Loaded fractal"
        );
        Ok(Self {
            image_type,
            metadata,
            trees,
        })
    }

    /// Reconstruct an image by attractor iteration.
    ///
    /// Starts from a uniform grey seed at the requested size (the encoded
    /// size by default) and applies every tree's codes `iterations` times.
    /// Afterwards each tree's image holds the decoded raster.
    pub fn decode(&mut self, options: &DecoderOptions) -> Result<Raster, FractalError> {
        let (width, height) = self.output_size(options)?;
        let seed = Raster::filled(width, height, self.is_color(), options.seed);
        self.iterate(seed, options)
    }

    /// Like [`decode`](Self::decode), but starts from `seed` resampled to
    /// the output size.
    pub fn decode_from(
        &mut self,
        seed: &Raster,
        options: &DecoderOptions,
    ) -> Result<Raster, FractalError> {
        let (width, height) = self.output_size(options)?;
        let seed = seed.resampled(width, height, self.is_color());
        self.iterate(seed, options)
    }

    fn is_color(&self) -> bool {
        self.image_type == ImageType::Color
    }

    fn output_size(&self, options: &DecoderOptions) -> Result<(u32, u32), FormatError> {
        let width = options.width.unwrap_or(self.metadata.pixel_width());
        let height = options.height.unwrap_or(self.metadata.pixel_height());
        check_dimensions(width.into(), height.into())?;
        Ok((width, height))
    }

    fn iterate(&mut self, seed: Raster, options: &DecoderOptions) -> Result<Raster, FractalError> {
        let mut current = Arc::new(seed);
        for tree in &mut self.trees {
            tree.image_mut().set_sampling(options.sampling);
        }
        for iteration in 0..options.iterations {
            let mut canvas = Canvas::like(&current);
            for tree in &mut self.trees {
                tree.image_mut().set_raster(Arc::clone(&current));
                tree.render(&mut canvas)?;
            }
            current = Arc::new(canvas.resolve(&current, options.fix_errors));
            tracing::debug!(iteration, "Decode iteration complete");
        }
        for tree in &mut self.trees {
            tree.image_mut().set_raster(Arc::clone(&current));
        }
        Ok(Arc::unwrap_or_clone(current))
    }
}
