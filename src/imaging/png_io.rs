use std::io::Cursor;
use std::path::Path;

use tri_fractal::Raster;

use crate::error::ImageIoError;

/// Read a PNG file into a [`Raster`].
pub fn load_png(path: &Path) -> Result<Raster, ImageIoError> {
    let bytes = std::fs::read(path)?;
    let raster = decode_png(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        color = raster.is_color(),
        "Loaded PNG"
    );
    Ok(raster)
}

/// Decode PNG bytes.
///
/// Palette and low-bit-depth images are expanded, 16-bit samples are
/// stripped to 8 bits and alpha is dropped. Grey inputs stay grey.
pub fn decode_png(bytes: &[u8]) -> Result<Raster, ImageIoError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| ImageIoError::PngDecode(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| ImageIoError::PngDecode(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let (width, height) = (info.width, info.height);
    if width == 0 || height == 0 {
        return Err(ImageIoError::Empty { width, height });
    }
    if info.bit_depth != png::BitDepth::Eight {
        return Err(ImageIoError::Unsupported(format!(
            "{:?} bit depth after expansion",
            info.bit_depth
        )));
    }

    let raster = match info.color_type {
        png::ColorType::Grayscale => Raster::from_grey(width, height, buf),
        png::ColorType::GrayscaleAlpha => {
            Raster::from_grey(width, height, buf.chunks_exact(2).map(|px| px[0]).collect())
        }
        png::ColorType::Rgb => Raster::from_rgb(width, height, buf),
        png::ColorType::Rgba => Raster::from_rgb(
            width,
            height,
            buf.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect(),
        ),
        png::ColorType::Indexed => {
            return Err(ImageIoError::Unsupported(
                "indexed colour after expansion".to_string(),
            ))
        }
    };
    Ok(raster)
}

/// Encode a raster as an 8-bit grey or RGB PNG.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, ImageIoError> {
    if raster.is_empty() {
        return Err(ImageIoError::Empty {
            width: raster.width(),
            height: raster.height(),
        });
    }
    let color_type = if raster.is_color() {
        png::ColorType::Rgb
    } else {
        png::ColorType::Grayscale
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, raster.width(), raster.height());
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Default);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ImageIoError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(raster.data())
            .map_err(|e| ImageIoError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Write a raster to `path` as PNG.
pub fn save_png(raster: &Raster, path: &Path) -> Result<(), ImageIoError> {
    let bytes = encode_png(raster)?;
    std::fs::write(path, bytes)?;
    tracing::debug!(path = %path.display(), "Wrote PNG");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tri_fractal::Channel;

    fn encode_raw(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        buf
    }

    #[test]
    fn test_grey_round_trip() {
        let raster = Raster::from_grey(3, 2, vec![0, 50, 100, 150, 200, 250]);
        let bytes = encode_png(&raster).unwrap();
        assert_eq!(decode_png(&bytes).unwrap(), raster);
    }

    #[test]
    fn test_rgb_round_trip() {
        let raster = Raster::from_rgb(2, 1, vec![1, 2, 3, 4, 5, 6]);
        let bytes = encode_png(&raster).unwrap();
        assert_eq!(decode_png(&bytes).unwrap(), raster);
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let bytes = encode_raw(2, 1, png::ColorType::Rgba, &[10, 20, 30, 255, 40, 50, 60, 0]);
        let raster = decode_png(&bytes).unwrap();
        assert!(raster.is_color());
        assert_eq!(raster.data(), &[10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_grey_alpha_stays_grey() {
        let bytes = encode_raw(2, 1, png::ColorType::GrayscaleAlpha, &[77, 255, 88, 0]);
        let raster = decode_png(&bytes).unwrap();
        assert!(!raster.is_color());
        assert_eq!(raster.get(1, 0, Channel::Grey), 88);
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        assert!(matches!(
            decode_png(b"not a png"),
            Err(ImageIoError::PngDecode(_))
        ));
    }

    #[test]
    fn test_empty_raster_cannot_be_encoded() {
        let raster = Raster::filled(0, 4, false, 0);
        assert!(matches!(
            encode_png(&raster),
            Err(ImageIoError::Empty { .. })
        ));
    }
}
