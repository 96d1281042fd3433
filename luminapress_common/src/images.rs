//! Image handling for embedding in export artifacts.
//!
//! Every backend embeds chapter images as jpeg, whatever format the
//! image source produced; conversion happens once here.

use std::error::Error;
use std::path::Path;

/// Read the image at `filepath` and return jpeg bytes together with the
/// pixel dimensions. Jpeg sources pass through unchanged; other common
/// raster formats are converted.
pub fn convert_to_jpg<P: AsRef<Path>>(filepath: P) -> Result<(Vec<u8>, (u32, u32)), Box<dyn Error>> {
    let p = filepath.as_ref();
    let ext = p.extension().and_then(|o| o.to_str());

    match ext {
        Some("jpg") | Some("jpeg") => {
            let dimensions = image::image_dimensions(p)?;
            let data = std::fs::read(p)?;
            Ok((data, dimensions))
        }
        _ => {
            use image::GenericImageView;
            let dynamic_image = image::open(p)?;
            let dimensions = dynamic_image.dimensions();
            let mut output = Vec::new();
            dynamic_image.write_to(&mut output, image::ImageOutputFormat::Jpeg(85))?;
            Ok((output, dimensions))
        }
    }
}
