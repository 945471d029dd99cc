//! PNG encoding for overlays and animation frames.
//!
//! Two color types are written:
//! - **Indexed (color type 3)** when the image has at most 256 distinct colors.
//!   Particle frames (gray buckets over a transparent background) almost always
//!   qualify.
//! - **RGBA (color type 6)** otherwise, e.g. a sinebow overlay.
//!
//! [`encode_png_auto`] picks between them.

use earth_common::{EarthError, EarthResult};
use std::collections::HashMap;
use std::io::Write;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const MAX_PALETTE_SIZE: usize = 256;

/// Palette entry.
pub type PaletteColor = (u8, u8, u8, u8);

/// Encode RGBA pixels, using an indexed palette when the colors fit.
pub fn encode_png_auto(pixels: &[u8], width: usize, height: usize) -> EarthResult<Vec<u8>> {
    check_rgba(pixels, width, height)?;
    match extract_palette(pixels) {
        Some((palette, indices)) => encode_png_indexed(width, height, &palette, &indices),
        None => encode_png(pixels, width, height),
    }
}

/// Encode RGBA pixels as color type 6.
pub fn encode_png(pixels: &[u8], width: usize, height: usize) -> EarthResult<Vec<u8>> {
    check_rgba(pixels, width, height)?;

    let mut png = Vec::with_capacity(pixels.len() / 4 + 64);
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let idat = deflate_scanlines(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode palette indices as color type 3. A tRNS chunk is written when any palette
/// entry is not fully opaque.
pub fn encode_png_indexed(
    width: usize,
    height: usize,
    palette: &[PaletteColor],
    indices: &[u8],
) -> EarthResult<Vec<u8>> {
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(EarthError::RenderError(format!(
            "palette must have 1..=256 entries, got {}",
            palette.len()
        )));
    }
    if indices.len() != width * height {
        return Err(EarthError::RenderError(format!(
            "expected {} palette indices for {}x{}, got {}",
            width * height,
            width,
            height,
            indices.len()
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= palette.len()) {
        return Err(EarthError::RenderError(format!(
            "palette index {} out of range for {} entries",
            bad,
            palette.len()
        )));
    }

    let mut png = Vec::with_capacity(indices.len() / 4 + 64 + palette.len() * 4);
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|&(r, g, b, _)| [r, g, b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|&(_, _, _, a)| a < 255) {
        let trns: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Distinct colors in first-seen order and the per-pixel index, or `None` when there
/// are more than 256 colors.
pub fn extract_palette(pixels: &[u8]) -> Option<(Vec<PaletteColor>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<PaletteColor> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let packed = u32::from_le_bytes([px[0], px[1], px[2], px[3]]);
        let index = match lookup.get(&packed) {
            Some(&i) => i,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let i = palette.len() as u8;
                palette.push((px[0], px[1], px[2], px[3]));
                lookup.insert(packed, i);
                i
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

fn check_rgba(pixels: &[u8], width: usize, height: usize) -> EarthResult<()> {
    if width == 0 || height == 0 {
        return Err(EarthError::RenderError(format!(
            "cannot encode empty image {}x{}",
            width, height
        )));
    }
    if pixels.len() != width * height * 4 {
        return Err(EarthError::RenderError(format!(
            "expected {} RGBA bytes for {}x{}, got {}",
            width * height * 4,
            width,
            height,
            pixels.len()
        )));
    }
    Ok(())
}

fn ihdr(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    data[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = color_type;
    // compression, filter and interlace methods stay 0
    data
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> EarthResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (row_bytes + 1));
    for row in data.chunks_exact(row_bytes).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .and_then(|_| encoder.finish())
        .map_err(|e| EarthError::RenderError(format!("IDAT compression failed: {}", e)))
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}
