use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::png::PngEncoder;
use image::error::{ParameterError, ParameterErrorKind};
use image::{Delay, Frame, ImageEncoder, ImageError, ImageResult, RgbaImage};
use rayon::prelude::*;

use crate::grid::Grid;
use crate::state::CellState;

// Fixed palette
pub const SUSCEPTIBLE: [u8; 4] = [255, 255, 255, 255];
pub const INFECTED: [u8; 4] = [255, 0, 0, 255];
pub const RECOVERED: [u8; 4] = [0, 255, 0, 255];
pub const DEAD: [u8; 4] = [30, 30, 30, 255];

#[inline]
pub fn color(state: CellState) -> [u8; 4] {
    match state {
        CellState::Susceptible => SUSCEPTIBLE,
        CellState::Infected => INFECTED,
        CellState::Recovered => RECOVERED,
        CellState::Dead => DEAD,
    }
}

/// Render a grid snapshot as RGBA8, one pixel per cell, row-major.
/// The palette is RGB; alpha is always 255 (opaque).
pub fn render_grid(grid: &Grid<CellState>) -> Vec<u8> {
    let w = grid.w;
    let mut rgba = vec![0u8; w * grid.h * 4];

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for (x, &state) in grid.row(y).iter().enumerate() {
            row[x * 4..x * 4 + 4].copy_from_slice(&color(state));
        }
    });

    rgba
}

fn to_image(rgba: Vec<u8>, w: usize, h: usize) -> ImageResult<RgbaImage> {
    RgbaImage::from_raw(w as u32, h as u32, rgba).ok_or_else(|| {
        ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch))
    })
}

pub fn encode_png(rgba: &[u8], w: usize, h: usize) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    Ok(buf)
}

/// Encode captured frames as a looping GIF.
pub fn write_gif<W: Write>(out: W, frames: &[Vec<u8>], w: usize, h: usize, fps: u32) -> ImageResult<()> {
    let delay = Delay::from_numer_denom_ms(1000, fps.max(1));
    let mut encoder = GifEncoder::new_with_speed(out, 10);
    encoder.set_repeat(Repeat::Infinite)?;
    for rgba in frames {
        let img = to_image(rgba.clone(), w, h)?;
        encoder.encode_frame(Frame::from_parts(img, 0, 0, delay))?;
    }
    Ok(())
}

pub fn encode_gif(frames: &[Vec<u8>], w: usize, h: usize, fps: u32) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_gif(&mut buf, frames, w, h, fps)?;
    Ok(buf)
}

pub fn save_gif(path: &Path, frames: &[Vec<u8>], w: usize, h: usize, fps: u32) -> ImageResult<()> {
    let file = File::create(path)?;
    write_gif(BufWriter::new(file), frames, w, h, fps)
}

pub fn save_png(path: &Path, rgba: &[u8], w: usize, h: usize) -> ImageResult<()> {
    image::save_buffer(path, rgba, w as u32, h as u32, image::ColorType::Rgba8)
}
