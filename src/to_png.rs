//! PNG and APNG previews of strip frames, drawn as the panel looks.
#![cfg(feature = "host")]

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use png::{BitDepth, ColorType, Encoder, ScaledFloat};
use smart_leds::RGB8;

use crate::geo::GridSize;
use crate::layout::index_rows;
use crate::led_strip::{DisplayFrame, OFF};

const PREVIEW_INVERSE_GAMMA: f32 = 2.2;

/// Render a strip-ordered frame into a PNG file sized to the requested maximum dimension.
///
/// `grid` gives the panel shape; LED `i` of the frame is drawn at the cell the serpentine
/// wiring puts it in.
///
/// # Errors
///
/// Returns an error if `grid` does not have `N` cells or the file cannot be written.
pub fn write_frame_png<const N: usize>(
    frame: &DisplayFrame<N>,
    grid: GridSize,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(), Box<dyn Error>> {
    let output_path = output_path.as_ref();
    let panel = Panel::new(grid, target_max_dimension);
    let pixels = panel.pixels(&panel_rows(frame, grid)?);

    let mut encoder = encoder_for(output_path, panel.width, panel.height)?;
    encoder.set_color(ColorType::Rgb);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&pixels)?;
    println!("wrote PNG to {}", output_path.display());
    Ok(())
}

/// Render a sequence of frames into a looping APNG, for previewing how shared LEDs take turns.
///
/// # Errors
///
/// Returns an error if `frames` is empty, `frame_delay_ms` is zero or above `u16::MAX`,
/// `grid` does not have `N` cells, or the file cannot be written.
pub fn write_frames_apng<const N: usize>(
    frames: &[DisplayFrame<N>],
    grid: GridSize,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    frame_delay_ms: u32,
) -> Result<(), Box<dyn Error>> {
    if frames.is_empty() {
        return Err("frames must not be empty".into());
    }
    let delay_num = u16::try_from(frame_delay_ms)?;
    if delay_num == 0 {
        return Err("frame_delay_ms must be positive".into());
    }
    let output_path = output_path.as_ref();
    let panel = Panel::new(grid, target_max_dimension);

    let pixels = frames
        .iter()
        .map(|frame| Ok(panel.pixels(&panel_rows(frame, grid)?)))
        .collect::<Result<Vec<_>, Box<dyn Error>>>()?;

    let mut encoder = encoder_for(output_path, panel.width, panel.height)?;
    encoder.set_color(ColorType::Rgb);
    encoder.set_animated(u32::try_from(frames.len())?, 0)?;
    let mut writer = encoder.write_header()?;
    for frame_pixels in pixels {
        writer.set_frame_delay(delay_num, 1000)?;
        writer.write_image_data(&frame_pixels)?;
    }
    writer.finish()?;
    println!("wrote APNG to {}", output_path.display());
    Ok(())
}

fn encoder_for(
    output_path: &Path,
    width: u32,
    height: u32,
) -> Result<Encoder<'static, BufWriter<File>>, Box<dyn Error>> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), width, height);
    encoder.set_depth(BitDepth::Sixteen);
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    Ok(encoder)
}

/// Frame colors rearranged as `rows[y][x]`.
fn panel_rows<const N: usize>(
    frame: &DisplayFrame<N>,
    grid: GridSize,
) -> Result<Vec<Vec<RGB8>>, Box<dyn Error>> {
    if grid.len() != N {
        return Err(format!("grid has {} cells but the frame has {N} LEDs", grid.len()).into());
    }
    Ok(index_rows(grid)
        .map(|row| {
            row.map(|index| frame.get(usize::from(index)).copied().unwrap_or(OFF))
                .collect()
        })
        .collect())
}

/// Output geometry for one panel.
struct Panel {
    cell_size: u32,
    led_radius: u32,
    fade_width: u32,
    width: u32,
    height: u32,
}

impl Panel {
    fn new(grid: GridSize, target_max_dimension: u32) -> Self {
        let columns = u32::from(grid.width());
        let rows = u32::from(grid.height());
        let cell_size = select_cell_size(columns, rows, target_max_dimension.max(8));
        let led_margin = (cell_size / 8).max(1);
        let led_radius = ((cell_size - led_margin * 2) / 2).max(1);
        Self {
            cell_size,
            led_radius,
            fade_width: (led_radius / 3).max(1),
            width: columns * cell_size + led_radius * 2,
            height: rows * cell_size + led_radius * 2,
        }
    }

    /// 16-bit big-endian RGB pixels, each LED a soft-edged disc on black.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        reason = "preview geometry stays far below the limits of these types"
    )]
    fn pixels(&self, rows: &[Vec<RGB8>]) -> Vec<u8> {
        let mut bytes = vec![0u8; (self.width * self.height * 3 * 2) as usize];
        let border = self.led_radius;
        let center = (self.cell_size - 1) as i32 / 2;
        let led_radius_f = self.led_radius as f32;
        let inner_radius_f = self.led_radius.saturating_sub(self.fade_width) as f32;
        let radius_sq = (self.led_radius as i32) * (self.led_radius as i32);

        for (row_index, row) in rows.iter().enumerate() {
            for (column_index, pixel) in row.iter().enumerate() {
                let cell_origin_x = column_index as u32 * self.cell_size;
                let cell_origin_y = row_index as u32 * self.cell_size;

                for local_y in 0..self.cell_size {
                    let delta_y = local_y as i32 - center;
                    for local_x in 0..self.cell_size {
                        let delta_x = local_x as i32 - center;
                        let distance_sq = delta_x * delta_x + delta_y * delta_y;
                        if distance_sq > radius_sq {
                            continue;
                        }
                        let distance = (distance_sq as f32).sqrt();
                        let intensity = if distance <= inner_radius_f {
                            1.0
                        } else {
                            let fade_span = led_radius_f - inner_radius_f;
                            (1.0 - (distance - inner_radius_f) / fade_span).max(0.0)
                        };
                        let x = border + cell_origin_x + local_x;
                        let y = border + cell_origin_y + local_y;
                        let pixel_index = ((y * self.width + x) * 3 * 2) as usize;
                        let channels = [pixel.r, pixel.g, pixel.b]
                            .map(|channel| linear_to_u16(inverse_gamma_to_linear(channel) * intensity));
                        if let Some(out) = bytes.get_mut(pixel_index..pixel_index + 6) {
                            for (chunk, value) in out.chunks_exact_mut(2).zip(channels) {
                                chunk.copy_from_slice(&value.to_be_bytes());
                            }
                        }
                    }
                }
            }
        }
        bytes
    }
}

fn select_cell_size(columns: u32, rows: u32, target_max_dimension: u32) -> u32 {
    let mut cell_size = target_max_dimension;
    while cell_size > 8 {
        let led_margin = (cell_size / 8).max(1);
        let led_radius = (cell_size - (led_margin * 2)) / 2;
        let output_width = columns * cell_size + led_radius * 2;
        let output_height = rows * cell_size + led_radius * 2;
        if output_width.max(output_height) <= target_max_dimension {
            break;
        }
        cell_size -= 1;
    }
    cell_size
}

fn inverse_gamma_to_linear(channel: u8) -> f32 {
    (f32::from(channel) / 255.0).powf(PREVIEW_INVERSE_GAMMA)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to 0..=65535 first"
)]
fn linear_to_u16(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0).round() as u16
}
