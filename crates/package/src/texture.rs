//! Texture raster data and its conversion to RGBA images.

use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use image::RgbaImage;
use std::fmt;

/// Pixel layouts found in legacy packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// 8-bit palette indices; the palette travels with the mip.
    P8,
    Rgba8,
    Bgra8,
    Dxt1,
    Dxt3,
    Dxt5,
}

impl TextureFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextureFormat::P8 => "P8",
            TextureFormat::Rgba8 => "RGBA8",
            TextureFormat::Bgra8 => "BGRA8",
            TextureFormat::Dxt1 => "DXT1",
            TextureFormat::Dxt3 => "DXT3",
            TextureFormat::Dxt5 => "DXT5",
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single mip level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipMap {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
    /// RGBA palette entries for [`TextureFormat::P8`].
    pub palette: Option<Vec<[u8; 4]>>,
}

/// Raster content of a texture object. The first mip is the largest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Texture {
    pub mips: Vec<MipMap>,
}

impl Texture {
    pub fn first_mip(&self) -> Option<&MipMap> {
        self.mips.first()
    }
}

impl MipMap {
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, format: TextureFormat::Rgba8, data, palette: None }
    }

    pub fn paletted(width: u32, height: u32, indices: Vec<u8>, palette: Vec<[u8; 4]>) -> Self {
        Self { width, height, format: TextureFormat::P8, data: indices, palette: Some(palette) }
    }

    /// Converts the mip into an RGBA image.
    pub fn decode(&self) -> Result<RgbaImage> {
        if self.width == 0 || self.height == 0 {
            exn::bail!(ErrorKind::UnsupportedTexture(format!("empty {}x{} mip", self.width, self.height)));
        }
        let pixels = self.width as usize * self.height as usize;
        let rgba = match self.format {
            TextureFormat::P8 => {
                let Some(palette) = &self.palette else {
                    exn::bail!(ErrorKind::UnsupportedTexture("paletted mip without palette".to_string()));
                };
                self.expect_len(pixels)?;
                let mut out = Vec::with_capacity(pixels * 4);
                for &index in &self.data[..pixels] {
                    // Indices past the palette end show up in damaged files;
                    // render them transparent rather than failing the image.
                    out.extend_from_slice(palette.get(usize::from(index)).unwrap_or(&[0, 0, 0, 0]));
                }
                out
            },
            TextureFormat::Rgba8 => {
                self.expect_len(pixels * 4)?;
                self.data[..pixels * 4].to_vec()
            },
            TextureFormat::Bgra8 => {
                self.expect_len(pixels * 4)?;
                self.data[..pixels * 4].chunks_exact(4).flat_map(|p| [p[2], p[1], p[0], p[3]]).collect()
            },
            TextureFormat::Dxt1 => self.decode_blocks(8, texture2ddecoder::decode_bc1)?,
            TextureFormat::Dxt5 => self.decode_blocks(16, texture2ddecoder::decode_bc3)?,
            TextureFormat::Dxt3 => self.decode_blocks(16, decode_dxt3)?,
        };
        RgbaImage::from_raw(self.width, self.height, rgba)
            .ok_or_raise(|| ErrorKind::UnsupportedTexture("pixel buffer size mismatch".to_string()))
    }

    fn expect_len(&self, len: usize) -> Result<()> {
        if self.data.len() < len {
            exn::bail!(ErrorKind::UnsupportedTexture(format!(
                "{} mip {}x{} has {} bytes, expected {len}",
                self.format,
                self.width,
                self.height,
                self.data.len()
            )));
        }
        Ok(())
    }

    fn decode_blocks<F, E>(&self, block_size: usize, decoder: F) -> Result<Vec<u8>>
    where
        F: Fn(&[u8], usize, usize, &mut [u32]) -> std::result::Result<(), E>,
        E: fmt::Debug,
    {
        let (w, h) = (self.width as usize, self.height as usize);
        self.expect_len(w.div_ceil(4) * h.div_ceil(4) * block_size)?;
        let mut output = vec![0u32; w * h];
        if let Err(reason) = decoder(&self.data, w, h, &mut output) {
            exn::bail!(ErrorKind::UnsupportedTexture(format!("{} decode failed: {reason:?}", self.format)));
        }
        Ok(u32_to_rgba(&output))
    }
}

/// DXT3 (BC2) blocks: 64 bits of explicit 4-bit alpha, then a DXT1 color
/// block that always uses four-color mode. `texture2ddecoder::decode_bc2`
/// switches to the three-color, punch-through mode of BC1 when `c0 <= c1`,
/// which turns index 3 into transparent black. Output is packed the same way
/// as that crate's.
fn decode_dxt3(data: &[u8], width: usize, height: usize, out: &mut [u32]) -> std::result::Result<(), &'static str> {
    let blocks_x = width.div_ceil(4);
    for (i, block) in data.chunks_exact(16).take(blocks_x * height.div_ceil(4)).enumerate() {
        let (left, top) = (i % blocks_x * 4, i / blocks_x * 4);
        let alpha = block[..8].iter().rev().fold(0u64, |acc, &b| acc << 8 | u64::from(b));
        let colors = dxt_colors(u16::from_le_bytes([block[8], block[9]]), u16::from_le_bytes([block[10], block[11]]));
        let indices = u32::from_le_bytes([block[12], block[13], block[14], block[15]]);
        for p in 0..16 {
            let (x, y) = (left + p % 4, top + p / 4);
            if x >= width || y >= height {
                continue;
            }
            let a = ((alpha >> (4 * p)) & 0xF) as u32 * 17;
            let [r, g, b] = colors[(indices >> (2 * p)) as usize & 3];
            out[y * width + x] = u32::from(b) | u32::from(g) << 8 | u32::from(r) << 16 | a << 24;
        }
    }
    Ok(())
}

/// The four-color palette of a DXT color block, from its two RGB565 endpoints.
fn dxt_colors(c0: u16, c1: u16) -> [[u8; 3]; 4] {
    let expand = |c: u16| {
        let (r, g, b) = ((c >> 11) & 0x1F, (c >> 5) & 0x3F, c & 0x1F);
        [(r << 3 | r >> 2) as u8, (g << 2 | g >> 4) as u8, (b << 3 | b >> 2) as u8]
    };
    let (first, second) = (expand(c0), expand(c1));
    let mix = |w0: u16, w1: u16| -> [u8; 3] {
        std::array::from_fn(|i| ((u16::from(first[i]) * w0 + u16::from(second[i]) * w1) / 3) as u8)
    };
    [first, second, mix(2, 1), mix(1, 2)]
}

/// texture2ddecoder packs pixels as BGRA in a native `u32`.
fn u32_to_rgba(pixels: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() * 4);
    for &p in pixels {
        let b = (p & 0xFF) as u8;
        let g = ((p >> 8) & 0xFF) as u8;
        let r = ((p >> 16) & 0xFF) as u8;
        let a = ((p >> 24) & 0xFF) as u8;
        out.extend_from_slice(&[r, g, b, a]);
    }
    out
}
