use crate::foundation::error::{TalusError, TalusResult};

/// Channel interpretation of a raster's tightly packed 8-bit samples.
///
/// This is the closed set of layouts the pipeline accepts; anything else is
/// rejected at the decode boundary with
/// [`TalusError::UnsupportedChannelLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChannelLayout {
    /// Single luminance channel.
    Gray,
    /// Three color channels.
    Color,
    /// Three color channels plus one alpha/label channel.
    ColorAlpha,
}

impl ChannelLayout {
    /// Samples per pixel for this layout.
    pub fn channels(self) -> u8 {
        match self {
            Self::Gray => 1,
            Self::Color => 3,
            Self::ColorAlpha => 4,
        }
    }

    /// Map a raw channel count onto the closed layout set.
    pub fn from_channels(channels: u8) -> TalusResult<Self> {
        match channels {
            1 => Ok(Self::Gray),
            3 => Ok(Self::Color),
            4 => Ok(Self::ColorAlpha),
            other => Err(TalusError::UnsupportedChannelLayout(other)),
        }
    }
}

/// Row-major, tightly packed 8-bit pixel grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channel interpretation of `data`.
    pub layout: ChannelLayout,
    /// Pixel bytes, `width * height * layout.channels()` long.
    pub data: Vec<u8>,
}

impl Raster {
    /// Zero-filled raster of the given shape.
    pub fn new(width: u32, height: u32, layout: ChannelLayout) -> Self {
        let len = width as usize * height as usize * layout.channels() as usize;
        Self {
            width,
            height,
            layout,
            data: vec![0; len],
        }
    }

    /// Wrap raw pixel bytes, validating the buffer length.
    pub fn from_vec(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        data: Vec<u8>,
    ) -> TalusResult<Self> {
        let expected = width as usize * height as usize * layout.channels() as usize;
        if data.len() != expected {
            return Err(TalusError::validation(format!(
                "raster data length {} does not match {}x{}x{}",
                data.len(),
                width,
                height,
                layout.channels()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Byte offset of pixel `(x, y)`.
    pub(crate) fn pixel_offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.layout.channels() as usize
    }

    /// Convert to a plain 3-channel color raster.
    ///
    /// One conversion per layout variant: gray broadcasts into three identical
    /// channels, color is copied as-is, color+alpha drops its 4th channel.
    pub fn to_color(&self) -> Raster {
        let px = self.width as usize * self.height as usize;
        let data = match self.layout {
            ChannelLayout::Gray => {
                let mut out = Vec::with_capacity(px * 3);
                for &v in &self.data {
                    out.extend_from_slice(&[v, v, v]);
                }
                out
            }
            ChannelLayout::Color => self.data.clone(),
            ChannelLayout::ColorAlpha => {
                let mut out = Vec::with_capacity(px * 3);
                for p in self.data.chunks_exact(4) {
                    out.extend_from_slice(&p[..3]);
                }
                out
            }
        };
        Raster {
            width: self.width,
            height: self.height,
            layout: ChannelLayout::Color,
            data,
        }
    }

    /// Convert to a 4-channel color+alpha raster.
    ///
    /// Sources without an alpha channel get a fully opaque one, the way the
    /// compositor expects its foregrounds.
    pub fn to_color_alpha(&self) -> Raster {
        let px = self.width as usize * self.height as usize;
        let data = match self.layout {
            ChannelLayout::Gray => {
                let mut out = Vec::with_capacity(px * 4);
                for &v in &self.data {
                    out.extend_from_slice(&[v, v, v, 255]);
                }
                out
            }
            ChannelLayout::Color => {
                let mut out = Vec::with_capacity(px * 4);
                for p in self.data.chunks_exact(3) {
                    out.extend_from_slice(p);
                    out.push(255);
                }
                out
            }
            ChannelLayout::ColorAlpha => self.data.clone(),
        };
        Raster {
            width: self.width,
            height: self.height,
            layout: ChannelLayout::ColorAlpha,
            data,
        }
    }

    /// Fuse this raster's color channels with `mask` as the alpha channel.
    ///
    /// The source's own alpha channel, if any, is discarded. Fails with
    /// [`TalusError::DimensionMismatch`] when shapes disagree.
    pub fn with_alpha(&self, mask: &Mask) -> TalusResult<Raster> {
        if self.dimensions() != mask.dimensions() {
            return Err(TalusError::dimension_mismatch(
                self.dimensions(),
                mask.dimensions(),
            ));
        }
        let color = self.to_color();
        let px = self.width as usize * self.height as usize;
        let mut data = Vec::with_capacity(px * 4);
        for (p, &a) in color.data.chunks_exact(3).zip(&mask.data) {
            data.extend_from_slice(p);
            data.push(a);
        }
        Ok(Raster {
            width: self.width,
            height: self.height,
            layout: ChannelLayout::ColorAlpha,
            data,
        })
    }
}

/// Single-channel label/alpha grid paired with a [`Raster`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Label values, `width * height` long.
    pub data: Vec<u8>,
}

impl Mask {
    /// Zero-filled mask of the given shape.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap raw label values, validating the buffer length.
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> TalusResult<Self> {
        if data.len() != width as usize * height as usize {
            return Err(TalusError::validation(format!(
                "mask data length {} does not match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Distinct label values present in the mask.
    pub fn value_set(&self) -> std::collections::BTreeSet<u8> {
        self.data.iter().copied().collect()
    }

    /// View the mask as a single-channel [`Raster`].
    pub fn to_raster(&self) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            layout: ChannelLayout::Gray,
            data: self.data.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/grid.rs"]
mod tests;
