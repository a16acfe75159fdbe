pub mod nv21;
pub mod rotate;

pub use nv21::nv21_to_bgra;
pub use rotate::{Rotation, RotationError};

use std::fmt;

use fast_image_resize as fr;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use thiserror::Error;

/// Channel layout of an interleaved 8-bit frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Gray,
    Rgb,
    Rgba,
    Bgra,
}

impl PixelLayout {
    pub fn channels(&self) -> usize {
        match self {
            PixelLayout::Gray => 1,
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba | PixelLayout::Bgra => 4,
        }
    }

    fn pixel_type(&self) -> fr::PixelType {
        match self {
            PixelLayout::Gray => fr::PixelType::U8,
            PixelLayout::Rgb => fr::PixelType::U8x3,
            PixelLayout::Rgba | PixelLayout::Bgra => fr::PixelType::U8x4,
        }
    }
}

impl fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PixelLayout::Gray => "gray",
            PixelLayout::Rgb => "rgb",
            PixelLayout::Rgba => "rgba",
            PixelLayout::Bgra => "bgra",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame must be at least 1x1, got {width}x{height}")]
    Empty { width: u32, height: u32 },
    #[error("{layout} frame of {width}x{height} needs {expected} bytes, got {actual}")]
    Length {
        layout: PixelLayout,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("nv21 buffer of {width}x{height} needs {expected} bytes, got {actual}")]
    Nv21Length {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to resize frame: {0}")]
    Resize(String),
}

/// A decoded camera frame, row major with interleaved channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        let expected = width as usize * height as usize * layout.channels();
        if data.len() != expected {
            return Err(FrameError::Length {
                layout,
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row count, the scale applied to normalized y coordinates.
    pub fn rows(&self) -> usize {
        self.height as usize
    }

    /// Column count, the scale applied to normalized x coordinates.
    pub fn cols(&self) -> usize {
        self.width as usize
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Area-averaging resize, keeping the channel layout.
    ///
    /// Box convolution averages every source pixel the destination pixel
    /// covers. Alpha is treated as a plain channel.
    pub fn resize_area(&self, width: u32, height: u32) -> Result<Frame, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        let pixel_type = self.layout.pixel_type();
        let src = fr::images::ImageRef::new(self.width, self.height, &self.data, pixel_type)
            .map_err(|e| FrameError::Resize(e.to_string()))?;
        let mut dst = fr::images::Image::new(width, height, pixel_type);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Box))
            .use_alpha(false);
        resizer
            .resize(&src, &mut dst, Some(&options))
            .map_err(|e| FrameError::Resize(e.to_string()))?;

        Ok(Frame {
            width,
            height,
            layout: self.layout,
            data: dst.into_vec(),
        })
    }

    /// Packed RGB triplets in this frame's pixel order.
    pub fn to_rgb(&self) -> Vec<u8> {
        match self.layout {
            PixelLayout::Rgb => self.data.clone(),
            PixelLayout::Gray => self.data.iter().flat_map(|&v| [v, v, v]).collect(),
            PixelLayout::Rgba => self
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
            PixelLayout::Bgra => self
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[2], px[1], px[0]])
                .collect(),
        }
    }

    pub fn to_rgb_frame(&self) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            layout: PixelLayout::Rgb,
            data: self.to_rgb(),
        }
    }
}

impl From<GrayImage> for Frame {
    fn from(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Frame {
            width,
            height,
            layout: PixelLayout::Gray,
            data: img.into_raw(),
        }
    }
}

impl From<RgbImage> for Frame {
    fn from(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Frame {
            width,
            height,
            layout: PixelLayout::Rgb,
            data: img.into_raw(),
        }
    }
}

impl From<RgbaImage> for Frame {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Frame {
            width,
            height,
            layout: PixelLayout::Rgba,
            data: img.into_raw(),
        }
    }
}

impl From<DynamicImage> for Frame {
    fn from(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => gray.into(),
            DynamicImage::ImageRgb8(rgb) => rgb.into(),
            DynamicImage::ImageRgba8(rgba) => rgba.into(),
            other => other.to_rgb8().into(),
        }
    }
}
