use std::str::FromStr;

use image::{imageops, ImageBuffer, Luma, Pixel, Rgb, Rgba};
use thiserror::Error;

use crate::frame::{Frame, FrameError, PixelLayout};

/// Clockwise rotation that brings a sensor frame upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RotationError {
    #[error("rotation must be 0, 90, 180 or 270 degrees, got {0}")]
    Degrees(i32),
    #[error("rotation must be a whole number of degrees, got {0:?}")]
    Parse(String),
}

impl Rotation {
    pub fn from_degrees(degrees: i32) -> Result<Self, RotationError> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Cw90),
            180 => Ok(Rotation::Cw180),
            270 => Ok(Rotation::Cw270),
            other => Err(RotationError::Degrees(other)),
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }
}

impl FromStr for Rotation {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let degrees = s
            .trim()
            .parse::<i32>()
            .map_err(|_| RotationError::Parse(s.to_string()))?;
        Rotation::from_degrees(degrees)
    }
}

impl Frame {
    pub fn rotate(&self, rotation: Rotation) -> Result<Frame, FrameError> {
        if rotation == Rotation::None {
            return Ok(self.clone());
        }
        // BGRA rides in an Rgba buffer; rotation never looks at channel meaning
        let (width, height, data) = match self.layout() {
            PixelLayout::Gray => rotated::<Luma<u8>>(self, rotation)?,
            PixelLayout::Rgb => rotated::<Rgb<u8>>(self, rotation)?,
            PixelLayout::Rgba | PixelLayout::Bgra => rotated::<Rgba<u8>>(self, rotation)?,
        };
        Frame::new(width, height, self.layout(), data)
    }
}

fn rotated<P>(frame: &Frame, rotation: Rotation) -> Result<(u32, u32, Vec<u8>), FrameError>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = (frame.width(), frame.height());
    let bytes = frame.as_bytes();
    let img = ImageBuffer::<P, Vec<u8>>::from_raw(width, height, bytes.to_vec()).ok_or(
        FrameError::Length {
            layout: frame.layout(),
            width,
            height,
            expected: width as usize * height as usize * frame.layout().channels(),
            actual: bytes.len(),
        },
    )?;
    let out = match rotation {
        Rotation::None => img,
        Rotation::Cw90 => imageops::rotate90(&img),
        Rotation::Cw180 => imageops::rotate180(&img),
        Rotation::Cw270 => imageops::rotate270(&img),
    };
    let (width, height) = out.dimensions();
    Ok((width, height, out.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelLayout;

    // 3 wide, 2 tall:
    // 1 2 3
    // 4 5 6
    fn sample() -> Frame {
        Frame::new(3, 2, PixelLayout::Gray, vec![1, 2, 3, 4, 5, 6]).unwrap()
    }

    #[test]
    fn test_rotate_cw90() {
        let out = sample().rotate(Rotation::Cw90).unwrap();
        assert_eq!((out.width(), out.height()), (2, 3));
        assert_eq!(out.as_bytes(), &[4, 1, 5, 2, 6, 3]);
    }

    #[test]
    fn test_rotate_cw180() {
        let out = sample().rotate(Rotation::Cw180).unwrap();
        assert_eq!(out.as_bytes(), &[6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_rotate_cw270() {
        let out = sample().rotate(Rotation::Cw270).unwrap();
        assert_eq!((out.width(), out.height()), (2, 3));
        assert_eq!(out.as_bytes(), &[3, 6, 2, 5, 1, 4]);
    }

    #[test]
    fn test_rotate_keeps_pixels_together() {
        let frame = Frame::new(2, 1, PixelLayout::Rgb, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let out = frame.rotate(Rotation::Cw90).unwrap();
        assert_eq!(out.as_bytes(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(out.rotate(Rotation::Cw270).unwrap(), frame);
        assert_eq!(frame.rotate(Rotation::None).unwrap(), frame);
    }

    #[test]
    fn test_rotate_bgra_keeps_channel_order() {
        // 2 wide, 1 tall: blue pixel then red pixel
        let frame = Frame::new(2, 1, PixelLayout::Bgra, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
        let out = frame.rotate(Rotation::Cw180).unwrap();
        assert_eq!(out.layout(), PixelLayout::Bgra);
        assert_eq!(out.as_bytes(), &[0, 0, 255, 255, 255, 0, 0, 255]);

        let out = frame.rotate(Rotation::Cw90).unwrap();
        assert_eq!((out.width(), out.height()), (1, 2));
        assert_eq!(out.to_rgb(), vec![0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!("270".parse::<Rotation>(), Ok(Rotation::Cw270));
        assert_eq!(" 90 ".parse::<Rotation>(), Ok(Rotation::Cw90));
        assert_eq!(Rotation::from_degrees(45), Err(RotationError::Degrees(45)));
        assert_eq!("45".parse::<Rotation>(), Err(RotationError::Degrees(45)));
        assert_eq!(Rotation::Cw90.degrees(), 90);
    }

    #[test]
    fn test_parse_rotation_rejects_non_numbers() {
        let err = "abc".parse::<Rotation>().unwrap_err();
        assert_eq!(err, RotationError::Parse("abc".to_string()));
        assert!(err.to_string().contains("\"abc\""));
    }
}
