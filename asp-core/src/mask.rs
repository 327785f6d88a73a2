use ndarray::Array2;

/// Foreground value conventionally written by the segmentation step
pub const FOREGROUND: u8 = 255;

/// Binary segmentation mask aligned with a camera image.
///
/// Indexed `[row, col]` = `[v, u]`, the same convention as pixel
/// coordinates coming out of projection. Bounds checking is the
/// caller's job; the cloud rejects out-of-image pixels before lookup.
#[derive(Debug, Clone)]
pub struct Mask {
    data: Array2<u8>,
    foreground: u8,
}

impl Mask {
    pub fn new(data: Array2<u8>) -> Self {
        Self {
            data,
            foreground: FOREGROUND,
        }
    }

    /// A mask with a non-standard foreground sentinel
    pub fn with_foreground(data: Array2<u8>, foreground: u8) -> Self {
        Self { data, foreground }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn foreground(&self) -> u8 {
        self.foreground
    }

    pub fn is_foreground(&self, row: usize, col: usize) -> bool {
        self.data[[row, col]] == self.foreground
    }
}
