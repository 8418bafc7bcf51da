//! Rectangular row-major grid of 8-bit values.
//!
//! The same type holds raw intensities (`0..=255`) and quantized levels
//! (`0..levels`); nothing in the grid itself distinguishes the two.

use core::slice::ChunksExact;

use crate::{LogoError, Result};

/// A `width`×`height` array of values stored row by row.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Grid {
    /// Wraps a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`LogoError::InvalidDimensions`] if either dimension is zero and
    /// [`LogoError::BufferSizeMismatch`] if `data.len() != width * height`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LogoError::InvalidDimensions { width, height });
        }
        let expected = width
            .checked_mul(height)
            .ok_or(LogoError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(LogoError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a grid from a list of rows, which must all have the same length.
    ///
    /// # Example
    /// ```
    /// use logoconv::Grid;
    ///
    /// let grid = Grid::from_rows(&[[1u8, 2], [3, 4]])?;
    /// assert_eq!(grid.get(1, 0), Some(2));
    /// assert!(Grid::from_rows(&[vec![1u8, 2], vec![3]]).is_err());
    /// # Ok::<(), logoconv::LogoError>(())
    /// ```
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        if rows.iter().any(|r| r.as_ref().len() != width) {
            return Err(LogoError::InvalidDimensions { width, height });
        }
        let data = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Self::new(width, height, data)
    }

    /// A grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(LogoError::InvalidDimensions { width, height })?;
        Self::new(width, height, vec![value; len])
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; a grid has at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Row `y`, or `None` if out of range.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y < self.height {
            let start = y * self.width;
            Some(&self.data[start..start + self.width])
        } else {
            None
        }
    }

    /// Iterates the rows top to bottom.
    pub fn rows(&self) -> ChunksExact<'_, u8> {
        self.data.chunks_exact(self.width)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Largest value in the grid.
    pub fn max_value(&self) -> u8 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Applies `f` to every cell.
    pub fn map(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Copies out the `width`×`height` window whose top-left corner is `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`LogoError::InvalidDimensions`] if the window is empty or
    /// reaches outside the grid.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Self> {
        let fits = x.checked_add(width).is_some_and(|r| r <= self.width)
            && y.checked_add(height).is_some_and(|b| b <= self.height);
        if !fits {
            return Err(LogoError::InvalidDimensions { width, height });
        }
        let mut data = Vec::with_capacity(width * height);
        for row in self.rows().skip(y).take(height) {
            data.extend_from_slice(&row[x..x + width]);
        }
        Self::new(width, height, data)
    }
}
