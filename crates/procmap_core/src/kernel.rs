//! Neighbourhood kernels
//!
//! A kernel is a boolean stencil whose center sits at `(width / 2, height / 2)`.
//! Every `true` cell is a relative offset that counts as a neighbour, both for
//! rule conditions and for connectivity analysis.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when building a [`Kernel`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("kernel has no cells")]
    Empty,
    #[error("kernel row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A fixed-size boolean stencil with an implicit center
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Kernel {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Kernel {
    /// Build a kernel from rows of cells; any non-zero cell is a neighbour.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, KernelError> {
        let expected = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if expected == 0 {
            return Err(KernelError::Empty);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != expected {
                return Err(KernelError::Ragged {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            cells.extend(values.iter().map(|v| *v != 0));
        }

        Ok(Self {
            width: expected as u32,
            height: rows.len() as u32,
            cells,
        })
    }

    /// The 4-neighbourhood: `010,101,010`
    pub fn plus() -> Self {
        Self {
            width: 3,
            height: 3,
            cells: vec![false, true, false, true, false, true, false, true, false],
        }
    }

    /// The 8-neighbourhood: `111,101,111`
    pub fn all() -> Self {
        Self {
            width: 3,
            height: 3,
            cells: vec![true, true, true, true, false, true, true, true, true],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The stencil cell that lines up with the evaluated grid cell
    pub fn center(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }

    pub fn is_set(&self, col: u32, row: u32) -> bool {
        col < self.width && row < self.height && self.cells[(row * self.width + col) as usize]
    }

    /// Relative `(dx, dy)` offsets of every `true` cell, in row-major stencil order
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (cx, cy) = self.center();
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(i, _)| {
                let col = i as u32 % width;
                let row = i as u32 / width;
                (col as i32 - cx as i32, row as i32 - cy as i32)
            })
    }

    /// Whether the stencil reaches both a vertical and a horizontal neighbour.
    ///
    /// Connectivity applies offsets symmetrically, so one of `up`/`down` plus one
    /// of `left`/`right` is enough to link orthogonally carved corridors.
    pub fn has_orthogonal_offsets(&self) -> bool {
        let (cx, cy) = self.center();
        let vertical = (cy > 0 && self.is_set(cx, cy - 1)) || self.is_set(cx, cy + 1);
        let horizontal = (cx > 0 && self.is_set(cx - 1, cy)) || self.is_set(cx + 1, cy);
        vertical && horizontal
    }

    fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|c| u8::from(*c)).collect())
            .collect()
    }
}

impl TryFrom<Vec<Vec<u8>>> for Kernel {
    type Error = KernelError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Kernel::from_rows(&rows)
    }
}

impl From<Kernel> for Vec<Vec<u8>> {
    fn from(kernel: Kernel) -> Self {
        kernel.to_rows()
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.to_rows().iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            for cell in row {
                write!(f, "{}", cell)?;
            }
        }
        Ok(())
    }
}
