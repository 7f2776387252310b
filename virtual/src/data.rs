use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::Extent;

/// The dataset a [`crate::Virtual`] renders.
///
/// Slices are reference counted so that swapping data is cheap and row identity can be checked
/// by pointer.
pub enum Data<A> {
    /// A single row of cells.
    Horizontal(Rc<[A]>),
    /// A single column; every item is its own row.
    Vertical(Rc<[A]>),
    /// Rows of cells. Rows may have different lengths.
    Table(Rc<[Rc<[A]>]>),
}

impl<A> Data<A> {
    pub fn horizontal(items: impl Into<Rc<[A]>>) -> Self {
        Self::Horizontal(items.into())
    }

    pub fn vertical(items: impl Into<Rc<[A]>>) -> Self {
        Self::Vertical(items.into())
    }

    pub fn table<R: Into<Rc<[A]>>>(rows: impl IntoIterator<Item = R>) -> Self {
        let rows: Vec<Rc<[A]>> = rows.into_iter().map(Into::into).collect();
        Self::Table(rows.into())
    }

    pub fn empty() -> Self {
        Self::Vertical(Rc::from(Vec::new()))
    }

    /// Size of the dataset in cells. A table is as wide as its longest row.
    pub fn compute_dimensions(&self) -> Extent {
        match self {
            Self::Horizontal(items) => Extent::new(items.len(), usize::from(!items.is_empty())),
            Self::Vertical(items) => Extent::new(usize::from(!items.is_empty()), items.len()),
            Self::Table(rows) => Extent::new(
                rows.iter().map(|row| row.len()).max().unwrap_or(0),
                rows.len(),
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.compute_dimensions().is_empty()
    }

    pub fn row(&self, y: usize) -> Option<RowRef<A>> {
        match self {
            Self::Horizontal(items) => (y == 0 && !items.is_empty()).then(|| RowRef {
                cells: Rc::clone(items),
                offset: 0,
                len: items.len(),
            }),
            Self::Vertical(items) => (y < items.len()).then(|| RowRef {
                cells: Rc::clone(items),
                offset: y,
                len: 1,
            }),
            Self::Table(rows) => rows.get(y).map(|row| RowRef {
                cells: Rc::clone(row),
                offset: 0,
                len: row.len(),
            }),
        }
    }

    pub fn row_len(&self, y: usize) -> usize {
        self.row(y).map_or(0, |row| row.len())
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&A> {
        match self {
            Self::Horizontal(items) if y == 0 => items.get(x),
            Self::Vertical(items) if x == 0 => items.get(y),
            Self::Table(rows) => rows.get(y).and_then(|row| row.get(x)),
            _ => None,
        }
    }

    /// Whether both values share the same backing storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Horizontal(a), Self::Horizontal(b)) | (Self::Vertical(a), Self::Vertical(b)) => {
                Rc::ptr_eq(a, b)
            }
            (Self::Table(a), Self::Table(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<A> Clone for Data<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Horizontal(items) => Self::Horizontal(Rc::clone(items)),
            Self::Vertical(items) => Self::Vertical(Rc::clone(items)),
            Self::Table(rows) => Self::Table(Rc::clone(rows)),
        }
    }
}

impl<A> Default for Data<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A> fmt::Debug for Data<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Horizontal(_) => "Horizontal",
            Self::Vertical(_) => "Vertical",
            Self::Table(_) => "Table",
        };
        f.debug_struct("Data")
            .field("kind", &kind)
            .field("extent", &self.compute_dimensions())
            .finish()
    }
}

/// One row of a [`Data`], sharing its storage.
///
/// Two `RowRef`s are the [same row](RowRef::same) when they view the same allocation at the same
/// position; this is the identity used for row memoisation.
pub struct RowRef<A> {
    cells: Rc<[A]>,
    offset: usize,
    len: usize,
}

impl<A> RowRef<A> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, x: usize) -> Option<&A> {
        if x < self.len {
            self.cells.get(self.offset + x)
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[A] {
        &self.cells[self.offset..self.offset + self.len]
    }

    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells) && self.offset == other.offset && self.len == other.len
    }
}

impl<A> Clone for RowRef<A> {
    fn clone(&self) -> Self {
        Self {
            cells: Rc::clone(&self.cells),
            offset: self.offset,
            len: self.len,
        }
    }
}

impl<A> fmt::Debug for RowRef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowRef")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}
