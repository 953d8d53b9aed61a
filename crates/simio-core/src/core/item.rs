use super::types::{IVec, RVec, Real, Step};
use std::fmt;

/// Semantic type of one transferred value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Real,
    Double,
    Int,
    Step,
    UChar,
    UChars,
    UShort,
    RVec,
    RVecs,
    IVec,
    String,
}

impl ItemKind {
    pub const ALL: [ItemKind; 11] = [
        ItemKind::Real,
        ItemKind::Double,
        ItemKind::Int,
        ItemKind::Step,
        ItemKind::UChar,
        ItemKind::UChars,
        ItemKind::UShort,
        ItemKind::RVec,
        ItemKind::RVecs,
        ItemKind::IVec,
        ItemKind::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Real => "REAL",
            ItemKind::Double => "DOUBLE",
            ItemKind::Int => "INT",
            ItemKind::Step => "STEP",
            ItemKind::UChar => "UCHAR",
            ItemKind::UChars => "NUCHAR",
            ItemKind::UShort => "USHORT",
            ItemKind::RVec => "RVEC",
            ItemKind::RVecs => "NRVEC",
            ItemKind::IVec => "IVEC",
            ItemKind::String => "STRING",
        }
    }

    /// Whether a single transfer may carry more than one value of this kind.
    pub fn allows_multiple(self) -> bool {
        matches!(self, ItemKind::UChars | ItemKind::RVecs)
    }

    /// Checks the multiplicity contract: only byte arrays and vector arrays
    /// may transfer a count other than one.
    pub fn check_multiplicity(self, count: usize) -> Result<(), MultiplicityError> {
        if count != 1 && !self.allows_multiple() {
            return Err(MultiplicityError { kind: self, count });
        }
        Ok(())
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "item count {count} may differ from 1 only for {uchars} or {rvecs}, not for {kind}",
    uchars = ItemKind::UChars,
    rvecs = ItemKind::RVecs
)]
pub struct MultiplicityError {
    pub kind: ItemKind,
    pub count: usize,
}

/// A value to be written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'a> {
    Real(Real),
    Double(f64),
    Int(i32),
    Step(Step),
    UChar(u8),
    UChars(&'a [u8]),
    UShort(u16),
    RVec(RVec),
    RVecs(&'a [RVec]),
    IVec(IVec),
    Str(&'a str),
}

impl Item<'_> {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Real(_) => ItemKind::Real,
            Item::Double(_) => ItemKind::Double,
            Item::Int(_) => ItemKind::Int,
            Item::Step(_) => ItemKind::Step,
            Item::UChar(_) => ItemKind::UChar,
            Item::UChars(_) => ItemKind::UChars,
            Item::UShort(_) => ItemKind::UShort,
            Item::RVec(_) => ItemKind::RVec,
            Item::RVecs(_) => ItemKind::RVecs,
            Item::IVec(_) => ItemKind::IVec,
            Item::Str(_) => ItemKind::String,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Item::UChars(values) => values.len(),
            Item::RVecs(values) => values.len(),
            _ => 1,
        }
    }
}

/// A destination for a value being read.
///
/// `Skip` reads and discards `count` values of `kind`, keeping the stream
/// cursor in step with the file layout.
#[derive(Debug)]
pub enum ItemMut<'a> {
    Real(&'a mut Real),
    Double(&'a mut f64),
    Int(&'a mut i32),
    Step(&'a mut Step),
    UChar(&'a mut u8),
    UChars(&'a mut [u8]),
    UShort(&'a mut u16),
    RVec(&'a mut RVec),
    RVecs(&'a mut [RVec]),
    IVec(&'a mut IVec),
    Str(&'a mut String),
    Skip { kind: ItemKind, count: usize },
}

impl ItemMut<'_> {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemMut::Real(_) => ItemKind::Real,
            ItemMut::Double(_) => ItemKind::Double,
            ItemMut::Int(_) => ItemKind::Int,
            ItemMut::Step(_) => ItemKind::Step,
            ItemMut::UChar(_) => ItemKind::UChar,
            ItemMut::UChars(_) => ItemKind::UChars,
            ItemMut::UShort(_) => ItemKind::UShort,
            ItemMut::RVec(_) => ItemKind::RVec,
            ItemMut::RVecs(_) => ItemKind::RVecs,
            ItemMut::IVec(_) => ItemKind::IVec,
            ItemMut::Str(_) => ItemKind::String,
            ItemMut::Skip { kind, .. } => *kind,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            ItemMut::UChars(values) => values.len(),
            ItemMut::RVecs(values) => values.len(),
            ItemMut::Skip { count, .. } => *count,
            _ => 1,
        }
    }
}
