//! Vertex correspondences between two ordered triangles.

use std::fmt;

/// One of the six ways to pair the vertices of two ordered triangles, plus a
/// sentinel for fits that carry no transform at all.
///
/// The digits name the target vertex for source vertices 0, 1 and 2 in turn:
/// under [`PointMap::P120`] source vertex 0 lands on target vertex 1, source
/// vertex 1 on target vertex 2 and source vertex 2 on target vertex 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointMap {
    #[default]
    P012,
    P021,
    P102,
    P120,
    P201,
    P210,
    /// No source triangle; the fit is a flat fill (wire code 6).
    Unmapped,
}

impl PointMap {
    /// The six real permutations, in wire-code order.
    pub const PERMUTATIONS: [PointMap; 6] = [
        PointMap::P012,
        PointMap::P021,
        PointMap::P102,
        PointMap::P120,
        PointMap::P201,
        PointMap::P210,
    ];

    /// Index of the target vertex paired with source vertex `source`.
    ///
    /// [`PointMap::Unmapped`] behaves like the identity pairing.
    #[inline]
    pub fn target_index(self, source: usize) -> usize {
        let order: [usize; 3] = match self {
            PointMap::P012 | PointMap::Unmapped => [0, 1, 2],
            PointMap::P021 => [0, 2, 1],
            PointMap::P102 => [1, 0, 2],
            PointMap::P120 => [1, 2, 0],
            PointMap::P201 => [2, 0, 1],
            PointMap::P210 => [2, 1, 0],
        };
        order[source]
    }

    /// Wire code, `0..=6`.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            PointMap::P012 => 0,
            PointMap::P021 => 1,
            PointMap::P102 => 2,
            PointMap::P120 => 3,
            PointMap::P201 => 4,
            PointMap::P210 => 5,
            PointMap::Unmapped => 6,
        }
    }

    /// Inverse of [`code`](Self::code). Returns `None` for codes above 6.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0..=5 => Some(Self::PERMUTATIONS[code as usize]),
            6 => Some(PointMap::Unmapped),
            _ => None,
        }
    }

    #[inline]
    pub fn is_unmapped(self) -> bool {
        self == PointMap::Unmapped
    }
}

impl fmt::Display for PointMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PointMap::P012 => "012",
            PointMap::P021 => "021",
            PointMap::P102 => "102",
            PointMap::P120 => "120",
            PointMap::P201 => "201",
            PointMap::P210 => "210",
            PointMap::Unmapped => "none",
        };
        f.write_str(s)
    }
}
