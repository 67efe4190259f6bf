use std::rc::Rc;

use glam::IVec2;

use crate::{Area, Rect};

/// A shallow composite of sub-areas.
///
/// Parts are reference-counted and may be shared with the caller;
/// membership and iteration are the union of the parts. A point present
/// in several parts is yielded once per part, so `len` is the sum of
/// part lengths.
#[derive(Clone, Default, Debug)]
pub struct MultiArea {
    parts: Vec<Rc<Area>>,
}

impl MultiArea {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, part: Rc<Area>) {
        self.parts.push(part);
    }

    /// Append clones of all of `other`'s part handles.
    pub fn extend_from(&mut self, other: &MultiArea) {
        self.parts.extend(other.parts.iter().cloned());
    }

    pub fn parts(&self) -> &[Rc<Area>] {
        &self.parts
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Total number of points across all parts.
    pub fn len(&self) -> usize {
        self.parts.iter().map(|a| a.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|a| a.is_empty())
    }

    /// Point at position `index` of the concatenated part iteration.
    pub fn get(&self, index: usize) -> Option<IVec2> {
        let mut index = index;
        for part in &self.parts {
            if index < part.len() {
                return part.get_index(index).copied();
            }
            index -= part.len();
        }
        None
    }

    /// Membership by linear probe of the parts.
    pub fn contains(&self, p: IVec2) -> bool {
        self.parts.iter().any(|a| a.contains(&p))
    }

    /// Union of the part bounds, recomputed on demand.
    pub fn bounds(&self) -> Option<Rect> {
        self.parts
            .iter()
            .filter(|a| !a.is_empty())
            .map(|a| a.bounds())
            .reduce(|a, b| a.union(&b))
    }

    /// Iterate all points, parts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.parts.iter().flat_map(|a| a.into_iter())
    }
}

impl FromIterator<Rc<Area>> for MultiArea {
    fn from_iter<T: IntoIterator<Item = Rc<Area>>>(iter: T) -> Self {
        MultiArea {
            parts: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<Area> for MultiArea {
    fn from_iter<T: IntoIterator<Item = Area>>(iter: T) -> Self {
        MultiArea {
            parts: iter.into_iter().map(Rc::new).collect(),
        }
    }
}
