use std::rc::Rc;

use glam::IVec2;
use util::{s4, HashMap, IndexMap, Rect};

/// An ordered list of generated items that remembers which step
/// produced each one.
#[derive(Clone, Debug, Default)]
pub struct ItemList<T> {
    items: Vec<T>,
    sources: Vec<Rc<str>>,
}

impl<T> ItemList<T> {
    pub fn new() -> Self {
        ItemList {
            items: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn add(&mut self, item: T, step_name: &str) {
        self.items.push(item);
        self.sources.push(Rc::from(step_name));
    }

    pub fn add_all(
        &mut self,
        items: impl IntoIterator<Item = T>,
        step_name: &str,
    ) {
        let source: Rc<str> = Rc::from(step_name);
        for item in items {
            self.items.push(item);
            self.sources.push(source.clone());
        }
    }

    /// Move all of `other`'s items over, keeping their recorded source
    /// steps.
    pub fn append(&mut self, other: &mut ItemList<T>) {
        self.items.append(&mut other.items);
        self.sources.append(&mut other.sources);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Name of the step that produced the item at `index`.
    pub fn source_of(&self, index: usize) -> Option<&str> {
        self.sources.get(index).map(|s| &**s)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_with_sources(
        &self,
    ) -> impl Iterator<Item = (&T, &str)> {
        self.items
            .iter()
            .zip(self.sources.iter().map(|s| &**s))
    }

    /// Remove every item matching the predicate, keeping order.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) {
        let mut i = 0;
        while i < self.items.len() {
            if pred(&self.items[i]) {
                self.items.remove(i);
                self.sources.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

impl<T: PartialEq> ItemList<T> {
    /// Remove the first occurrence of `item`.
    pub fn remove_item(&mut self, item: &T) -> bool {
        if let Some(i) = self.items.iter().position(|x| x == item) {
            self.items.remove(i);
            self.sources.remove(i);
            true
        } else {
            false
        }
    }
}

/// Door positions recorded for one room, bucketed by the side of the
/// room's one-cell expansion they sit on.
#[derive(Clone, Debug)]
pub struct RoomDoors {
    room: Rect,
    // Indexed in `s4::DIR` clock face order: top, right, bottom, left.
    sides: [Vec<IVec2>; 4],
    sources: HashMap<IVec2, Rc<str>>,
}

impl RoomDoors {
    fn new(room: Rect) -> Self {
        RoomDoors {
            room,
            sides: Default::default(),
            sources: Default::default(),
        }
    }

    /// The room's inner rectangle.
    pub fn room(&self) -> Rect {
        self.room
    }

    fn add(&mut self, door: IVec2, step_name: Rc<str>) {
        // Corner cells of the expansion bucket to top/bottom first.
        let side = if door.y < self.room.min.y {
            0
        } else if door.y > self.room.max.y {
            2
        } else if door.x > self.room.max.x {
            1
        } else {
            3
        };
        if !self.sides[side].contains(&door) {
            self.sides[side].push(door);
        }
        self.sources.insert(door, step_name);
    }

    /// Doors on the side facing the cardinal direction `dir`.
    pub fn doors_on_side(&self, dir: IVec2) -> &[IVec2] {
        let side = s4::DIR
            .iter()
            .position(|&d| d == dir)
            .expect("RoomDoors: not a cardinal direction");
        &self.sides[side]
    }

    pub fn iter(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.sides.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.sides.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sides.iter().all(Vec::is_empty)
    }

    /// Name of the step that recorded the door at `p`.
    pub fn source_of(&self, p: IVec2) -> Option<&str> {
        self.sources.get(&p).map(|s| &**s)
    }
}

/// Mapping from room rectangles to their recorded doors.
#[derive(Clone, Debug, Default)]
pub struct DoorList {
    rooms: IndexMap<Rect, RoomDoors>,
}

impl DoorList {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_door(&mut self, step_name: &str, room: Rect, door: IVec2) {
        self.rooms
            .entry(room)
            .or_insert_with(|| RoomDoors::new(room))
            .add(door, Rc::from(step_name));
    }

    pub fn doors_for(&self, room: &Rect) -> Option<&RoomDoors> {
        self.rooms.get(room)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rect, &RoomDoors)> {
        self.rooms.iter()
    }

    /// Number of rooms with at least one recorded door.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn list_tracks_sources() {
        let mut list = ItemList::new();
        list.add(1, "first");
        list.add_all([2, 3], "second");
        assert_eq!(list.items(), &[1, 2, 3]);
        assert_eq!(list.source_of(0), Some("first"));
        assert_eq!(list.source_of(2), Some("second"));

        list.remove_where(|&x| x == 2);
        assert_eq!(list.items(), &[1, 3]);
        assert_eq!(list.source_of(1), Some("second"));

        assert!(list.remove_item(&3));
        assert!(!list.remove_item(&3));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn list_append_moves_sources() {
        let mut a = ItemList::new();
        a.add("x", "one");
        let mut b = ItemList::new();
        b.add("y", "two");
        a.append(&mut b);
        assert!(b.is_empty());
        assert_eq!(a.len(), 2);
        assert_eq!(a.source_of(1), Some("two"));
    }

    #[test]
    fn door_sides() {
        let room = Rect::new([3, 3], [5, 5]);
        let mut doors = DoorList::new();
        doors.add_door("step", room, ivec2(4, 2));
        doors.add_door("step", room, ivec2(6, 4));
        doors.add_door("step", room, ivec2(4, 6));
        doors.add_door("other", room, ivec2(2, 5));

        let rd = doors.doors_for(&room).unwrap();
        assert_eq!(rd.len(), 4);
        assert_eq!(rd.doors_on_side(ivec2(0, -1)), &[ivec2(4, 2)]);
        assert_eq!(rd.doors_on_side(ivec2(1, 0)), &[ivec2(6, 4)]);
        assert_eq!(rd.doors_on_side(ivec2(0, 1)), &[ivec2(4, 6)]);
        assert_eq!(rd.doors_on_side(ivec2(-1, 0)), &[ivec2(2, 5)]);
        assert_eq!(rd.source_of(ivec2(2, 5)), Some("other"));
        assert_eq!(doors.len(), 1);
    }
}
