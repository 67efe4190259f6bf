use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use glam::{ivec2, IVec2};

use crate::ComponentRequirement;

/// Shared handle to a context component.
///
/// Steps clone handles out of the context so they can hold several
/// components mutably borrowed at once.
pub type Handle<T> = Rc<RefCell<T>>;

/// Callback receiving `(step name, stage description)` at every pause
/// point a step reports.
pub type StageObserver = Box<dyn FnMut(&str, &str)>;

struct ComponentEntry {
    type_id: TypeId,
    type_name: &'static str,
    tag: Option<String>,
    // Holds a `Handle<T>` for the entry's type.
    value: Box<dyn Any>,
}

/// A typed, tagged component bag bound to a target map size.
///
/// Components are resolved by `(type, tag)`; a given pair may be stored
/// at most once. Lookup without a tag returns the first component of
/// the type in insertion order.
pub struct GenerationContext {
    width: i32,
    height: i32,
    components: Vec<ComponentEntry>,
    observer: Option<StageObserver>,
}

impl GenerationContext {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(
            width > 0 && height > 0,
            "GenerationContext: map dimensions must be positive"
        );
        GenerationContext {
            width,
            height,
            components: Vec::new(),
            observer: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn dim(&self) -> IVec2 {
        ivec2(self.width, self.height)
    }

    /// Add a component under an optional tag and return its handle.
    ///
    /// Panics when a component with the same type and tag is already
    /// present.
    pub fn add<T: 'static>(
        &mut self,
        component: T,
        tag: Option<&str>,
    ) -> Handle<T> {
        let type_id = TypeId::of::<T>();
        assert!(
            !self.components.iter().any(|e| e.type_id == type_id
                && e.tag.as_deref() == tag),
            "GenerationContext: duplicate component {} with tag {tag:?}",
            std::any::type_name::<T>(),
        );

        let handle: Handle<T> = Rc::new(RefCell::new(component));
        self.components.push(ComponentEntry {
            type_id,
            type_name: std::any::type_name::<T>(),
            tag: tag.map(str::to_owned),
            value: Box::new(handle.clone()),
        });
        handle
    }

    /// Look up a component handle by type and tag. An absent tag
    /// matches the first component of the type regardless of its tag.
    pub fn get<T: 'static>(&self, tag: Option<&str>) -> Option<Handle<T>> {
        let type_id = TypeId::of::<T>();
        self.components
            .iter()
            .find(|e| {
                e.type_id == type_id
                    && (tag.is_none() || e.tag.as_deref() == tag)
            })
            .map(|e| {
                e.value
                    .downcast_ref::<Handle<T>>()
                    .expect("GenerationContext: component type confusion")
                    .clone()
            })
    }

    /// Like `get`, but surfaces a missing component as a step error
    /// naming the requesting step and the absent `(type, tag)` pair.
    pub fn require<T: 'static>(
        &self,
        step: &str,
        tag: Option<&str>,
    ) -> Result<Handle<T>, crate::StepError> {
        self.get(tag).ok_or_else(|| crate::StepError::MissingComponent {
            step: step.to_owned(),
            type_name: std::any::type_name::<T>(),
            tag: tag.map(str::to_owned),
        })
    }

    /// Look up a component, creating and adding it from `factory` when
    /// it is not present yet.
    pub fn get_or_new<T: 'static>(
        &mut self,
        factory: impl FnOnce() -> T,
        tag: Option<&str>,
    ) -> Handle<T> {
        match self.get::<T>(tag) {
            Some(handle) => handle,
            None => self.add(factory(), tag),
        }
    }

    /// Remove a component by type and tag. Returns whether anything was
    /// removed.
    pub fn remove<T: 'static>(&mut self, tag: Option<&str>) -> bool {
        let type_id = TypeId::of::<T>();
        let before = self.components.len();
        let mut removed = false;
        self.components.retain(|e| {
            let hit = !removed
                && e.type_id == type_id
                && (tag.is_none() || e.tag.as_deref() == tag);
            removed |= hit;
            !hit
        });
        self.components.len() != before
    }

    pub fn contains_requirement(&self, req: &ComponentRequirement) -> bool {
        self.components.iter().any(|e| {
            e.type_id == req.type_id
                && (req.tag.is_none() || e.tag == req.tag)
        })
    }

    /// Report a named pause point to the registered stage observer.
    pub fn checkpoint(&mut self, step: &str, stage: &str) {
        if let Some(observer) = self.observer.as_mut() {
            observer(step, stage);
        }
    }

    pub fn set_stage_observer(&mut self, observer: StageObserver) {
        self.observer = Some(observer);
    }

    pub fn clear_stage_observer(&mut self) {
        self.observer = None;
    }

    /// Names and tags of the stored components, for diagnostics.
    pub fn component_names(
        &self,
    ) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        self.components
            .iter()
            .map(|e| (e.type_name, e.tag.as_deref()))
    }
}
