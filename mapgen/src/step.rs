use std::any::TypeId;

use crate::{GenerationContext, StepError};

/// A `(component type, optional tag)` pair a step needs present before
/// it can run.
#[derive(Clone, Debug)]
pub struct ComponentRequirement {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub tag: Option<String>,
}

impl ComponentRequirement {
    pub fn new<T: 'static>(tag: Option<&str>) -> Self {
        ComponentRequirement {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            tag: tag.map(str::to_owned),
        }
    }
}

/// A discrete, re-composable unit of map generation.
///
/// Steps read and mutate context components and report named pause
/// points through `GenerationContext::checkpoint`. Implement
/// `on_perform`; callers go through `perform`, which validates the
/// declared requirements first.
pub trait GenerationStep {
    fn name(&self) -> &str;

    /// Components that must exist in the context before the step runs.
    fn requirements(&self) -> Vec<ComponentRequirement> {
        Vec::new()
    }

    fn on_perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError>;

    /// Validate requirements, then run the step to completion.
    fn perform(
        &mut self,
        ctx: &mut GenerationContext,
    ) -> Result<(), StepError> {
        for req in self.requirements() {
            if !ctx.contains_requirement(&req) {
                return Err(StepError::MissingComponent {
                    step: self.name().to_owned(),
                    type_name: req.type_name,
                    tag: req.tag,
                });
            }
        }
        self.on_perform(ctx)
    }
}
