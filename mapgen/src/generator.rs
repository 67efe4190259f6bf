use log::{debug, info};

use crate::{
    GenerationContext, GenerationError, GenerationStep, StageObserver,
    StepError,
};

/// Collects generation steps and drives them over a context.
pub struct Generator {
    pub context: GenerationContext,
    steps: Vec<Box<dyn GenerationStep>>,
}

impl Generator {
    pub fn new(width: i32, height: i32) -> Self {
        Generator {
            context: GenerationContext::new(width, height),
            steps: Vec::new(),
        }
    }

    /// Seed the context with a component before generation runs.
    pub fn add_component<T: 'static>(
        &mut self,
        component: T,
        tag: Option<&str>,
    ) -> &mut Self {
        self.context.add(component, tag);
        self
    }

    pub fn add_step(
        &mut self,
        step: impl GenerationStep + 'static,
    ) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn add_steps(
        &mut self,
        steps: impl IntoIterator<Item = Box<dyn GenerationStep>>,
    ) -> &mut Self {
        self.steps.extend(steps);
        self
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Run every registered step to completion in registration order.
    ///
    /// A `RegenerateMap` error means the produced map was unsalvageable;
    /// either handle it by reconfiguring and rerunning, or use
    /// `config_and_generate_safe` to have that done automatically.
    pub fn generate(&mut self) -> Result<&mut Self, StepError> {
        self.run_steps().map(|()| self)
    }

    /// Like `generate`, reporting step pause points to `observer`.
    pub fn generate_staged(
        &mut self,
        observer: StageObserver,
    ) -> Result<&mut Self, StepError> {
        self.context.set_stage_observer(observer);
        let result = self.run_steps();
        self.context.clear_stage_observer();
        result.map(|()| self)
    }

    fn run_steps(&mut self) -> Result<(), StepError> {
        for step in &mut self.steps {
            debug!("generation step {}", step.name());
            step.perform(&mut self.context)?;
        }
        Ok(())
    }

    /// Clear the generator, run `config` to populate it, and generate;
    /// on a regenerate signal start over from a fresh context, up to
    /// `max_attempts` tries (-1 for no limit).
    pub fn config_and_generate_safe(
        &mut self,
        mut config: impl FnMut(&mut Generator),
        max_attempts: i32,
    ) -> Result<&mut Self, GenerationError> {
        let mut attempts = 0u32;
        loop {
            let (w, h) = (self.context.width(), self.context.height());
            self.context = GenerationContext::new(w, h);
            self.steps.clear();
            config(self);

            match self.run_steps() {
                Ok(()) => return Ok(self),
                Err(err @ StepError::RegenerateMap { .. }) => {
                    attempts += 1;
                    info!(
                        "retrying map generation (attempt {attempts}): \
                         {err}"
                    );
                    if max_attempts >= 0 && attempts >= max_attempts as u32
                    {
                        return Err(
                            GenerationError::MapGenerationFailed {
                                attempts,
                                last: err,
                            },
                        );
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentRequirement, StepError};

    /// Regenerates until its countdown hits zero.
    struct Flaky {
        failures_left: u32,
    }

    impl GenerationStep for Flaky {
        fn name(&self) -> &str {
            "Flaky"
        }

        fn on_perform(
            &mut self,
            ctx: &mut GenerationContext,
        ) -> Result<(), StepError> {
            ctx.get_or_new(|| 0u32, Some("runs"));
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(StepError::regenerate(
                    self.name(),
                    "not this time",
                ));
            }
            Ok(())
        }
    }

    #[test]
    fn safe_driver_retries() {
        let mut gen = Generator::new(8, 8);
        let mut countdown = 2u32;
        gen.config_and_generate_safe(
            |gen| {
                gen.add_step(Flaky {
                    failures_left: countdown,
                });
                countdown = countdown.saturating_sub(1);
            },
            5,
        )
        .unwrap();
        assert!(gen.context.get::<u32>(Some("runs")).is_some());
    }

    #[test]
    fn safe_driver_exhausts() {
        let mut gen = Generator::new(8, 8);
        let err = gen
            .config_and_generate_safe(
                |gen| {
                    gen.add_step(Flaky {
                        failures_left: u32::MAX,
                    });
                },
                3,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::MapGenerationFailed { attempts: 3, .. }
        ));
    }

    /// Missing requirements abort immediately, no retries.
    struct Needy;

    impl GenerationStep for Needy {
        fn name(&self) -> &str {
            "Needy"
        }

        fn requirements(&self) -> Vec<ComponentRequirement> {
            vec![ComponentRequirement::new::<u64>(Some("absent"))]
        }

        fn on_perform(
            &mut self,
            _ctx: &mut GenerationContext,
        ) -> Result<(), StepError> {
            Ok(())
        }
    }

    #[test]
    fn fatal_errors_pass_through() {
        let mut gen = Generator::new(8, 8);
        let err = gen
            .config_and_generate_safe(
                |gen| {
                    gen.add_step(Needy);
                },
                -1,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Step(StepError::MissingComponent { .. })
        ));
    }

    #[test]
    fn observer_sees_stages() {
        struct Stagey;

        impl GenerationStep for Stagey {
            fn name(&self) -> &str {
                "Stagey"
            }

            fn on_perform(
                &mut self,
                ctx: &mut GenerationContext,
            ) -> Result<(), StepError> {
                ctx.checkpoint(self.name(), "one");
                ctx.checkpoint(self.name(), "two");
                Ok(())
            }
        }

        let stages = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = stages.clone();
        let mut gen = Generator::new(8, 8);
        gen.add_step(Stagey);
        gen.generate_staged(Box::new(move |step, stage| {
            sink.borrow_mut().push(format!("{step}/{stage}"));
        }))
        .unwrap();

        assert_eq!(
            *stages.borrow(),
            vec!["Stagey/one".to_owned(), "Stagey/two".to_owned()]
        );
    }
}
