// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Registry`] of steps, hooks and parameter types of a single run.

use std::{collections::HashSet, fmt, mem, rc::Rc};

use futures::future::{self, FutureExt as _, LocalBoxFuture};
use itertools::Itertools as _;
use tracing::{debug, trace};

use crate::{
    cli::Config,
    error::{
        FinalizeError, MissingDefinitionError, MultipleDefinitionsError,
        RegistrationError, StepError,
    },
    expression::{Argument, StepPattern},
    hook::{
        self, CaseHook, CaseHookDeclaration, CaseHookKeyword, CaseHookParameter,
        HookOptions, RunHook, RunHookKeyword, RunHookOptions, StepHook,
        StepHookKeyword, StepHookParameter, DEFAULT_HOOK_ORDER,
    },
    parameter::{ParameterType, ParameterTypes},
    step::{
        Arguments, Location, StepArgument, StepDeclaration, StepDefinition,
    },
    tag::TagPredicate,
    Id,
};

/// Phase of a [`Registry`].
enum State<W> {
    /// Declarations are accepted.
    Open {
        steps: Vec<StepDeclaration<W>>,
        case_hooks: Vec<CaseHookDeclaration<W>>,
    },

    /// Declarations are compiled and identified, only queries are served.
    Active {
        steps: Vec<StepDefinition<W>>,
        case_hooks: Vec<CaseHook<W>>,
    },
}

/// Registry binding step text and lifecycle events of a run to their
/// implementations.
///
/// Starts open, accepting `define_*()` declarations. [`Registry::finalize()`]
/// compiles step patterns and assigns [`Id`]s, after which the [`Registry`]
/// only serves resolution queries and invocations.
///
/// `W` is the world: the per-scenario state every implementation receives.
///
/// # Example
///
/// ```rust
/// # use cucumber_registry::{id, Registry};
/// # use futures::FutureExt as _;
/// #
/// #[derive(Default)]
/// struct World {
///     cukes: i64,
/// }
///
/// let mut registry = Registry::<World>::new();
/// registry
///     .define_step("I have {int} cukes", |w, mut args| {
///         async move {
///             w.cukes = args.take::<i64>(0)?;
///             Ok(())
///         }
///         .boxed_local()
///     })
///     .unwrap();
/// registry.finalize(id::incrementing()).unwrap();
///
/// let mut world = World::default();
/// let step = registry
///     .run_step_definition(&mut world, "I have 42 cukes", false, None)
///     .unwrap();
/// futures::executor::block_on(step).unwrap();
///
/// assert_eq!(world.cukes, 42);
/// ```
pub struct Registry<W> {
    config: Config,
    state: State<W>,
    parameter_types: ParameterTypes<W>,
    step_hooks: Vec<StepHook<W>>,
    run_hooks: Vec<RunHook<W>>,
}

impl<W> fmt::Debug for Registry<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("finalized", &self.is_finalized())
            .field("step_definitions", &self.step_definitions())
            .field("case_hooks", &self.case_hooks())
            .field("step_hooks", &self.step_hooks)
            .field("run_hooks", &self.run_hooks)
            .finish_non_exhaustive()
    }
}

impl<W> Default for Registry<W> {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl<W> Registry<W> {
    /// Creates a new empty [`Registry`] with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty [`Registry`] with the provided [`Config`].
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            state: State::Open {
                steps: Vec::new(),
                case_hooks: Vec::new(),
            },
            parameter_types: ParameterTypes::new(),
            step_hooks: Vec::new(),
            run_hooks: Vec::new(),
        }
    }

    /// [`Config`] of this [`Registry`].
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Indicates whether this [`Registry`] is finalized already.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }

    /// [`ParameterTypes`] known to this [`Registry`].
    #[must_use]
    pub const fn parameter_types(&self) -> &ParameterTypes<W> {
        &self.parameter_types
    }

    /// All the finalized [`StepDefinition`]s, in declaration order.
    ///
    /// Empty until [`Registry::finalize()`] is called.
    #[must_use]
    pub fn step_definitions(&self) -> &[StepDefinition<W>] {
        match &self.state {
            State::Active { steps, .. } => steps,
            State::Open { .. } => &[],
        }
    }

    /// All the finalized [`CaseHook`]s, in declaration order.
    ///
    /// Empty until [`Registry::finalize()`] is called.
    #[must_use]
    pub fn case_hooks(&self) -> &[CaseHook<W>] {
        match &self.state {
            State::Active { case_hooks, .. } => case_hooks,
            State::Open { .. } => &[],
        }
    }

    /// All the [`StepHook`]s, in declaration order.
    #[must_use]
    pub fn step_hooks(&self) -> &[StepHook<W>] {
        &self.step_hooks
    }

    /// All the [`RunHook`]s, in declaration order.
    #[must_use]
    pub fn run_hooks(&self) -> &[RunHook<W>] {
        &self.run_hooks
    }

    /// Declares a new step, implemented by the given function.
    ///
    /// The `pattern` is either a Cucumber Expression (any string) or a
    /// [`Regex`].
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Finalized`] if this [`Registry`] is finalized.
    /// - [`RegistrationError::InvalidExpression`] if the Cucumber Expression
    ///   is malformed.
    ///
    /// [`Regex`]: regex::Regex
    #[track_caller]
    pub fn define_step<P, F>(
        &mut self,
        pattern: P,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        P: Into<StepPattern>,
        F: for<'a> Fn(&'a mut W, Arguments) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        let position = self.position();
        let State::Open { steps, .. } = &mut self.state else {
            return Err(RegistrationError::Finalized { declaration: "a step" });
        };

        let pattern = pattern.into();
        pattern.validate()?;
        trace!(%pattern, "step declared");
        steps.push(StepDeclaration {
            pattern,
            implementation: Rc::new(implementation),
            position,
        });
        Ok(())
    }

    /// Declares a new [Given] step, the same as [`Registry::define_step()`].
    ///
    /// Step keywords don't take part in matching.
    ///
    /// # Errors
    ///
    /// See [`Registry::define_step()`].
    ///
    /// [Given]: https://cucumber.io/docs/gherkin/reference#given
    #[track_caller]
    pub fn define_given<P, F>(
        &mut self,
        pattern: P,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        P: Into<StepPattern>,
        F: for<'a> Fn(&'a mut W, Arguments) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        self.define_step(pattern, implementation)
    }

    /// Declares a new [When] step, the same as [`Registry::define_step()`].
    ///
    /// Step keywords don't take part in matching.
    ///
    /// # Errors
    ///
    /// See [`Registry::define_step()`].
    ///
    /// [When]: https://cucumber.io/docs/gherkin/reference#when
    #[track_caller]
    pub fn define_when<P, F>(
        &mut self,
        pattern: P,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        P: Into<StepPattern>,
        F: for<'a> Fn(&'a mut W, Arguments) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        self.define_step(pattern, implementation)
    }

    /// Declares a new [Then] step, the same as [`Registry::define_step()`].
    ///
    /// Step keywords don't take part in matching.
    ///
    /// # Errors
    ///
    /// See [`Registry::define_step()`].
    ///
    /// [Then]: https://cucumber.io/docs/gherkin/reference#then
    #[track_caller]
    pub fn define_then<P, F>(
        &mut self,
        pattern: P,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        P: Into<StepPattern>,
        F: for<'a> Fn(&'a mut W, Arguments) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        self.define_step(pattern, implementation)
    }

    /// Declares a new [`ParameterType`] usable in step expressions.
    ///
    /// May be called after the steps using it are declared, as long as it's
    /// done before [`Registry::finalize()`].
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Finalized`] if this [`Registry`] is finalized.
    /// - [`RegistrationError::InvalidParameterType`] if its name or regex is
    ///   malformed.
    /// - [`RegistrationError::DuplicateParameterType`] if its name is taken.
    pub fn define_parameter_type(
        &mut self,
        parameter_type: ParameterType<W>,
    ) -> Result<(), RegistrationError> {
        if self.is_finalized() {
            return Err(RegistrationError::Finalized {
                declaration: "a parameter type",
            });
        }
        trace!(name = parameter_type.name(), "parameter type declared");
        self.parameter_types.define(parameter_type)
    }

    /// Declares a new [`CaseHook`] of the given `keyword`.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Finalized`] if this [`Registry`] is finalized.
    /// - [`RegistrationError::InvalidTagExpression`] if the tag expression of
    ///   the `options` is malformed.
    #[track_caller]
    pub fn define_case_hook<O, F>(
        &mut self,
        keyword: CaseHookKeyword,
        options: O,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        O: Into<HookOptions>,
        F: for<'a> Fn(
                &'a mut W,
                CaseHookParameter,
            ) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        let position = self.position();
        let State::Open { case_hooks, .. } = &mut self.state else {
            return Err(RegistrationError::Finalized {
                declaration: "a case hook",
            });
        };

        let HookOptions { tags, order, name } = options.into();
        let predicate = TagPredicate::compile(tags.as_deref())?;
        trace!(%keyword, ?tags, ?order, "case hook declared");
        case_hooks.push(CaseHookDeclaration {
            keyword,
            predicate,
            implementation: Rc::new(implementation),
            order: order.unwrap_or(DEFAULT_HOOK_ORDER),
            position,
            name,
        });
        Ok(())
    }

    /// Declares a new [`CaseHookKeyword::Before`] hook.
    ///
    /// # Errors
    ///
    /// See [`Registry::define_case_hook()`].
    #[track_caller]
    pub fn define_before<O, F>(
        &mut self,
        options: O,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        O: Into<HookOptions>,
        F: for<'a> Fn(
                &'a mut W,
                CaseHookParameter,
            ) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        self.define_case_hook(CaseHookKeyword::Before, options, implementation)
    }

    /// Declares a new [`CaseHookKeyword::After`] hook.
    ///
    /// # Errors
    ///
    /// See [`Registry::define_case_hook()`].
    #[track_caller]
    pub fn define_after<O, F>(
        &mut self,
        options: O,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        O: Into<HookOptions>,
        F: for<'a> Fn(
                &'a mut W,
                CaseHookParameter,
            ) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        self.define_case_hook(CaseHookKeyword::After, options, implementation)
    }

    /// Declares a new [`StepHook`] of the given `keyword`.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Finalized`] if this [`Registry`] is finalized.
    /// - [`RegistrationError::InvalidTagExpression`] if the tag expression of
    ///   the `options` is malformed.
    #[track_caller]
    pub fn define_step_hook<O, F>(
        &mut self,
        keyword: StepHookKeyword,
        options: O,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        O: Into<HookOptions>,
        F: for<'a> Fn(
                &'a mut W,
                StepHookParameter,
            ) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        let position = self.position();
        if self.is_finalized() {
            return Err(RegistrationError::Finalized {
                declaration: "a step hook",
            });
        }

        let HookOptions { tags, order, name } = options.into();
        let predicate = TagPredicate::compile(tags.as_deref())?;
        trace!(%keyword, ?tags, ?order, "step hook declared");
        self.step_hooks.push(StepHook {
            keyword,
            predicate,
            implementation: Rc::new(implementation),
            order: order.unwrap_or(DEFAULT_HOOK_ORDER),
            position,
            name,
        });
        Ok(())
    }

    /// Declares a new [`StepHookKeyword::BeforeStep`] hook.
    ///
    /// # Errors
    ///
    /// See [`Registry::define_step_hook()`].
    #[track_caller]
    pub fn define_before_step<O, F>(
        &mut self,
        options: O,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        O: Into<HookOptions>,
        F: for<'a> Fn(
                &'a mut W,
                StepHookParameter,
            ) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        self.define_step_hook(StepHookKeyword::BeforeStep, options, implementation)
    }

    /// Declares a new [`StepHookKeyword::AfterStep`] hook.
    ///
    /// # Errors
    ///
    /// See [`Registry::define_step_hook()`].
    #[track_caller]
    pub fn define_after_step<O, F>(
        &mut self,
        options: O,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        O: Into<HookOptions>,
        F: for<'a> Fn(
                &'a mut W,
                StepHookParameter,
            ) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        self.define_step_hook(StepHookKeyword::AfterStep, options, implementation)
    }

    /// Declares a new [`RunHook`] of the given `keyword`.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::Finalized`] if this [`Registry`] is finalized.
    #[track_caller]
    pub fn define_run_hook<O, F>(
        &mut self,
        keyword: RunHookKeyword,
        options: O,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        O: Into<RunHookOptions>,
        F: for<'a> Fn(&'a mut W) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        let position = self.position();
        if self.is_finalized() {
            return Err(RegistrationError::Finalized {
                declaration: "a run hook",
            });
        }

        let RunHookOptions { order } = options.into();
        trace!(%keyword, ?order, "run hook declared");
        self.run_hooks.push(RunHook {
            keyword,
            implementation: Rc::new(implementation),
            order: order.unwrap_or(DEFAULT_HOOK_ORDER),
            position,
        });
        Ok(())
    }

    /// Declares a new [`RunHookKeyword::BeforeAll`] hook.
    ///
    /// # Errors
    ///
    /// See [`Registry::define_run_hook()`].
    #[track_caller]
    pub fn define_before_all<O, F>(
        &mut self,
        options: O,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        O: Into<RunHookOptions>,
        F: for<'a> Fn(&'a mut W) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        self.define_run_hook(RunHookKeyword::BeforeAll, options, implementation)
    }

    /// Declares a new [`RunHookKeyword::AfterAll`] hook.
    ///
    /// # Errors
    ///
    /// See [`Registry::define_run_hook()`].
    #[track_caller]
    pub fn define_after_all<O, F>(
        &mut self,
        options: O,
        implementation: F,
    ) -> Result<(), RegistrationError>
    where
        O: Into<RunHookOptions>,
        F: for<'a> Fn(&'a mut W) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + 'static,
    {
        self.define_run_hook(RunHookKeyword::AfterAll, options, implementation)
    }

    /// Finalizes this [`Registry`]: compiles step patterns and assigns [`Id`]s
    /// produced by `next_id` to steps and case hooks.
    ///
    /// On error this [`Registry`] stays open with its declarations intact.
    ///
    /// # Errors
    ///
    /// - [`FinalizeError::AlreadyFinalized`] if called twice.
    /// - [`FinalizeError::Expression`] if a step pattern fails to compile,
    ///   e.g. references an undefined parameter type.
    /// - [`FinalizeError::DuplicateId`] if `next_id` repeats itself.
    pub fn finalize(
        &mut self,
        mut next_id: impl FnMut() -> Id,
    ) -> Result<(), FinalizeError> {
        let State::Open { steps, case_hooks } = &mut self.state else {
            return Err(FinalizeError::AlreadyFinalized);
        };

        let expressions = steps
            .iter()
            .map(|s| s.pattern.compile(&self.parameter_types))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        let mut ids = (0..steps.len() + case_hooks.len()).map(|_| {
            let id = next_id();
            if seen.insert(id.clone()) {
                Ok(id)
            } else {
                Err(FinalizeError::DuplicateId { id })
            }
        });
        let step_ids = ids.by_ref().take(steps.len()).collect::<Result<Vec<_>, _>>()?;
        let hook_ids = ids.collect::<Result<Vec<_>, _>>()?;

        let steps = mem::take(steps)
            .into_iter()
            .zip(expressions)
            .zip(step_ids)
            .map(|((decl, expression), id)| StepDefinition {
                id,
                expression,
                implementation: decl.implementation,
                position: decl.position,
            })
            .collect::<Vec<_>>();
        let case_hooks = mem::take(case_hooks)
            .into_iter()
            .zip(hook_ids)
            .map(|(decl, id)| decl.identify(id))
            .collect::<Vec<_>>();

        debug!(
            steps = steps.len(),
            case_hooks = case_hooks.len(),
            step_hooks = self.step_hooks.len(),
            run_hooks = self.run_hooks.len(),
            parameter_types = self.parameter_types.iter().count(),
            "registry finalized"
        );
        self.state = State::Active { steps, case_hooks };
        Ok(())
    }

    /// Returns all the [`StepDefinition`]s matching the given step `text`, in
    /// declaration order.
    #[must_use]
    pub fn matching_step_definitions(&self, text: &str) -> Vec<&StepDefinition<W>> {
        self.matches(text).into_iter().map(|(def, _)| def).collect()
    }

    /// Resolves the only [`StepDefinition`] matching the given step `text`.
    ///
    /// # Errors
    ///
    /// - [`StepError::Missing`] if nothing matches.
    /// - [`StepError::Multiple`] if several definitions match.
    pub fn resolve_step_definition(
        &self,
        text: &str,
    ) -> Result<&StepDefinition<W>, StepError> {
        self.resolve(text).map(|(def, _)| def)
    }

    /// Resolves the [`StepDefinition`] matching the given step `text`, binds
    /// its arguments against the `world` and invokes it.
    ///
    /// A provided [`StepArgument`] becomes the last positional argument.
    ///
    /// With `dry_run` (or [`Config::dry_run`]) everything but the invocation
    /// happens, and an immediately ready [`Future`] is returned.
    ///
    /// # Errors
    ///
    /// - [`StepError::Missing`] if nothing matches.
    /// - [`StepError::Multiple`] if several definitions match.
    /// - [`StepError::Argument`] if converting a captured argument fails.
    ///
    /// Failures of the implementation itself are the output of the returned
    /// [`Future`].
    ///
    /// [`Future`]: std::future::Future
    pub fn run_step_definition<'w>(
        &self,
        world: &'w mut W,
        text: &str,
        dry_run: bool,
        argument: Option<StepArgument>,
    ) -> Result<LocalBoxFuture<'w, anyhow::Result<()>>, StepError> {
        let (def, captured) = self.resolve(text)?;

        let values = captured
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                arg.value(world).map_err(|cause| StepError::Argument {
                    index,
                    text: arg.text().to_owned(),
                    cause,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut args = Arguments::new(values);
        if let Some(argument) = argument {
            args.push(argument);
        }

        if dry_run || self.config.dry_run {
            trace!(id = %def.id(), text, "step skipped in dry run");
            return Ok(future::ready(Ok(())).boxed_local());
        }
        trace!(id = %def.id(), text, args = args.len(), "step invoked");
        Ok(def.invoke(world, args))
    }

    /// Resolves [`CaseHook`]s of the given `keyword` applying to a scenario
    /// with the given `tags`, in execution order.
    #[must_use]
    pub fn resolve_case_hooks<I, S>(
        &self,
        keyword: CaseHookKeyword,
        tags: I,
    ) -> Vec<&CaseHook<W>>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        hook::ordered(
            self.case_hooks()
                .iter()
                .filter(|h| h.keyword == keyword && h.applies_to(tags.clone())),
            CaseHook::order,
            keyword.is_after(),
        )
    }

    /// Resolves [`CaseHookKeyword::Before`] hooks for a scenario with the
    /// given `tags`, ascending by order.
    #[must_use]
    pub fn resolve_before_hooks<I, S>(&self, tags: I) -> Vec<&CaseHook<W>>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        self.resolve_case_hooks(CaseHookKeyword::Before, tags)
    }

    /// Resolves [`CaseHookKeyword::After`] hooks for a scenario with the
    /// given `tags`, in ascending order reversed.
    #[must_use]
    pub fn resolve_after_hooks<I, S>(&self, tags: I) -> Vec<&CaseHook<W>>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        self.resolve_case_hooks(CaseHookKeyword::After, tags)
    }

    /// Invokes the given [`CaseHook`] for the `world` of a scenario.
    pub fn run_case_hook<'w>(
        &self,
        world: &'w mut W,
        hook: &CaseHook<W>,
        parameter: CaseHookParameter,
    ) -> LocalBoxFuture<'w, anyhow::Result<()>> {
        trace!(id = %hook.id(), keyword = %hook.keyword(), "case hook invoked");
        (hook.implementation)(world, parameter)
    }

    /// Resolves [`StepHook`]s of the given `keyword` applying to steps of a
    /// scenario with the given `tags`, in execution order.
    #[must_use]
    pub fn resolve_step_hooks<I, S>(
        &self,
        keyword: StepHookKeyword,
        tags: I,
    ) -> Vec<&StepHook<W>>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        hook::ordered(
            self.step_hooks
                .iter()
                .filter(|h| h.keyword == keyword && h.applies_to(tags.clone())),
            StepHook::order,
            keyword.is_after(),
        )
    }

    /// Resolves [`StepHookKeyword::BeforeStep`] hooks for steps of a scenario
    /// with the given `tags`, ascending by order.
    #[must_use]
    pub fn resolve_before_step_hooks<I, S>(&self, tags: I) -> Vec<&StepHook<W>>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        self.resolve_step_hooks(StepHookKeyword::BeforeStep, tags)
    }

    /// Resolves [`StepHookKeyword::AfterStep`] hooks for steps of a scenario
    /// with the given `tags`, in ascending order reversed.
    #[must_use]
    pub fn resolve_after_step_hooks<I, S>(&self, tags: I) -> Vec<&StepHook<W>>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        self.resolve_step_hooks(StepHookKeyword::AfterStep, tags)
    }

    /// Invokes the given [`StepHook`] for the `world` of a scenario.
    pub fn run_step_hook<'w>(
        &self,
        world: &'w mut W,
        hook: &StepHook<W>,
        parameter: StepHookParameter,
    ) -> LocalBoxFuture<'w, anyhow::Result<()>> {
        trace!(keyword = %hook.keyword(), "step hook invoked");
        (hook.implementation)(world, parameter)
    }

    /// Resolves [`RunHook`]s of the given `keyword`, in execution order.
    #[must_use]
    pub fn resolve_run_hooks(&self, keyword: RunHookKeyword) -> Vec<&RunHook<W>> {
        hook::ordered(
            self.run_hooks.iter().filter(|h| h.keyword == keyword),
            RunHook::order,
            keyword.is_after(),
        )
    }

    /// Resolves [`RunHookKeyword::BeforeAll`] hooks, ascending by order.
    #[must_use]
    pub fn resolve_before_all_hooks(&self) -> Vec<&RunHook<W>> {
        self.resolve_run_hooks(RunHookKeyword::BeforeAll)
    }

    /// Resolves [`RunHookKeyword::AfterAll`] hooks, in ascending order
    /// reversed, so ties run in reverse declaration order.
    #[must_use]
    pub fn resolve_after_all_hooks(&self) -> Vec<&RunHook<W>> {
        self.resolve_run_hooks(RunHookKeyword::AfterAll)
    }

    /// Invokes the given [`RunHook`] with the run-wide `world`.
    pub fn run_run_hook<'w>(
        &self,
        world: &'w mut W,
        hook: &RunHook<W>,
    ) -> LocalBoxFuture<'w, anyhow::Result<()>> {
        trace!(keyword = %hook.keyword(), "run hook invoked");
        (hook.implementation)(world)
    }

    /// Captures the [`Location`] of the `define_*()` call, if enabled.
    #[track_caller]
    fn position(&self) -> Option<Location> {
        if self.config.source_positions {
            Some(Location::caller())
        } else {
            None
        }
    }

    fn matches(&self, text: &str) -> Vec<(&StepDefinition<W>, Vec<Argument<W>>)> {
        self.step_definitions()
            .iter()
            .filter_map(|def| def.matches(text).map(|args| (def, args)))
            .collect()
    }

    fn resolve(
        &self,
        text: &str,
    ) -> Result<(&StepDefinition<W>, Vec<Argument<W>>), StepError> {
        let mut matches = self.matches(text);
        match matches.len() {
            0 => {
                debug!(text, "no step definition matches");
                Err(MissingDefinitionError { text: text.to_owned() }.into())
            }
            1 => Ok(matches.swap_remove(0)),
            n => {
                debug!(
                    text,
                    candidates = %matches.iter().map(|(d, _)| d.pattern()).join(", "),
                    "{n} step definitions match"
                );
                Err(MultipleDefinitionsError {
                    text: text.to_owned(),
                    candidates: matches
                        .into_iter()
                        .map(|(d, _)| (d.pattern().to_string(), d.position()))
                        .collect(),
                }
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id;

    fn noop<'a>(_: &'a mut (), _: Arguments) -> LocalBoxFuture<'a, anyhow::Result<()>> {
        future::ready(Ok(())).boxed_local()
    }

    #[test]
    fn steps_appear_only_after_finalize() {
        let mut registry = Registry::<()>::new();
        registry.define_step("a step", noop).unwrap();

        assert!(registry.step_definitions().is_empty());
        assert!(!registry.is_finalized());

        registry.finalize(id::incrementing()).unwrap();

        assert!(registry.is_finalized());
        assert_eq!(registry.step_definitions().len(), 1);
        assert_eq!(registry.step_definitions()[0].id().as_str(), "0");
    }

    #[test]
    fn records_declaration_line() {
        let mut registry = Registry::<()>::new();
        let line = line!() + 1;
        registry.define_step("a step", noop).unwrap();
        registry.finalize(id::incrementing()).unwrap();

        let position = registry.step_definitions()[0].position().unwrap();

        assert_eq!(position.path, file!());
        assert_eq!(position.line, line);
    }

    #[test]
    fn keyword_aliases_record_their_own_call_site() {
        let mut registry = Registry::<()>::new();
        let line = line!() + 1;
        registry.define_when("a step", noop).unwrap();
        registry.finalize(id::incrementing()).unwrap();

        let position = registry.step_definitions()[0].position().unwrap();

        assert_eq!(position.path, file!());
        assert_eq!(position.line, line);
    }

    #[test]
    fn positions_can_be_disabled() {
        let mut registry = Registry::<()>::with_config(Config {
            source_positions: false,
            ..Config::default()
        });
        registry.define_step("a step", noop).unwrap();
        registry.finalize(id::incrementing()).unwrap();

        assert!(registry.step_definitions()[0].position().is_none());
    }

    #[test]
    fn failed_finalize_keeps_registry_open() {
        let mut registry = Registry::<()>::new();
        registry.define_step("I pick {color}", noop).unwrap();

        assert!(matches!(
            registry.finalize(id::incrementing()),
            Err(FinalizeError::Expression(_)),
        ));
        assert!(!registry.is_finalized());

        registry
            .define_parameter_type(ParameterType::parsed::<String>("color", "red|blue"))
            .unwrap();
        registry.finalize(id::incrementing()).unwrap();

        assert_eq!(registry.matching_step_definitions("I pick red").len(), 1);
    }

    #[test]
    fn second_finalize_is_rejected() {
        let mut registry = Registry::<()>::new();
        registry.finalize(id::incrementing()).unwrap();

        assert!(matches!(
            registry.finalize(id::incrementing()),
            Err(FinalizeError::AlreadyFinalized),
        ));
    }

    #[test]
    fn debug_lists_contents() {
        let mut registry = Registry::<()>::new();
        registry.define_step("a step", noop).unwrap();
        registry.finalize(id::incrementing()).unwrap();

        let out = format!("{registry:?}");

        assert!(out.contains("a step"), "{out}");
        assert!(out.contains("finalized: true"), "{out}");
    }
}
