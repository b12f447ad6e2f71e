// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lifecycle hooks: per-scenario [`CaseHook`]s, per-step [`StepHook`]s and
//! per-run [`RunHook`]s.

use std::{fmt, rc::Rc};

use derive_more::with_trait::{Deref, Display};
use futures::future::LocalBoxFuture;

use crate::{source::Source, step::Location, tag::TagPredicate, Id};

/// [`order`] of a hook declared without one.
///
/// [`order`]: HookOptions::order
pub const DEFAULT_HOOK_ORDER: i32 = 10_000;

/// Alias for a [`CaseHook`] implementation returning a [`LocalBoxFuture`].
pub type CaseHookFn<W> = dyn for<'a> Fn(
    &'a mut W,
    CaseHookParameter,
) -> LocalBoxFuture<'a, anyhow::Result<()>>;

/// Alias for a [`StepHook`] implementation returning a [`LocalBoxFuture`].
pub type StepHookFn<W> = dyn for<'a> Fn(
    &'a mut W,
    StepHookParameter,
) -> LocalBoxFuture<'a, anyhow::Result<()>>;

/// Alias for a [`RunHook`] implementation returning a [`LocalBoxFuture`].
pub type RunHookFn<W> =
    dyn for<'a> Fn(&'a mut W) -> LocalBoxFuture<'a, anyhow::Result<()>>;

/// Keyword of a [`CaseHook`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum CaseHookKeyword {
    /// Runs before every matching scenario.
    Before,

    /// Runs after every matching scenario.
    After,
}

/// Keyword of a [`StepHook`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum StepHookKeyword {
    /// Runs before every step of a matching scenario.
    BeforeStep,

    /// Runs after every step of a matching scenario.
    AfterStep,
}

/// Keyword of a [`RunHook`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum RunHookKeyword {
    /// Runs once before the whole run.
    BeforeAll,

    /// Runs once after the whole run.
    AfterAll,
}

impl CaseHookKeyword {
    /// Indicates whether hooks of this kind unwind in reverse order.
    #[must_use]
    pub const fn is_after(self) -> bool {
        matches!(self, Self::After)
    }
}

impl StepHookKeyword {
    /// Indicates whether hooks of this kind unwind in reverse order.
    #[must_use]
    pub const fn is_after(self) -> bool {
        matches!(self, Self::AfterStep)
    }
}

impl RunHookKeyword {
    /// Indicates whether hooks of this kind unwind in reverse order.
    #[must_use]
    pub const fn is_after(self) -> bool {
        matches!(self, Self::AfterAll)
    }
}

/// Options of a [`CaseHook`] or [`StepHook`] declaration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HookOptions {
    /// Tag expression scoping the hook, applying to every scenario if
    /// [`None`].
    pub tags: Option<String>,

    /// Relative order among hooks of the same keyword, [`DEFAULT_HOOK_ORDER`]
    /// if [`None`].
    pub order: Option<i32>,

    /// Human-readable name used in diagnostics.
    pub name: Option<String>,
}

impl HookOptions {
    /// Sets the tag expression scoping the hook.
    #[must_use]
    pub fn tags(mut self, expression: impl Into<String>) -> Self {
        self.tags = Some(expression.into());
        self
    }

    /// Sets the relative order of the hook.
    #[must_use]
    pub const fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the name of the hook.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl From<&str> for HookOptions {
    fn from(tags: &str) -> Self {
        Self::default().tags(tags)
    }
}

/// Options of a [`RunHook`] declaration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunHookOptions {
    /// Relative order among hooks of the same keyword, [`DEFAULT_HOOK_ORDER`]
    /// if [`None`].
    pub order: Option<i32>,
}

impl From<i32> for RunHookOptions {
    fn from(order: i32) -> Self {
        Self { order: Some(order) }
    }
}

/// Scenario a [`CaseHook`] runs for.
#[derive(Clone, Debug)]
pub struct CaseHookParameter {
    /// [`gherkin::Feature`] of the scenario.
    pub feature: Source<gherkin::Feature>,

    /// [`gherkin::Rule`] the scenario belongs to, if any.
    pub rule: Option<Source<gherkin::Rule>>,

    /// The scenario itself.
    pub scenario: Source<gherkin::Scenario>,

    /// [`Id`] of this scenario's execution.
    pub test_case_started_id: Id,
}

impl CaseHookParameter {
    /// Returns the tags of the scenario along with the ones it inherits from
    /// its rule and feature.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.feature
            .tags
            .iter()
            .chain(self.rule.iter().flat_map(|r| r.tags.iter()))
            .chain(self.scenario.tags.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Step a [`StepHook`] runs around.
#[derive(Clone, Debug, Deref)]
pub struct StepHookParameter {
    /// Scenario of the step.
    #[deref]
    pub case: CaseHookParameter,

    /// The step itself.
    pub step: Source<gherkin::Step>,

    /// [`Id`] of this step's execution.
    pub test_step_id: Id,
}

/// Hook running around every matching scenario.
pub struct CaseHook<W> {
    pub(crate) id: Id,
    pub(crate) keyword: CaseHookKeyword,
    pub(crate) predicate: TagPredicate,
    pub(crate) implementation: Rc<CaseHookFn<W>>,
    pub(crate) order: i32,
    pub(crate) position: Option<Location>,
    pub(crate) name: Option<String>,
}

/// Hook running around every step of a matching scenario.
pub struct StepHook<W> {
    pub(crate) keyword: StepHookKeyword,
    pub(crate) predicate: TagPredicate,
    pub(crate) implementation: Rc<StepHookFn<W>>,
    pub(crate) order: i32,
    pub(crate) position: Option<Location>,
    pub(crate) name: Option<String>,
}

/// Hook running once per the whole run.
pub struct RunHook<W> {
    pub(crate) keyword: RunHookKeyword,
    pub(crate) implementation: Rc<RunHookFn<W>>,
    pub(crate) order: i32,
    pub(crate) position: Option<Location>,
}

/// Case hook declared on an open [`Registry`], lacking its [`Id`] yet.
///
/// [`Registry`]: crate::Registry
pub(crate) struct CaseHookDeclaration<W> {
    pub(crate) keyword: CaseHookKeyword,
    pub(crate) predicate: TagPredicate,
    pub(crate) implementation: Rc<CaseHookFn<W>>,
    pub(crate) order: i32,
    pub(crate) position: Option<Location>,
    pub(crate) name: Option<String>,
}

impl<W> CaseHookDeclaration<W> {
    pub(crate) fn identify(self, id: Id) -> CaseHook<W> {
        let Self {
            keyword,
            predicate,
            implementation,
            order,
            position,
            name,
        } = self;
        CaseHook {
            id,
            keyword,
            predicate,
            implementation,
            order,
            position,
            name,
        }
    }
}

impl<W> CaseHook<W> {
    /// Unique [`Id`] of this [`CaseHook`].
    #[must_use]
    pub const fn id(&self) -> &Id {
        &self.id
    }

    /// Keyword of this [`CaseHook`].
    #[must_use]
    pub const fn keyword(&self) -> CaseHookKeyword {
        self.keyword
    }

    /// Tag expression scoping this [`CaseHook`], if any.
    #[must_use]
    pub fn tags(&self) -> Option<&str> {
        self.predicate.source()
    }

    /// Indicates whether this [`CaseHook`] applies to a scenario with the
    /// given `tags`.
    #[must_use]
    pub fn applies_to<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        self.predicate.evaluate(tags)
    }

    /// Relative order of this [`CaseHook`].
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// [`Location`] of the declaration, if captured.
    #[must_use]
    pub const fn position(&self) -> Option<Location> {
        self.position
    }

    /// Name of this [`CaseHook`], if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl<W> StepHook<W> {
    /// Keyword of this [`StepHook`].
    #[must_use]
    pub const fn keyword(&self) -> StepHookKeyword {
        self.keyword
    }

    /// Tag expression scoping this [`StepHook`], if any.
    #[must_use]
    pub fn tags(&self) -> Option<&str> {
        self.predicate.source()
    }

    /// Indicates whether this [`StepHook`] applies to steps of a scenario with
    /// the given `tags`.
    #[must_use]
    pub fn applies_to<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        self.predicate.evaluate(tags)
    }

    /// Relative order of this [`StepHook`].
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// [`Location`] of the declaration, if captured.
    #[must_use]
    pub const fn position(&self) -> Option<Location> {
        self.position
    }

    /// Name of this [`StepHook`], if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl<W> RunHook<W> {
    /// Keyword of this [`RunHook`].
    #[must_use]
    pub const fn keyword(&self) -> RunHookKeyword {
        self.keyword
    }

    /// Relative order of this [`RunHook`].
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// [`Location`] of the declaration, if captured.
    #[must_use]
    pub const fn position(&self) -> Option<Location> {
        self.position
    }
}

impl<W> fmt::Debug for CaseHook<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseHook")
            .field("id", &self.id)
            .field("keyword", &self.keyword)
            .field("tags", &self.tags())
            .field("order", &self.order)
            .field("position", &self.position)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<W> fmt::Debug for StepHook<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepHook")
            .field("keyword", &self.keyword)
            .field("tags", &self.tags())
            .field("order", &self.order)
            .field("position", &self.position)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<W> fmt::Debug for RunHook<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHook")
            .field("keyword", &self.keyword)
            .field("order", &self.order)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// Sorts `hooks` by their `order`, keeping registration order among equal
/// ones, and reverses the result for `after`-semantic hooks.
///
/// Returns a new [`Vec`], leaving `hooks` untouched.
pub fn ordered<'h, H: 'h>(
    hooks: impl IntoIterator<Item = &'h H>,
    order: impl Fn(&H) -> i32,
    after: bool,
) -> Vec<&'h H> {
    let mut hooks = hooks.into_iter().collect::<Vec<_>>();
    hooks.sort_by_key(|h| order(h));
    if after {
        hooks.reverse();
    }
    hooks
}
