// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step and hook [`Registry`] of a [Cucumber] runner.
//!
//! A run driver declares steps, hooks and [`ParameterType`]s into a
//! [`Registry`], [finalizes][1] it, and then, for every executed scenario,
//! asks it which hooks to run (in which order) and which [`StepDefinition`]
//! implements each step text:
//!
//! 1. Declarations: [`Registry::define_step()`],
//!    [`Registry::define_parameter_type()`], [`Registry::define_before()`],
//!    [`Registry::define_after_step()`], [`Registry::define_before_all()`] and
//!    so on, usually done via a [`Slot`] binding the [`Registry`] of the run.
//! 2. [`Registry::finalize()`] compiles step patterns and assigns [`Id`]s.
//! 3. Queries: [`Registry::resolve_step_definition()`],
//!    [`Registry::resolve_before_hooks()`],
//!    [`Registry::resolve_after_hooks()`] and others, along with the
//!    `run_*()` entry points invoking the implementations.
//!
//! Step patterns are either [Cucumber Expressions][2] or [`Regex`]es, hooks
//! are scoped with [tag expressions][3].
//!
//! [`Regex`]: regex::Regex
//! [Cucumber]: https://cucumber.io
//! [1]: Registry::finalize
//! [2]: https://github.com/cucumber/cucumber-expressions#readme
//! [3]: https://cucumber.io/docs/cucumber/api#tag-expressions

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(nonstandard_style, trivial_casts, trivial_numeric_casts)]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::missing_const_for_fn,
    clippy::todo,
    clippy::unwrap_used,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_import_braces,
    unused_labels,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        unused_results,
        reason = "tests are fine to panic"
    )
)]

pub mod binding;
pub mod cli;
pub mod error;
pub mod expression;
pub mod hook;
pub mod id;
pub mod parameter;
pub mod registry;
pub mod source;
pub mod step;
pub mod tag;

pub use gherkin;

#[doc(inline)]
pub use self::{
    binding::Slot,
    cli::Config,
    error::{
        ArgumentError, BindingError, ExpressionError, FinalizeError,
        MissingDefinitionError, MultipleDefinitionsError, RegistrationError,
        StepError, TagExpressionError,
    },
    expression::{Argument, Expression, StepPattern},
    hook::{
        CaseHook, CaseHookKeyword, CaseHookParameter, HookOptions, RunHook,
        RunHookKeyword, RunHookOptions, StepHook, StepHookKeyword,
        StepHookParameter, DEFAULT_HOOK_ORDER,
    },
    id::Id,
    parameter::{ParameterType, ParameterTypes},
    registry::Registry,
    source::Source,
    step::{
        Arguments, DataTable, Location, StepArgument, StepDefinition,
    },
    tag::{does_feature_match, TagPredicate},
};
