// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Source positions of step and hook declarations.

use std::panic;

use derive_more::with_trait::Display;

/// Location of a step or hook declaration in the source code.
///
/// Captured from the declaration call site via `#[track_caller]`, so it points
/// to the line calling [`Registry::define_step()`] (or any other `define_*`
/// method) rather than into this crate.
///
/// [`Registry::define_step()`]: crate::Registry::define_step
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{path}:{line}:{column}")]
pub struct Location {
    /// Path to the file containing the declaration.
    pub path: &'static str,

    /// Line of the declaration.
    pub line: u32,

    /// Column of the declaration.
    pub column: u32,
}

impl Location {
    /// Creates a new [`Location`] out of its parts.
    #[must_use]
    pub const fn new(path: &'static str, line: u32, column: u32) -> Self {
        Self { path, line, column }
    }

    /// Returns the [`Location`] of the caller of the function this is invoked
    /// in, following the `#[track_caller]` chain.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let loc = panic::Location::caller();
        Self::new(loc.file(), loc.line(), loc.column())
    }
}
