// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Identifiers assigned to [`StepDefinition`]s and [`CaseHook`]s when a
//! [`Registry`] is finalized.
//!
//! [`CaseHook`]: crate::CaseHook
//! [`Registry`]: crate::Registry
//! [`StepDefinition`]: crate::StepDefinition

use derive_more::with_trait::{AsRef, Display, From, Into};

/// Unique identifier of a finalized record inside a single [`Registry`].
///
/// [`Registry`]: crate::Registry
#[derive(
    AsRef, Clone, Debug, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[as_ref(forward)]
pub struct Id(String);

impl Id {
    /// Creates a new [`Id`] out of the provided `value`.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns this [`Id`] as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Returns an id generator yielding `"0"`, `"1"`, `"2"` and so on.
///
/// Every call creates an independent counter, so two generators never share
/// their state.
pub fn incrementing() -> impl FnMut() -> Id {
    let mut next = 0_u64;
    move || {
        let id = Id(next.to_string());
        next += 1;
        id
    }
}
