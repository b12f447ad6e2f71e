// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of the [`Slot`] holding the active [`Registry`].
//!
//! [`Registry`]: crate::Registry
//! [`Slot`]: crate::Slot

use derive_more::with_trait::{Display, Error};

/// Error of accessing or occupying a [`Slot`].
///
/// [`Slot`]: crate::Slot
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum BindingError {
    /// No [`Registry`] is bound, so no run is active.
    ///
    /// [`Registry`]: crate::Registry
    #[display(
        "Expected to find an active registry, but none is bound (this usually \
         means steps or hooks are declared outside of a run's declaration \
         phase, which is not supported)"
    )]
    Unbound,

    /// Another [`Registry`] is bound already.
    ///
    /// [`Registry`]: crate::Registry
    #[display(
        "A registry is already bound to this slot, unbind it before starting \
         another run"
    )]
    AlreadyBound,
}
