// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`DataTable`] view over a Gherkin step table.

use std::collections::HashMap;

use itertools::Itertools as _;

/// Data table attached to a Gherkin step, passed to a step implementation as
/// its trailing [`StepArgument`].
///
/// [`StepArgument`]: super::StepArgument
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DataTable {
    /// Cells of this table, header row included.
    cells: Vec<Vec<String>>,
}

impl DataTable {
    /// Creates a new [`DataTable`] out of the provided `cells`.
    #[must_use]
    pub const fn new(cells: Vec<Vec<String>>) -> Self {
        Self { cells }
    }

    /// Returns all the cells of this [`DataTable`], header row included.
    #[must_use]
    pub fn raw(&self) -> &[Vec<String>] {
        &self.cells
    }

    /// Returns all the rows of this [`DataTable`] except the header one.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        self.cells.get(1..).unwrap_or_default()
    }

    /// Returns every non-header row as a map keyed by the header row.
    #[must_use]
    pub fn hashes(&self) -> Vec<HashMap<String, String>> {
        let Some((header, rows)) = self.cells.split_first() else {
            return Vec::new();
        };
        rows.iter()
            .map(|row| header.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    /// Returns a two-column table as a map from the first column to the
    /// second one.
    ///
    /// [`None`] is returned if any row doesn't have exactly two cells.
    #[must_use]
    pub fn rows_hash(&self) -> Option<HashMap<String, String>> {
        self.cells
            .iter()
            .map(|row| row.iter().cloned().collect_tuple::<(_, _)>())
            .collect()
    }

    /// Returns this [`DataTable`] with rows and columns swapped.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let width = self.cells.first().map_or(0, Vec::len);
        let cells = (0..width)
            .map(|col| {
                self.cells
                    .iter()
                    .filter_map(|row| row.get(col).cloned())
                    .collect()
            })
            .collect();
        Self { cells }
    }
}

impl From<&gherkin::Table> for DataTable {
    fn from(table: &gherkin::Table) -> Self {
        Self::new(table.rows.clone())
    }
}

impl<S: Into<String>> From<Vec<Vec<S>>> for DataTable {
    fn from(cells: Vec<Vec<S>>) -> Self {
        Self::new(
            cells
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}
