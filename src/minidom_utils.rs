// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Text accessors on a [Element](minidom::Element), on top of the child
//! lookups of [minidom_ext].

use crate::Result;
use anyhow::anyhow;
use minidom::Element;
use minidom_ext::OnlyChildElementExt;

/// Text and repeated-children accessors missing from
/// [OnlyChildElementExt](minidom_ext::OnlyChildElementExt).
pub trait ElementExt {
    /// Iterates over the children named `child_name`, in document order.
    fn children_named<'a>(&'a self, child_name: &'a str) -> Box<dyn Iterator<Item = &'a Self> + 'a>;

    /// Trimmed text of the only child named `child_name`. A missing child, a
    /// repeated child and an empty text are all `None`.
    fn child_text(&self, child_name: &str) -> Option<String>;

    /// Same as [child_text](ElementExt::child_text) but fails when the text is
    /// missing.
    fn try_child_text(&self, child_name: &str) -> Result<String> {
        self.child_text(child_name)
            .ok_or_else(|| anyhow!("Failed to find a text for child '{}'", child_name))
    }
}

impl ElementExt for Element {
    fn children_named<'a>(&'a self, child_name: &'a str) -> Box<dyn Iterator<Item = &'a Self> + 'a> {
        Box::new(self.children().filter(move |child| child.name() == child_name))
    }

    fn child_text(&self, child_name: &str) -> Option<String> {
        self.only_child(child_name)
            .map(|child| child.text().trim().to_string())
            .filter(|text| !text.is_empty())
    }
}
