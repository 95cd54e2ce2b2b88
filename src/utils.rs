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

use lazy_static::lazy_static;
use std::{collections::HashSet, sync::Mutex};
use tracing::warn;

lazy_static! {
    static ref EMITTED_WARNINGS: Mutex<HashSet<String>> = Mutex::new(HashSet::new());
}

/// Emit `message` as a warning unless the exact same message was already
/// emitted by this process. Returns `true` when the warning was emitted.
pub fn warn_once<S: Into<String>>(message: S) -> bool {
    let message = message.into();
    // A poisoned lock only means another thread panicked while inserting,
    // the set itself is still usable.
    let mut emitted = EMITTED_WARNINGS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if emitted.contains(&message) {
        return false;
    }
    warn!("{}", message);
    emitted.insert(message);
    true
}

/// Forget every warning emitted so far, so they can be emitted again.
pub fn clear_warnings() {
    EMITTED_WARNINGS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clear();
}

macro_rules! warn_once {
    ($($arg:tt)*) => {
        $crate::utils::warn_once(format!($($arg)*))
    };
}

macro_rules! skip_fail {
    ($res:expr) => {{
        match $res {
            Ok(val) => val,
            Err(e) => {
                warn_once!("{:#}", e);
                continue;
            }
        }
    }};
}
