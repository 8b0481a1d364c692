// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

mod prices;
mod selectors;
mod table;

pub use prices::*;
pub use selectors::*;
pub use table::*;
