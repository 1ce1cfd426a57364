// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property status flags.

bitflags::bitflags! {
    /// Flags describing how a property may be edited, shown and persisted.
    ///
    /// A [`PropertySpec`](crate::PropertySpec) carries the default flags for a
    /// property; each container keeps its own runtime status per property,
    /// starting from those defaults.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PropertyFlags: u8 {
        /// Editors should not offer the property for editing.
        ///
        /// Programmatic writes are still accepted.
        const READ_ONLY = 0b0000_0001;
        /// Editors should not list the property.
        const HIDDEN    = 0b0000_0010;
        /// The property cannot be removed while set.
        const LOCKED    = 0b0000_0100;
        /// The property is skipped by [`save`](crate::save).
        const TRANSIENT = 0b0000_1000;
    }
}
