// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! An additive flag-set macro.
//!
//! The generated types only grow: there is `insert` and `|`, but no removal.
//! Capability masks are accumulated this way and must never lose a bit.

/// Declares a copyable flag-set newtype with union-only mutation.
#[macro_export]
#[doc(hidden)]
macro_rules! vesta_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// No flags set.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Builds a set from raw bits, unknown bits included.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits }
            }

            /// Raw value of the set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// `true` if every flag of `other` is set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// `true` if `self` and `other` share at least one flag.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Union of both sets.
            #[must_use]
            pub const fn union(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }

            /// Adds the flags of `other` to `self`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                self.union(other)
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.insert(other);
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                if self.bits == 0 {
                    return write!(f, "{}(EMPTY)", stringify!($name));
                }
                let mut remaining = self.bits;
                let mut parts: Vec<&'static str> = Vec::new();
                $(
                    if $flag_value != 0 && (remaining & $flag_value) == $flag_value {
                        parts.push(stringify!($flag_name));
                        remaining &= !$flag_value;
                    }
                )*
                write!(f, "{}(", stringify!($name))?;
                write!(f, "{}", parts.join(" | "))?;
                if remaining != 0 {
                    if !parts.is_empty() {
                        write!(f, " | ")?;
                    }
                    write!(f, "{:#x}", remaining)?;
                }
                write!(f, ")")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::vesta_bitflags;

    vesta_bitflags! {
        /// Flags used to exercise the macro.
        pub struct Probe: u8 {
            const A = 1 << 0;
            const B = 1 << 1;
            const C = 1 << 2;
            const AC = (1 << 0) | (1 << 2);
        }
    }

    #[test]
    fn empty_set_contains_nothing_but_empty() {
        let flags = Probe::EMPTY;
        assert!(flags.is_empty());
        assert!(flags.contains(Probe::EMPTY));
        assert!(!flags.contains(Probe::A));
        assert_eq!(Probe::default(), Probe::EMPTY);
        assert_eq!(format!("{flags:?}"), "Probe(EMPTY)");
    }

    #[test]
    fn union_accumulates() {
        let mut flags = Probe::A;
        flags |= Probe::C;
        assert_eq!(flags, Probe::AC);
        assert!(flags.contains(Probe::A | Probe::C));
        assert!(!flags.contains(Probe::B));
        assert!(flags.intersects(Probe::C | Probe::B));
        assert_eq!(format!("{flags:?}"), "Probe(A | C)");
    }

    #[test]
    fn inserting_twice_is_idempotent() {
        let mut flags = Probe::B;
        flags.insert(Probe::B);
        assert_eq!(flags.bits(), 0b010);
    }

    #[test]
    fn unknown_bits_are_kept_and_printed() {
        let flags = Probe::A | Probe::from_bits_truncate(0x40);
        assert_eq!(flags.bits(), 0x41);
        assert_eq!(format!("{flags:?}"), "Probe(A | 0x40)");
        assert_eq!((flags & Probe::A), Probe::A);
    }
}
