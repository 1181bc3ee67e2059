//! Parameter schemas for the chainhash modes.
//!
//! Each chainhash mode takes a fixed, ordered set of parameters. A
//! [`Format`] describes that set as (name, length) slots; a length of zero
//! marks the single variable-length slot, which is always last. The
//! schemas are fixed per mode, so they are hard-coded here instead of
//! being parsed from a schema string at runtime.

use crate::chainhash::ChainHashMode;

/// One parameter slot: a name and its byte length (0 = variable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameLen {
    /// Parameter name, unique within a format.
    pub name: &'static str,
    /// Byte length of the slot; 0 means any non-zero length.
    pub len: u8,
}

const fn slot(name: &'static str, len: u8) -> NameLen {
    NameLen { name, len }
}

/// Start number for count-salt modes.
const SN: NameLen = slot("SN", 8);

const NORMAL: &[NameLen] = &[];
const CONSTANT_SALT: &[NameLen] = &[slot("S", 0)];
const COUNT_SALT: &[NameLen] = &[SN];
const CONSTANT_COUNT_SALT: &[NameLen] = &[SN, slot("S", 0)];
const QUADRATIC: &[NameLen] = &[SN, slot("A", 8), slot("B", 8), slot("C", 8)];

/// The parameter schema of one chainhash mode.
///
/// Invariants (held by construction): slot names are unique, at most one
/// slot is variable-length and it is the last one, and the accumulated
/// fixed length stays at or below 255 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    mode: ChainHashMode,
    slots: &'static [NameLen],
}

impl Format {
    /// Returns the schema for a chainhash mode.
    pub fn for_mode(mode: ChainHashMode) -> Self {
        let slots = match mode {
            ChainHashMode::Normal => NORMAL,
            ChainHashMode::ConstantSalt => CONSTANT_SALT,
            ChainHashMode::CountSalt => COUNT_SALT,
            ChainHashMode::ConstantCountSalt => CONSTANT_COUNT_SALT,
            ChainHashMode::Quadratic => QUADRATIC,
        };
        Self { mode, slots }
    }

    /// Returns the chainhash mode this schema belongs to.
    pub fn mode(&self) -> ChainHashMode {
        self.mode
    }

    /// Returns the ordered parameter slots.
    pub fn slots(&self) -> &'static [NameLen] {
        self.slots
    }

    /// Returns the sum of the fixed slot lengths.
    pub fn fixed_len(&self) -> usize {
        self.slots.iter().map(|s| usize::from(s.len)).sum()
    }

    /// Returns `true` if the last slot takes a variable length.
    pub fn has_variable_slot(&self) -> bool {
        self.slots.last().is_some_and(|s| s.len == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_match_modes() {
        assert!(Format::for_mode(ChainHashMode::Normal).slots().is_empty());

        let cs = Format::for_mode(ChainHashMode::ConstantSalt);
        assert_eq!(cs.slots(), &[slot("S", 0)]);
        assert!(cs.has_variable_slot());

        let count = Format::for_mode(ChainHashMode::CountSalt);
        assert_eq!(count.slots(), &[slot("SN", 8)]);
        assert!(!count.has_variable_slot());

        let both = Format::for_mode(ChainHashMode::ConstantCountSalt);
        assert_eq!(both.slots().len(), 2);
        assert_eq!(both.fixed_len(), 8);
        assert!(both.has_variable_slot());

        let quad = Format::for_mode(ChainHashMode::Quadratic);
        assert_eq!(quad.fixed_len(), 32);
        assert!(!quad.has_variable_slot());
    }

    #[test]
    fn test_names_unique_and_variable_last() {
        for mode in ChainHashMode::ALL {
            let format = Format::for_mode(mode);
            let slots = format.slots();
            for (i, a) in slots.iter().enumerate() {
                for b in &slots[i + 1..] {
                    assert_ne!(a.name, b.name, "duplicate name in {mode:?}");
                }
            }
            for s in &slots[..slots.len().saturating_sub(1)] {
                assert_ne!(s.len, 0, "variable slot not last in {mode:?}");
            }
            assert!(format.fixed_len() <= 255);
        }
    }

    #[test]
    fn test_format_equality() {
        assert_eq!(
            Format::for_mode(ChainHashMode::Quadratic),
            Format::for_mode(ChainHashMode::Quadratic)
        );
        assert_ne!(
            Format::for_mode(ChainHashMode::Normal),
            Format::for_mode(ChainHashMode::CountSalt)
        );
    }
}
