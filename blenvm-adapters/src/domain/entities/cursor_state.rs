//! Cursor state for tracking seek progress.

use crate::domain::value_objects::RecordType;

/// Where a store handle's cursor stands.
///
/// Cursors transition through these states:
/// - Unpositioned: freshly initialized, rewound, or run off the end
/// - Positioned: a `First`/`Next` seek with this filter found a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CursorState {
    /// No record under the cursor.
    #[default]
    Unpositioned,
    /// On a record found with the given filter.
    Positioned(RecordType),
}

impl CursorState {
    /// Check if the cursor is on a record.
    #[inline]
    pub const fn is_positioned(&self) -> bool {
        matches!(self, CursorState::Positioned(_))
    }

    /// The filter of the seek that positioned the cursor.
    #[inline]
    pub const fn filter(&self) -> Option<RecordType> {
        match self {
            CursorState::Positioned(filter) => Some(*filter),
            CursorState::Unpositioned => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_state_checks() {
        let idle = CursorState::Unpositioned;
        assert!(!idle.is_positioned());
        assert_eq!(idle.filter(), None);

        let on_gatt = CursorState::Positioned(RecordType::GATT);
        assert!(on_gatt.is_positioned());
        assert_eq!(on_gatt.filter(), Some(RecordType::GATT));
    }

    #[test]
    fn test_cursor_state_default() {
        assert_eq!(CursorState::default(), CursorState::Unpositioned);
    }
}
