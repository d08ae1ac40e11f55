//! Write-once slot for memoized inputs

use serde::Serialize;

/// A value that can be assigned once and is then frozen.
///
/// The regional coefficients `A`, `F` and `η` are shared between the
/// concentration and permissible-emission stages: whichever stage succeeds
/// first fixes them for the rest of the calculation. A second write is a
/// no-op; [`SetOnce::set`] reports whether the write took effect.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct SetOnce<T>(Option<T>);

impl<T> SetOnce<T> {
    /// Create an empty slot
    pub const fn new() -> Self {
        SetOnce(None)
    }

    /// Store `value` if the slot is empty. Returns `true` when stored.
    pub fn set(&mut self, value: T) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(value);
        true
    }
}

impl<T: Copy> SetOnce<T> {
    /// Copy of the current value
    pub fn value(&self) -> Option<T> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let mut slot = SetOnce::new();
        assert_eq!(slot.value(), None);
        assert!(slot.set(160.0));
        assert!(!slot.set(200.0));
        assert_eq!(slot.value(), Some(160.0));
    }

    #[test]
    fn test_serialized_as_inner_option() {
        let mut slot = SetOnce::new();
        assert_eq!(serde_json::to_string(&slot).unwrap(), "null");
        slot.set(1.5);
        assert_eq!(serde_json::to_string(&slot).unwrap(), "1.5");
    }
}
