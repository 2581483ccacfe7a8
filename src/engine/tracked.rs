use std::cell::Cell;

/// A value that can track whether it has been changed.
///
/// Any mutable access marks the value as changed, so consumers can react once per change by
/// calling [Tracked::if_changed].
pub struct Tracked<T> {
    value: T,
    changed: Cell<bool>,
}

impl<T> Tracked<T> {
    /// Create a new value with a changed status.
    pub fn new(value: T) -> Self {
        Self {
            value,
            changed: Cell::new(true),
        }
    }

    /// Returns true if the value was changed.
    #[allow(unused)]
    pub fn changed(&self) -> bool {
        self.changed.get()
    }

    /// Flag the value as changed without touching it, e.g. when something it is combined with
    /// changed.
    pub fn mark_changed(&self) {
        self.changed.replace(true);
    }

    /// Call the function with a reference to the value if the value was changed and reset the
    /// status to unchanged if it was.
    pub fn if_changed(&self, mut f: impl FnMut(&T)) -> bool {
        let changed = self.changed.get();
        if changed {
            f(&self.value);
            self.changed.replace(false);
        }
        changed
    }
}

impl<T: PartialEq> Tracked<T> {
    /// Replace the value, only marking it as changed when the new value is different.
    pub fn set(&mut self, value: T) {
        if self.value != value {
            self.value = value;
            self.changed.replace(true);
        }
    }
}

impl<T> std::ops::Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> std::ops::DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.changed.replace(true);
        &mut self.value
    }
}
