use crate::traits::host::HostRuntime;
use crate::types::{HostKind, HostValue};
use crate::{MarshalError, Result};

/// In-process host whose objects are plain [`HostValue`]s.
///
/// Useful for embedding without a managed runtime and as a test double:
/// it can be told to miss a class or to fail after a number of
/// constructions.
#[derive(Debug, Clone, Default)]
pub struct NativeHost {
    live_classes: usize,
    constructed: usize,
    missing: Option<HostKind>,
    fail_after: Option<usize>,
}

impl NativeHost {
    /// Create a host that resolves every class.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail resolution of `kind`.
    #[must_use]
    pub const fn without_class(mut self, kind: HostKind) -> Self {
        self.missing = Some(kind);
        self
    }

    /// Fail every construction after the first `count`.
    #[must_use]
    pub const fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Number of resolved classes not yet released.
    #[must_use]
    pub const fn live_classes(&self) -> usize {
        self.live_classes
    }

    /// Number of objects constructed so far.
    #[must_use]
    pub const fn constructed(&self) -> usize {
        self.constructed
    }
}

impl HostRuntime for NativeHost {
    type Class = HostKind;
    type Object = HostValue;

    fn resolve_class(&mut self, kind: HostKind) -> Result<HostKind> {
        if self.missing == Some(kind) {
            return Err(MarshalError::host(format!("class {} not found", kind.class_name())));
        }
        self.live_classes += 1;
        Ok(kind)
    }

    fn release_class(&mut self, _class: HostKind) {
        self.live_classes = self.live_classes.saturating_sub(1);
    }

    fn construct(&mut self, class: &HostKind, value: HostValue) -> Result<HostValue> {
        if self.fail_after.is_some_and(|limit| self.constructed >= limit) {
            return Err(MarshalError::host(format!("could not construct {}", class.class_name())));
        }
        if value.kind() != *class {
            return Err(MarshalError::type_mismatch(class.class_name(), value.kind().class_name()));
        }
        self.constructed += 1;
        Ok(value)
    }

    fn extract(&mut self, object: &HostValue) -> Result<HostValue> {
        Ok(object.clone())
    }
}
