//! Host class context and the in-process native host.

mod native;

pub use native::NativeHost;

use crate::traits::host::HostRuntime;
use crate::types::HostKind;
use crate::{MarshalError, Result};

/// Resolved host classes, one per [`HostKind`].
///
/// Built once at startup with [`HostContext::initialize`] and passed by
/// reference to every marshalling call. Call [`HostContext::teardown`] with
/// the same runtime before shutting the runtime down.
pub struct HostContext<H: HostRuntime> {
    classes: Vec<H::Class>,
}

impl<H: HostRuntime> HostContext<H> {
    /// Resolve every host class.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error. Classes resolved before the
    /// failure are released.
    pub fn initialize(host: &mut H) -> Result<Self> {
        let mut classes = Vec::new();
        classes
            .try_reserve_exact(HostKind::ALL.len())
            .map_err(crate::error::reserve_failed("host classes"))?;
        for kind in HostKind::ALL {
            match host.resolve_class(kind) {
                Ok(class) => classes.push(class),
                Err(e) => {
                    tracing::warn!(class = kind.class_name(), error = %e, "host class resolution failed");
                    for class in classes.drain(..).rev() {
                        host.release_class(class);
                    }
                    return Err(e);
                }
            }
        }
        tracing::debug!(classes = classes.len(), "host context initialized");
        Ok(Self { classes })
    }

    /// Class handle for `kind`.
    ///
    /// # Errors
    ///
    /// Returns a host error if the context holds no class for `kind`.
    pub fn class(&self, kind: HostKind) -> Result<&H::Class> {
        self.classes
            .get(kind.index())
            .ok_or_else(|| MarshalError::host(format!("class {} not resolved", kind.class_name())))
    }

    /// Release every resolved class.
    pub fn teardown(mut self, host: &mut H) {
        for class in self.classes.drain(..).rev() {
            host.release_class(class);
        }
        tracing::debug!("host context torn down");
    }
}

impl<H: HostRuntime> std::fmt::Debug for HostContext<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("classes", &self.classes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_resolves_all() {
        let mut host = NativeHost::new();
        let context = HostContext::initialize(&mut host).unwrap();
        assert_eq!(*context.class(HostKind::Decimal).unwrap(), HostKind::Decimal);
        assert_eq!(host.live_classes(), HostKind::ALL.len());
        context.teardown(&mut host);
        assert_eq!(host.live_classes(), 0);
    }

    #[test]
    fn test_initialize_rolls_back() {
        let mut host = NativeHost::new().without_class(HostKind::Timestamp);
        let err = HostContext::initialize(&mut host).unwrap_err();
        assert!(err.is_host_error());
        assert_eq!(host.live_classes(), 0);
    }
}
