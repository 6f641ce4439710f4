//! Host-facing entry point bundling runtime, class context and
//! configuration.

use crate::column::Column;
use crate::config::MarshalConfig;
use crate::host::HostContext;
use crate::traits::host::{HostRuntime, PrimitiveArray};
use crate::traits::sealed::Primitive;
use crate::types::LogicalType;
use crate::{Result, fetch, probe, store};

/// Marshalling operations against one host runtime.
///
/// # Example
///
/// ```rust
/// use monetdb_marshal::{HostContext, LogicalType, MarshalConfig, Marshaller, NativeHost};
/// use monetdb_marshal::types::HostValue;
///
/// let mut host = NativeHost::new();
/// let context = HostContext::initialize(&mut host).unwrap();
/// let config = MarshalConfig::default();
/// let mut marshaller = Marshaller::new(&mut host, &context, &config);
///
/// let objects = vec![Some(HostValue::Integer(5)), None, Some(HostValue::Integer(3))];
/// let column = marshaller.store_objects(LogicalType::Int, &objects).unwrap();
/// assert_eq!(marshaller.fetch_scalar(&column, 0).unwrap(), Some(HostValue::Integer(5)));
/// assert_eq!(marshaller.fetch_scalar(&column, 1).unwrap(), None);
/// ```
pub struct Marshaller<'a, H: HostRuntime> {
    host: &'a mut H,
    context: &'a HostContext<H>,
    config: &'a MarshalConfig,
}

impl<'a, H: HostRuntime> Marshaller<'a, H> {
    /// Bind a runtime, its resolved classes and a configuration.
    pub const fn new(host: &'a mut H, context: &'a HostContext<H>, config: &'a MarshalConfig) -> Self {
        Self {
            host,
            context,
            config,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &MarshalConfig {
        self.config
    }

    /// Nil bitmap of `size` rows starting at `first`.
    ///
    /// # Errors
    ///
    /// See [`probe::probe_nulls`].
    pub fn probe_nulls(&self, column: &Column, first: usize, size: usize) -> Result<Vec<bool>> {
        probe::probe_nulls(column, first, size)
    }

    /// Host object for `row`, or `None` for nil.
    ///
    /// # Errors
    ///
    /// See [`fetch::fetch_scalar`].
    pub fn fetch_scalar(&mut self, column: &Column, row: usize) -> Result<Option<H::Object>> {
        fetch::fetch_scalar(self.host, self.context, column, row, self.config)
    }

    /// Fill a primitive array from `size` rows starting at `first`.
    ///
    /// # Errors
    ///
    /// See [`fetch::fetch_flat`].
    pub fn fetch_flat<P, D>(&self, column: &Column, first: usize, size: usize, dst: &mut D) -> Result<()>
    where
        P: Primitive,
        D: PrimitiveArray<P> + ?Sized,
    {
        fetch::fetch_flat(column, first, size, dst)
    }

    /// Fill an object array from rows starting at `first`.
    ///
    /// # Errors
    ///
    /// See [`fetch::fetch_objects`].
    pub fn fetch_objects(&mut self, column: &Column, first: usize, out: &mut [Option<H::Object>]) -> Result<()> {
        fetch::fetch_objects(self.host, self.context, column, first, out, self.config)
    }

    /// Build a column from host objects.
    ///
    /// # Errors
    ///
    /// See [`store::store_objects`].
    pub fn store_objects(&mut self, ty: LogicalType, objects: &[Option<H::Object>]) -> Result<Column> {
        store::store_objects(self.host, ty, objects, self.config)
    }

    /// Build a column from a primitive array.
    ///
    /// # Errors
    ///
    /// See [`store::store_primitive`].
    pub fn store_primitive<P: Primitive>(&self, ty: LogicalType, values: &[P]) -> Result<Column> {
        store::store_primitive(ty, values, self.config)
    }
}

impl<H: HostRuntime> std::fmt::Debug for Marshaller<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marshaller")
            .field("context", self.context)
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
