//! Library context: one backend, one type registry, explicit lifetime
//!
//! `Context` replaces the process-wide library singleton found in native
//! GraphBLAS-style implementations: callers construct it explicitly, hand it
//! to every container constructor, and drop it after the last container is
//! gone. Clones share the same backend and registry.

use crate::backend::Backend;
use crate::dtype::{DType, TypeInfo, TypeRegistry};
use crate::error::Result;
use crate::exec::{Schedule, ScheduleTask};
use log::debug;
use std::sync::Arc;

struct ContextInner<B: Backend> {
    backend: B,
    registry: TypeRegistry,
}

/// Handle to a constructed backend plus the registered type set.
///
/// Construction registers the fixed built-in types before any container can
/// exist, which keeps registration a startup-time concern.
pub struct Context<B: Backend> {
    inner: Arc<ContextInner<B>>,
}

impl<B: Backend> Clone for Context<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend> std::fmt::Debug for Context<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Context({})", self.inner.backend.name())
    }
}

impl<B: Backend> Context<B> {
    /// Create a context over a constructed backend, registering the
    /// built-in type set
    pub fn new(backend: B) -> Self {
        let registry = TypeRegistry::with_built_in();
        debug!("context created over backend '{}'", backend.name());
        Self {
            inner: Arc::new(ContextInner { backend, registry }),
        }
    }

    /// The backend this context talks to
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Resolve the accessor descriptor for a dtype
    ///
    /// # Errors
    ///
    /// `UnknownType` if the dtype was never registered.
    pub fn type_info(&self, dtype: DType) -> Result<&'static TypeInfo> {
        self.inner.registry.lookup(dtype)
    }

    /// Run one validated task to completion
    pub fn execute(&self, task: &ScheduleTask<B>) -> Result<()> {
        task.execute()
    }

    /// Start an empty deferred schedule
    pub fn schedule(&self) -> Schedule<B> {
        Schedule::new()
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::backend::cpu::CpuBackend;

    #[test]
    fn test_context_registers_built_ins() {
        let ctx = Context::new(CpuBackend::new());
        for dtype in DType::ALL {
            assert!(ctx.type_info(dtype).is_ok());
        }
    }

    #[test]
    fn test_context_clone_shares_backend() {
        let ctx = Context::new(CpuBackend::new());
        let clone = ctx.clone();
        assert_eq!(ctx.backend().name(), clone.backend().name());
    }
}
