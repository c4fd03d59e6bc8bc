//! Program store port — persistence for program definitions.

use std::future::Future;
use std::sync::Arc;

use irrigo_domain::error::IrrigoError;
use irrigo_domain::id::ProgramId;
use irrigo_domain::program::{NewProgram, Program, ProgramPatch};

/// Durable storage for [`Program`]s.
///
/// Every call reads or writes current truth; callers never cache.
pub trait ProgramStore {
    /// Every stored program, in id order.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Program>, IrrigoError>> + Send;

    /// Get a program by its row id.
    fn get(
        &self,
        id: ProgramId,
    ) -> impl Future<Output = Result<Option<Program>, IrrigoError>> + Send;

    /// Insert a new program and return it with its assigned id.
    fn insert(
        &self,
        program: NewProgram,
    ) -> impl Future<Output = Result<Program, IrrigoError>> + Send;

    /// Write only the fields present in `patch` and return the updated program.
    ///
    /// Fails with [`IrrigoError::NotFound`] when no program has `id`.
    fn update(
        &self,
        id: ProgramId,
        patch: ProgramPatch,
    ) -> impl Future<Output = Result<Program, IrrigoError>> + Send;

    /// Delete a program.
    ///
    /// Fails with [`IrrigoError::NotFound`] when no program has `id`.
    fn delete(&self, id: ProgramId) -> impl Future<Output = Result<(), IrrigoError>> + Send;
}

impl<T: ProgramStore + Send + Sync> ProgramStore for Arc<T> {
    fn list_all(&self) -> impl Future<Output = Result<Vec<Program>, IrrigoError>> + Send {
        (**self).list_all()
    }

    fn get(
        &self,
        id: ProgramId,
    ) -> impl Future<Output = Result<Option<Program>, IrrigoError>> + Send {
        (**self).get(id)
    }

    fn insert(
        &self,
        program: NewProgram,
    ) -> impl Future<Output = Result<Program, IrrigoError>> + Send {
        (**self).insert(program)
    }

    fn update(
        &self,
        id: ProgramId,
        patch: ProgramPatch,
    ) -> impl Future<Output = Result<Program, IrrigoError>> + Send {
        (**self).update(id, patch)
    }

    fn delete(&self, id: ProgramId) -> impl Future<Output = Result<(), IrrigoError>> + Send {
        (**self).delete(id)
    }
}
