//! Row-partitioned parallel execution.
//!
//! Every transform follows the same shape:
//!
//! 1. [`partition`] splits the destination height into contiguous
//!    [`RowRange`]s, one per worker.
//! 2. [`run`] splits the destination buffer into matching `&mut` row bands
//!    and spawns one scoped OS thread per band. Each thread evaluates a
//!    [`PixelKernel`] for every pixel of its band.
//! 3. All threads are joined before `run` returns.
//!
//! The source is only reachable through the kernel's shared borrow and each
//! band is an exclusive slice, so no locking is needed and the output does
//! not depend on thread scheduling.

mod executor;
mod partition;

pub use executor::{run, PixelKernel};
pub use partition::{partition, RowRange};
