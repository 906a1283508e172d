//! Engine-owned collaborator pieces: the atom provider and the scheduler.

use std::time::Duration;

use async_trait::async_trait;
use wireseek_atoms::AtomName;

/// Resolves canonical atom names to script source.
pub trait ScriptAtomProvider: Send + Sync {
    fn get(&self, atom: AtomName) -> &str;
}

/// Default provider backed by the atoms bundled in `wireseek-atoms`.
pub struct BundledAtoms;

impl ScriptAtomProvider for BundledAtoms {
    fn get(&self, atom: AtomName) -> &str {
        wireseek_atoms::source(atom)
    }
}

/// The deferral primitive between poll attempts.
///
/// Injected so the retry machine stays decoupled from any particular timer;
/// tests substitute a recording scheduler instead of faking time.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production scheduler delegating to the tokio timer.
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
