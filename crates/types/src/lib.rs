//! Transaction and workload model.
//!
//! The entity model consumed by scheduler simulations: transactions carry
//! a set of identities plus read/write access sets, and the conflict
//! algebra (`compat`/`merge`) decides which transactions can share a
//! batch. The algebra is written once against [`AccessSet`], a two-variant
//! capability interface, so it behaves identically whether the sets are
//! exact (`BTreeSet`-backed) or approximate (bloom filters from
//! `skewbench-bloom`).
//!
//! With approximate sets the algebra is conservative toward declaring
//! conflict: a true conflict is never missed, but unrelated ids colliding
//! in the bit arrays can make two independent transactions look
//! conflicting.

pub mod ids;
pub mod set;
pub mod transaction;
pub mod workload;

pub use ids::{ObjectId, TxnId};
pub use set::{AccessSet, ExactSet};
pub use transaction::{IdSet, MergeError, Transaction};
pub use workload::Workload;
