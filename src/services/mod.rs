pub mod assignment;
pub mod directory;
pub mod earnings;
pub mod orders;

#[cfg(test)]
pub(crate) mod testing;

pub use assignment::{assign, AssignmentOutcome, AssignmentRequest};
pub use directory::{Directory, DirectoryView, Snapshot};
pub use earnings::Paginator;
pub use orders::{OrderBoard, OrderRow, PartyCell, TransitionPolicy};
