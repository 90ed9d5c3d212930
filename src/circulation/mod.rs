/// Circulation: borrow and wishlist membership
///
/// Toggles a book in and out of a user's borrowed/wishlist sets, keeping
/// the book's availability flag and the loan ledger in lockstep with
/// borrow toggles.

pub mod manager;

pub use manager::{BorrowOutcome, CirculationManager, LikeOutcome};
