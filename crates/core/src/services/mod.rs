//! Business logic services.

#![allow(missing_docs)]

pub mod menu;
pub mod restaurant;
pub mod user;
pub mod voting;
pub mod winner;

pub use menu::{MenuPatch, MenuService, NewItem, PatchOp};
pub use restaurant::{CreateRestaurantInput, RestaurantService};
pub use user::{CreateUserInput, UserService};
pub use voting::{VoteHistoryEntry, VotingService, VotingWindow};
pub use winner::{select_winners, Winner, WinnerService};
