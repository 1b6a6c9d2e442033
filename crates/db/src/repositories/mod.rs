//! Database repositories.

mod menu;
mod restaurant;
mod user;
mod vote;
mod winner;

pub use menu::{ItemFilter, MenuRepository};
pub use restaurant::RestaurantRepository;
pub use user::UserRepository;
pub use vote::{VoteRepository, VoteTally};
pub use winner::WinnerRepository;
