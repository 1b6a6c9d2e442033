//! Database entities.

pub mod daily_menu;
pub mod item;
pub mod item_daily_menu;
pub mod restaurant;
pub mod user;
pub mod vote;
pub mod vote_winner;

pub use daily_menu::{Entity as DailyMenu, Weekday};
pub use item::Entity as Item;
pub use item_daily_menu::Entity as ItemDailyMenu;
pub use restaurant::Entity as Restaurant;
pub use user::{Entity as User, Role};
pub use vote::Entity as Vote;
pub use vote_winner::Entity as VoteWinner;
