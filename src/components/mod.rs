//! Presentational view models. They hold no state of their own and are
//! built fresh from whatever the page controller passes in.

mod header;
mod recipe_card;
mod recipe_detail;

pub use header::{HeaderView, SearchBox, UserMenu};
pub use recipe_card::RecipeCard;
pub use recipe_detail::{RecipeDetail, Step};
