pub mod errors;
pub mod db;
pub mod user;
pub mod city;
pub mod wash;
pub mod post;
pub mod price;
pub mod story;
pub mod wash_user;
pub mod user_favorite;

#[cfg(test)]
mod tests;
