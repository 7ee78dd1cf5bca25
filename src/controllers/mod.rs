pub mod support;

pub mod auth_controller;
pub mod buy_controller;
pub mod home_controller;
pub mod lightning_controller;
pub mod orders_controller;
pub mod profile_controller;
pub mod sell_controller;
