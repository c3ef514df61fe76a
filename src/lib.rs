#[allow(non_snake_case)]
pub mod Activity;
#[allow(non_snake_case)]
pub mod Common;
#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Reactions;
#[allow(non_snake_case)]
pub mod Utils;
pub mod settings;
