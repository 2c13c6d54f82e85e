#[path = "../common/mod.rs"]
mod common;

mod contradiction;
mod laws;
mod modules;
mod paths;
