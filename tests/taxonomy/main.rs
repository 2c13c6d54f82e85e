#[path = "../common/mod.rs"]
mod common;

mod closure;
mod edges;
mod retirement;
mod reverse_index;
