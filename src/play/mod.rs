//! Interactive game runners built on the training stack.

pub mod arena;
pub mod human;
