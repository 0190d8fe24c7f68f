pub mod commands;
pub mod effects;
pub mod engine;
pub mod range;
pub mod resolver;
pub mod state;
pub mod stats;

#[cfg(test)]
mod tests;
