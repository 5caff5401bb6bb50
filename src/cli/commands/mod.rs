pub mod defaults;
pub mod wallet;
