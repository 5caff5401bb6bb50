//! Defaults Command
//!
//! Show defaults resolved from built-in values and `BT_*` environment
//! variables.

use crate::config::{ConfigTree, OutputFormat};
use crate::types::Result;
use crate::wallet;

pub fn run(format: OutputFormat) -> Result<()> {
    let mut defaults = ConfigTree::new();
    wallet::add_defaults(&mut defaults)?;
    print!("{}", defaults.render(format)?);
    Ok(())
}
