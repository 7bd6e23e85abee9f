//! Chain resolution against the live target, for checking address tables.

use std::sync::Arc;

use anyhow::{Context, Result};
use mgs2cc_core::{Accessor, AddressChain, Config, ProcessHandle};
use owo_colors::OwoColorize;

const PREVIEW_LEN: usize = 16;

pub fn run(config: &Config, expr: &str) -> Result<()> {
    let chain = AddressChain::parse_with_width(expr, config.process.pointer_width)?;
    let process = ProcessHandle::find_and_open(&config.process.executable)
        .with_context(|| format!("{} is not running", config.process.executable))?;
    let memory = Accessor::new(Arc::new(process));

    let address = memory.resolve(&chain)?;
    println!("{} => {}", chain, format!("{address:#x}").green());

    match memory.read_array::<u8>(&chain, PREVIEW_LEN) {
        Ok(bytes) => {
            let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
            println!("{}", hex.join(" ").dimmed());
            if let (Ok(i16_value), Ok(i32_value)) =
                (memory.read::<i16>(&chain), memory.read::<i32>(&chain))
            {
                println!("i16 {}  i32 {}", i16_value, i32_value);
            }
        }
        Err(e) => println!("{}", e.red()),
    }
    Ok(())
}
