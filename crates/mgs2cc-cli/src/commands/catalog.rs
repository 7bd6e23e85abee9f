//! Effect listing.

use anyhow::Result;
use mgs2cc_core::CATALOG;
use owo_colors::OwoColorize;

pub fn run(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(CATALOG)?);
        return Ok(());
    }

    println!(
        "{:<18} {:<22} {:<14} {:>5}  {}",
        "CODE".bold(),
        "NAME".bold(),
        "CATEGORY".bold(),
        "PRICE".bold(),
        "DEFAULT".bold()
    );
    for def in CATALOG {
        let default = match (def.duration_secs, def.quantity) {
            (Some(secs), _) => format!("{secs}s"),
            (None, Some(quantity)) => format!("x{quantity}"),
            (None, None) => String::new(),
        };
        println!(
            "{:<18} {:<22} {:<14} {:>5}  {}",
            def.code.cyan(),
            def.name,
            def.category,
            def.price,
            default.dimmed()
        );
    }
    Ok(())
}
