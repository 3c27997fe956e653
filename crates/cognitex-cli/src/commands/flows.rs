//! The `cognitex flows` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use cognitex_core::model::Locale;
use cognitex_providers::config::load_config_from;

pub fn execute(locale: Option<Locale>, show_templates: bool, config: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let locale = locale.unwrap_or(config.locale);
    let catalog = config.flow_catalog(locale);

    let mut table = Table::new();
    table.set_header(vec!["Flow", "Input", "Output", "Placeholders"]);
    for (_, contract) in catalog.iter() {
        table.add_row(vec![
            Cell::new(contract.name()),
            Cell::new(contract.input_schema().field_names().join(", ")),
            Cell::new(contract.output_schema().field_names().join(", ")),
            Cell::new(contract.template().placeholders().join(", ")),
        ]);
    }
    println!("Flows ({locale})");
    println!("{table}");

    for (_, contract) in catalog.iter() {
        let unbound = contract.unbound_placeholders();
        if !unbound.is_empty() {
            println!(
                "WARNING: {} template references unknown input(s): {}",
                contract.name(),
                unbound.join(", ")
            );
        }
    }

    if show_templates {
        for (kind, contract) in catalog.iter() {
            println!("\n--- {kind} ---");
            println!("{}", contract.template().as_str());
        }
    }

    Ok(())
}
