//! The `routes` command: print the full route table.

use color_eyre::Result;
use tabled::{Table, Tabled, settings::Style};

use mduri_core::params::TargetingMode;
use mduri_core::routes::registry;

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "route")]
    route: String,
    #[tabled(rename = "required")]
    required: String,
    #[tabled(rename = "targeting")]
    targeting: String,
}

pub fn run() -> Result<()> {
    let registry = registry()?;

    let rows: Vec<RouteRow> = registry
        .entries()
        .into_iter()
        .map(|(path, def)| RouteRow {
            route: if path.is_empty() { "(root)".to_string() } else { path.to_string() },
            required: def.schema.required_names().join(", "),
            targeting: match def.schema.targeting_mode() {
                TargetingMode::None => String::new(),
                TargetingMode::Soft => "soft".to_string(),
                TargetingMode::Strict => "strict".to_string(),
            },
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
