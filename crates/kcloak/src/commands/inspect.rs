use super::config_from_matches;
use anyhow::{Context, Result};
use arrow::csv::reader::infer_file_schema;
use clap::ArgMatches;
use mondrian_anonymization::{
    conversion::SCHEMA_INFERENCE_ROWS, ColumnConfiguration, Hierarchy, NodeId,
};
use std::{collections::HashMap, fs::File, sync::Arc};
use tracing::warn;

fn print_tree(hierarchy: &Hierarchy, node: NodeId, indent: usize) {
    println!("{:indent$}{}", "", hierarchy.label(node), indent = indent);
    for child in hierarchy.children(node) {
        print_tree(hierarchy, *child, indent + 2);
    }
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = config_from_matches(matches)?;
    let hierarchies: HashMap<String, Arc<Hierarchy>> = config.build_hierarchies()?;

    // Surfaces hierarchy errors before printing anything.
    config.quasi_identifiers()?;

    println!("k = {}", config.k);
    if let Some(id_column) = &config.id_column {
        println!("id column: {}", id_column);
    }

    println!("columns:");
    for column in &config.columns {
        let role = match column {
            ColumnConfiguration::Identifier { .. } => "identifier (suppressed)".to_string(),
            ColumnConfiguration::Numerical { .. } => "numerical quasi-identifier".to_string(),
            ColumnConfiguration::Categorical { hierarchy, .. } => {
                format!("categorical quasi-identifier ({})", hierarchy)
            }
            ColumnConfiguration::Sensitive { .. } => "sensitive".to_string(),
        };
        println!("  {}: {}", column.name(), role);
    }

    for hierarchy_config in &config.hierarchies {
        if let Some(hierarchy) = hierarchies.get(&hierarchy_config.name) {
            println!(
                "hierarchy {} (height {}):",
                hierarchy.name(),
                hierarchy.height(hierarchy.root())
            );
            print_tree(hierarchy, hierarchy.root(), 2);
        }
    }

    if let Some(input) = matches.value_of("input") {
        let mut file = File::open(input).with_context(|| format!("Failed to open {}", input))?;
        let (schema, _) = infer_file_schema(&mut file, b',', Some(SCHEMA_INFERENCE_ROWS), true)?;

        let mut missing = 0;
        for column in &config.columns {
            if schema.index_of(column.name()).is_err() {
                warn!("Column {} is not present in {}", column.name(), input);
                missing += 1;
            }
        }

        if missing > 0 {
            anyhow::bail!("{} declared column(s) missing from {}", missing, input);
        }
        println!("all declared columns are present in {}", input);
    }

    Ok(())
}
