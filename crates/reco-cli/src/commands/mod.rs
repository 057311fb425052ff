pub mod check;
pub mod run;
pub mod tables;

use std::error::Error;
use std::fs;
use std::path::Path;

use reco_core::DomainTables;

/// Loads domain tables from YAML, or the standard tables when no path is given.
pub fn load_tables(path: Option<&Path>) -> Result<DomainTables, Box<dyn Error>> {
    let tables = match path {
        Some(path) => reco_core::serde::from_yaml_str::<DomainTables>(&fs::read_to_string(path)?)?,
        None => DomainTables::standard(),
    };
    tables.validate()?;
    Ok(tables)
}
