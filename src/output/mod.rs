//! Output formatting for CLI results

use crate::cli::OutputFormat;
use crate::controller::PinRow;
use crate::error::Result;

pub mod formatters;
pub mod json;
pub mod table;

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> Result<String>;
}

impl Formattable for [PinRow] {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(table::format_pins(self)),
            OutputFormat::Json => {
                let records: Vec<json::PinRecord> = self.iter().map(json::PinRecord::from).collect();
                Ok(json::format_json(&records)?)
            }
        }
    }
}

/// Format and print data to stdout
pub fn print<T: Formattable + ?Sized>(data: &T, format: OutputFormat) -> Result<()> {
    let output = data.format(format)?;
    println!("{}", output);
    Ok(())
}
