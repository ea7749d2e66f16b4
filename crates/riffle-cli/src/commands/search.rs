//! Search command - load a CSV and filter its rows.

use crate::app::App;
use crate::OutputFormat;
use riffle_core::Config;
use std::path::Path;
use std::time::Instant;

/// Run the search command.
pub fn run(
    config: Config,
    file: &Path,
    query: Option<String>,
    all: bool,
    limit: usize,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let app = App::new(config)?;
    let outcome = app.load_file(file)?;

    // --all maps to the valid empty query; an absent query stays absent and
    // surfaces the boundary error.
    let query = if all && query.is_none() {
        Some(String::new())
    } else {
        query
    };

    let limit = limit.min(app.config.general.max_results);

    let start = Instant::now();
    let results = app.service.search(query.as_deref())?;
    let elapsed = start.elapsed();

    match output {
        OutputFormat::Text => {
            println!("{}", results.fields.join(", "));

            for record in results.records.iter().take(limit) {
                if app.config.ui.show_row_numbers {
                    println!("{:>6}  {}", record.id, record.values.join(", "));
                } else {
                    println!("{}", record.values.join(", "));
                }
            }

            eprintln!();
            eprintln!(
                "Matched {} of {} records in {:.3}ms",
                results.len(),
                outcome.records,
                elapsed.as_secs_f64() * 1000.0
            );
        }
        OutputFormat::Json => {
            let json_results: Vec<serde_json::Value> = results
                .records
                .iter()
                .take(limit)
                .map(|record| {
                    let mut object = serde_json::Map::new();
                    object.insert("id".to_string(), serde_json::json!(record.id.as_u64()));
                    for (field, value) in results.entries(record) {
                        object.insert(field.to_string(), serde_json::json!(value));
                    }
                    serde_json::Value::Object(object)
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&json_results)?);
        }
    }

    Ok(())
}
