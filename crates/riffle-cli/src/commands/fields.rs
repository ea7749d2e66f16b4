//! Fields command - show header fields and record set statistics.

use crate::app::App;
use riffle_core::Config;
use std::path::Path;

/// Run the fields command.
pub fn run(config: Config, file: &Path) -> anyhow::Result<()> {
    let app = App::new(config)?;
    app.load_file(file)?;

    let set = app.store.current();
    let stats = &set.stats;

    println!("Riffle Record Set");
    println!("=================");
    println!();
    println!("File:    {}", file.display());
    println!("Records: {}", stats.record_count);
    println!("Fields:  {}", stats.field_count);

    if let Some(loaded) = stats.loaded_at {
        println!("Loaded:  {}", loaded.format("%Y-%m-%d %H:%M:%S"));
    }

    println!();
    println!("Header fields:");

    for (i, field) in set.fields.iter().enumerate() {
        println!("  {:>3}  {}", i, field);
    }

    Ok(())
}
