use super::load_context;
use crate::output::Output;
use color_eyre::eyre::Context;
use color_eyre::Result;
use comfy_table::{presets::UTF8_FULL, Table};

pub async fn run_status(output: &Output) -> Result<()> {
    let context = load_context()?;
    let snapshot = context
        .cache
        .snapshot()
        .await
        .wrap_err("Failed to read the sync cache (run `trakt-sync clear` if it is corrupted)")?;

    if !output.is_human() {
        output.json(&serde_json::to_value(&snapshot)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Category", "File", "Records", "Watermark"]);
    for category in &snapshot.categories {
        let records = if category.present {
            category.records.to_string()
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            category.category.clone(),
            category.file.to_string(),
            records,
            category.watermark.clone().unwrap_or_else(|| "never".to_string()),
        ]);
    }

    output.info(format!("Cache directory: {}", context.paths.cache_dir().display()));
    output.table(&table);
    if let Some(all) = &snapshot.activities.all {
        output.info(format!("Last activity on Trakt at last refresh: {}", all));
    }
    Ok(())
}
