use super::load_context;
use crate::output::Output;
use color_eyre::eyre::Context;
use color_eyre::Result;

pub async fn run_clear(output: &Output) -> Result<()> {
    let context = load_context()?;
    let removed = context
        .cache
        .clear()
        .await
        .wrap_err("Failed to clear the sync cache")?;

    if removed == 0 {
        output.info("No sync cache found to clear");
    } else {
        output.success(format!(
            "Cleared {} cache files from {}",
            removed,
            context.paths.cache_dir().display()
        ));
    }
    Ok(())
}
