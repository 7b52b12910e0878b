use analyzer::AppContext;
use anyhow::Result;
use colored::*;

pub async fn status(ctx: &AppContext) -> Result<()> {
    let config = &ctx.config;

    println!("{}", "Documentation Assistant".bold());
    match config.llm.masked_api_key() {
        Some(masked) => println!("{} API Connected: {}", "✓".green(), masked),
        None => println!(
            "{} API Not Connected (set OPENROUTER_API_KEY)",
            "✗".red()
        ),
    }

    println!("  {}: {}", "Model".cyan(), config.llm.model);
    println!("  {}: {}", "Endpoint".cyan(), config.llm.endpoint);
    println!(
        "  {}: {}",
        "Sessions DB".cyan(),
        ctx.store.sessions_path().display()
    );
    println!(
        "  {}: {}",
        "Content store".cyan(),
        ctx.store.content_path().display()
    );
    println!(
        "  {}: {} ({} URL buckets)",
        "Stored sessions".cyan(),
        ctx.store.session_count().await?,
        ctx.store.content_bucket_count()
    );
    println!(
        "  {}: {}",
        "Concurrent critiques".cyan(),
        config.analysis.concurrent_critiques
    );

    Ok(())
}
