use anyhow::Result;
use modelpick_application::ModelSelectionService;
use modelpick_core::SizeClass;

pub async fn run(
    service: &ModelSelectionService,
    size_class: &SizeClass,
    provider: &str,
    model: &str,
) -> Result<()> {
    let recents = service.select_model(size_class, provider, model).await?;

    println!("✅ Selected {}/{} for '{}'", provider, model, size_class);
    println!("Recently used:");
    for entry in &recents {
        println!("  {}/{}", entry.provider, entry.model);
    }
    Ok(())
}
