use anyhow::Result;
use modelpick_application::ModelSelectionService;
use modelpick_core::SizeClass;

pub async fn run(service: &ModelSelectionService, size_class: &SizeClass) -> Result<()> {
    let before = service.snapshot().recents(size_class).len();
    let kept = service.reconcile(size_class).await?;

    println!(
        "✅ {} recent models for '{}' ({} pruned)",
        kept.len(),
        size_class,
        before.saturating_sub(kept.len())
    );
    for entry in &kept {
        println!("  {}/{}", entry.provider, entry.model);
    }
    Ok(())
}
