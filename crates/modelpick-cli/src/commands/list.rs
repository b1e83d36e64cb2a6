use anyhow::Result;
use modelpick_application::ModelSelectionService;
use modelpick_core::{ModelList, SizeClass};

pub async fn run(service: &ModelSelectionService, size_class: &SizeClass) -> Result<()> {
    if let Some(e) = service.derived_error() {
        eprintln!("⚠️  Saved recent models were ignored: {}", e);
    }
    let prepared = service.open(size_class).await;
    if let Err(e) = &prepared.persisted {
        eprintln!("⚠️  Recent models were not saved: {}", e);
    }

    print_list(&prepared.list);
    Ok(())
}

pub fn print_list(list: &ModelList) {
    if list.is_empty() {
        println!("No models available.");
        return;
    }

    for group in &list.groups {
        println!("{}", group.label);
        for item in &group.items {
            let marker = if !item.is_recent() && list.selected.as_deref() == Some(item.id.as_str())
            {
                "*"
            } else {
                " "
            };
            let model = &item.option.model;
            let name = if model.display_name.is_empty() {
                &model.id
            } else {
                &model.display_name
            };
            println!("  {} {:<40} {}", marker, name, item.id);
        }
        println!();
    }
}
