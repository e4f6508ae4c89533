use cartsim_core::{MenuCatalog, TemplateBook};

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let catalog = MenuCatalog::standard();
    let templates = TemplateBook::standard().templates().count();
    let stats = catalog.stats();
    CommandResult::success(
        "catalog",
        format!("{} items ({} veg), {templates} meal templates", stats.items, stats.veg_items),
    )
    .with_report(&stats)
}
