//! Subcommand handlers
//!
//! Each handler prints to stdout and returns `Err` with a message for the
//! process exit status.

use fxrecipe_core::{AttachSlot, LoadStats, Recipe, RecipeSet, RecipeStore, StoreConfig};

/// Field changes requested by `add`; `None` leaves the field as it is
#[derive(Debug, Default)]
pub struct RecipeEdit {
    pub effect: String,
    pub scale: Option<f32>,
    pub speed: Option<f32>,
    pub repeat: Option<bool>,
    pub target: Option<String>,
    pub slot: Option<String>,
}

pub fn show_config(config: &StoreConfig) -> Result<(), String> {
    if let Some(path) = StoreConfig::default_path() {
        println!("# {}", path.display());
    }
    let text = config.to_toml_string().map_err(|e| e.to_string())?;
    print!("{text}");
    Ok(())
}

pub fn list_sets(store: &RecipeStore) -> Result<(), String> {
    if store.list_sets().is_empty() {
        println!("No recipe sets in {}", store.directory().display());
        return Ok(());
    }
    for set in store.list_sets() {
        println!("{:<32} {:>4} recipes", set.name(), set.len());
    }
    Ok(())
}

pub fn show_set(store: &RecipeStore, set_name: &str) -> Result<(), String> {
    let set = store
        .get_set(set_name)
        .ok_or_else(|| format!("No set named {set_name:?}"))?;
    print_set(set);
    Ok(())
}

fn print_set(set: &RecipeSet) {
    println!("=== {} ({} recipes) ===", set.name(), set.len());
    for recipe in set.iter() {
        print_recipe(recipe);
    }
}

fn print_recipe(recipe: &Recipe) {
    println!("--- {} ---", recipe.recipe_id().unwrap_or(recipe.name.as_str()));
    println!("  Effect: {}", recipe.effect_name);
    println!(
        "  Scale: {}  Speed: {}  Repeat: {}",
        recipe.scale, recipe.speed, recipe.repeat
    );
    println!(
        "  Frames: end {} / delay {} / post-delay {}",
        recipe.end_frame, recipe.delay_frame, recipe.post_delay_frame
    );
    if recipe.is_attached() {
        let slot = recipe
            .attach_slot
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  Attach: target {:?} slot {} bone {:?}",
            recipe.target_id, slot, recipe.attach_bone
        );
    }
    let l = recipe.location;
    println!("  Location: ({}, {}, {})", l.x, l.y, l.z);
    if !recipe.color.is_white() {
        let [r, g, b, a] = recipe.color.to_rgba8();
        println!("  Color: #{r:02x}{g:02x}{b:02x}{a:02x}");
    }
}

pub fn validate(store: &RecipeStore, stats: LoadStats) -> Result<(), String> {
    let recipes: usize = store.list_sets().iter().map(|s| s.len()).sum();
    println!(
        "{} sets ({} recipes) decoded, {} failed",
        stats.decoded, recipes, stats.failed
    );
    if stats.failed > 0 {
        return Err(format!("{} recipe file(s) failed to decode", stats.failed));
    }
    Ok(())
}

pub fn add_recipe(
    store: &mut RecipeStore,
    set_name: &str,
    name: &str,
    edit: RecipeEdit,
) -> Result<(), String> {
    // Start from the existing recipe so unspecified fields survive
    let mut recipe = store
        .get(set_name, name)
        .cloned()
        .unwrap_or_else(|| Recipe::new(name, ""));
    apply_edit(&mut recipe, edit)?;

    if !store.register(set_name, recipe) {
        return Err(format!("Failed to save set {set_name:?}"));
    }
    println!("Saved {set_name}:{name}");
    Ok(())
}

fn apply_edit(recipe: &mut Recipe, edit: RecipeEdit) -> Result<(), String> {
    if !edit.effect.is_empty() {
        recipe.effect_name = edit.effect;
    }
    if let Some(scale) = edit.scale {
        recipe.scale = scale;
    }
    if let Some(speed) = edit.speed {
        recipe.speed = speed;
    }
    if let Some(repeat) = edit.repeat {
        recipe.repeat = repeat;
    }
    if let Some(target) = edit.target {
        recipe.target_id = target;
        recipe.attach = true;
    }
    if let Some(slot) = edit.slot {
        let slot = AttachSlot::from_id(&slot).ok_or_else(|| {
            let known: Vec<_> = AttachSlot::ALL.iter().map(|s| s.id()).collect();
            format!("Unknown slot {slot:?} (expected one of: {})", known.join(", "))
        })?;
        recipe.attach_slot = Some(slot);
        recipe.attach = true;
    }
    Ok(())
}

pub fn remove(store: &mut RecipeStore, set_name: &str, name: Option<&str>) -> Result<(), String> {
    let removed = match name {
        Some(name) => store.remove(set_name, name, true),
        None => store.remove_set(set_name, true),
    };
    if !removed {
        return Err(format!("Nothing to remove in {set_name:?}"));
    }
    println!("Removed");
    Ok(())
}

pub fn reformat(store: &mut RecipeStore) -> Result<(), String> {
    let total = store.list_sets().len();
    let written = store.save_all();
    println!("Rewrote {written}/{total} sets");
    if written < total {
        return Err(format!("{} set(s) could not be written", total - written));
    }
    Ok(())
}
