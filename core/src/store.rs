//! Recipe store
//!
//! Binds one directory and keeps every `<set>.<ext>` file in it mirrored as
//! an in-memory [`RecipeSet`]. The store is the only component that touches
//! the filesystem.
//!
//! Public operations never return errors: failures are logged and the
//! operation reports a plain success flag or best-effort result. Callers
//! inspect store state afterwards.
//!
//! The store is single-threaded. Mutating methods take `&mut self`; callers
//! sharing a store across threads must serialize access themselves.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use fxrecipe_types::{PlaybackHandle, Recipe};
use hashbrown::HashMap;

use crate::codec::{self, CodecError};
use crate::config::StoreConfig;
use crate::playback::{NullEngine, PlaybackEngine, release_recipe};
use crate::set::RecipeSet;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Extension of in-progress save files; never accepted as a set extension
const TEMP_EXTENSION: &str = "tmp";

/// Outcome of a directory scan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Files decoded (new or changed since last read)
    pub decoded: usize,
    /// Files skipped because their modification time was unchanged
    pub skipped: usize,
    /// Files that failed to read or decode
    pub failed: usize,
    /// Sets dropped because their file disappeared (reload only)
    pub evicted: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {path:?}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("invalid set name {0:?}")]
    InvalidSetName(String),

    #[error("no set named {0:?}")]
    UnknownSet(String),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Directory-bound manager of recipe sets
pub struct RecipeStore {
    config: StoreConfig,
    sets: Vec<RecipeSet>,
    /// Set name -> position in `sets`
    index: HashMap<String, usize>,
    engine: Box<dyn PlaybackEngine>,
}

impl std::fmt::Debug for RecipeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeStore")
            .field("directory", &self.config.directory)
            .field("sets", &self.sets.len())
            .finish()
    }
}

impl RecipeStore {
    /// Open a store on `directory` with default settings
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_config(StoreConfig::for_directory(directory))
    }

    pub fn with_config(mut config: StoreConfig) -> Self {
        if config.extension.eq_ignore_ascii_case(TEMP_EXTENSION) || config.extension.is_empty() {
            let fallback = StoreConfig::default().extension;
            tracing::warn!(
                extension = %config.extension,
                fallback = %fallback,
                "Unusable recipe file extension, using default"
            );
            config.extension = fallback;
        }
        if config.create_directory && !config.directory.exists() {
            if let Err(e) = fs::create_dir_all(&config.directory) {
                tracing::warn!(error = %e, path = ?config.directory, "Failed to create recipe directory");
            }
        }
        Self {
            config,
            sets: Vec::new(),
            index: HashMap::new(),
            engine: Box::new(NullEngine),
        }
    }

    /// Use `engine` for binding and releasing playback handles
    pub fn with_engine(mut self, engine: impl PlaybackEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Backing file of a set: `<directory>/<set>.<ext>`
    pub fn path_for(&self, set_name: &str) -> PathBuf {
        self.config
            .directory
            .join(format!("{}.{}", set_name, self.config.extension))
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    pub fn list_sets(&self) -> &[RecipeSet] {
        &self.sets
    }

    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|s| s.name())
    }

    pub fn get_set(&self, set_name: &str) -> Option<&RecipeSet> {
        self.index.get(set_name).map(|&i| &self.sets[i])
    }

    pub fn get(&self, set_name: &str, recipe_name: &str) -> Option<&Recipe> {
        self.get_set(set_name)?.get(recipe_name)
    }

    // ─── Mutation ───────────────────────────────────────────────────────────

    /// Add or replace a recipe in a set (created on demand), then save the set.
    ///
    /// A recipe that could not be read back once written (non-finite numbers,
    /// unencodable text) is refused and the set is left unchanged.
    ///
    /// Returns `true` if the set was written to disk.
    pub fn register(&mut self, set_name: &str, recipe: Recipe) -> bool {
        if !is_valid_set_name(set_name) {
            tracing::warn!(set = %set_name, "Refusing to register into invalid set name");
            return false;
        }
        if let Err(e) = codec::check_recipe(&recipe) {
            tracing::warn!(error = %e, set = %set_name, "Refusing to register recipe");
            return false;
        }

        let i = self.get_or_create(set_name);
        if let Some(mut old) = self.sets[i].upsert(recipe) {
            release_recipe(self.engine.as_mut(), &mut old);
        }
        self.save(set_name)
    }

    /// Remove one recipe; `update_file` saves the set afterwards.
    ///
    /// Returns `true` if the recipe existed.
    pub fn remove(&mut self, set_name: &str, recipe_name: &str, update_file: bool) -> bool {
        let Some(&i) = self.index.get(set_name) else {
            return false;
        };
        let Some(mut recipe) = self.sets[i].remove(recipe_name) else {
            return false;
        };
        release_recipe(self.engine.as_mut(), &mut recipe);

        if update_file {
            self.save(set_name);
        }
        true
    }

    /// Drop a set and all its recipes; `delete_file` also removes its file.
    ///
    /// Returns `true` if the set existed.
    pub fn remove_set(&mut self, set_name: &str, delete_file: bool) -> bool {
        let Some(i) = self.index.remove(set_name) else {
            return false;
        };
        let set = self.sets.remove(i);
        self.rebuild_index();
        self.destroy_set(set);

        if delete_file {
            let path = self.path_for(set_name);
            match fs::remove_file(&path) {
                Ok(()) => tracing::info!(path = ?path, "Deleted recipe set file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!(path = ?path, "Recipe set file already gone");
                }
                Err(e) => tracing::warn!(error = %e, path = ?path, "Failed to delete recipe set file"),
            }
        }
        true
    }

    /// Set a recipe's runtime selection flag (not persisted)
    pub fn set_selected(&mut self, set_name: &str, recipe_name: &str, selected: bool) -> bool {
        match self.recipe_mut(set_name, recipe_name) {
            Some(recipe) => {
                recipe.set_selected(selected);
                true
            }
            None => false,
        }
    }

    /// Bind a recipe through the playback engine, replacing any existing handle
    pub fn bind(&mut self, set_name: &str, recipe_name: &str) -> Option<PlaybackHandle> {
        let i = *self.index.get(set_name)?;
        let recipe = self.sets[i].get_mut(recipe_name)?;

        release_recipe(self.engine.as_mut(), recipe);
        let handle = self.engine.bind(recipe);
        recipe.set_handle(handle);
        handle
    }

    fn recipe_mut(&mut self, set_name: &str, recipe_name: &str) -> Option<&mut Recipe> {
        let i = *self.index.get(set_name)?;
        self.sets[i].get_mut(recipe_name)
    }

    fn get_or_create(&mut self, set_name: &str) -> usize {
        if let Some(&i) = self.index.get(set_name) {
            return i;
        }
        tracing::debug!(set = %set_name, "Creating recipe set");
        self.insert_set(RecipeSet::new(set_name))
    }

    /// Index a set, replacing (and destroying) any set of the same name
    fn insert_set(&mut self, set: RecipeSet) -> usize {
        match self.index.get(set.name()) {
            Some(&i) => {
                let old = std::mem::replace(&mut self.sets[i], set);
                self.destroy_set(old);
                i
            }
            None => {
                let i = self.sets.len();
                self.index.insert(set.name().to_string(), i);
                self.sets.push(set);
                i
            }
        }
    }

    fn destroy_set(&mut self, set: RecipeSet) {
        for mut recipe in set.into_recipes() {
            release_recipe(self.engine.as_mut(), &mut recipe);
        }
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, set) in self.sets.iter().enumerate() {
            self.index.insert(set.name().to_string(), i);
        }
    }

    // ─── Directory sync ─────────────────────────────────────────────────────

    /// Scan the directory and (re)decode every set whose file changed.
    ///
    /// Only files directly inside the directory with the configured
    /// extension are considered. A file that fails to decode is logged and
    /// skipped; an already-indexed set of that name is kept as-is.
    pub fn load(&mut self) -> LoadStats {
        let mut stats = LoadStats::default();

        let entries = match fs::read_dir(&self.config.directory) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, path = ?self.config.directory, "Failed to read recipe directory");
                return stats;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == self.config.extension.as_str())
            })
            .collect();
        files.sort();

        for path in files {
            let Some(set_name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
            else {
                tracing::warn!(path = ?path, "Skipping recipe file with non UTF-8 name");
                stats.failed += 1;
                continue;
            };

            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();

            if let Some(&i) = self.index.get(&set_name) {
                let set = &mut self.sets[i];
                if modified.is_some() && set.last_write == modified {
                    set.loaded = true;
                    stats.skipped += 1;
                    continue;
                }
            }

            match read_set(&path) {
                Ok(mut set) => {
                    set.set_name(set_name);
                    set.loaded = true;
                    set.last_write = modified;
                    tracing::debug!(set = %set.name(), recipes = set.len(), "Loaded recipe set");
                    self.insert_set(set);
                    stats.decoded += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping recipe file");
                    // The file is still there; keep whatever we had for it
                    if let Some(&i) = self.index.get(&set_name) {
                        self.sets[i].loaded = true;
                    }
                    stats.failed += 1;
                }
            }
        }

        tracing::info!(
            decoded = stats.decoded,
            skipped = stats.skipped,
            failed = stats.failed,
            "Scanned recipe directory"
        );
        stats
    }

    /// Load, then evict every set whose file is gone
    pub fn reload(&mut self) -> LoadStats {
        for set in &mut self.sets {
            set.loaded = false;
        }

        let mut stats = self.load();

        let (kept, gone): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.sets).into_iter().partition(|s| s.loaded);
        self.sets = kept;
        self.rebuild_index();

        stats.evicted = gone.len();
        for set in gone {
            tracing::info!(set = %set.name(), "Recipe set file removed, evicting");
            self.destroy_set(set);
        }
        stats
    }

    // ─── Persistence ────────────────────────────────────────────────────────

    /// Write a set to its file atomically. Returns `true` on success.
    pub fn save(&mut self, set_name: &str) -> bool {
        match self.try_save(set_name) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, set = %set_name, "Failed to save recipe set");
                false
            }
        }
    }

    /// Save every set; returns how many were written
    pub fn save_all(&mut self) -> usize {
        let names: Vec<String> = self.set_names().map(str::to_string).collect();
        names.iter().filter(|name| self.save(name)).count()
    }

    /// Fallible form of [`RecipeStore::save`]
    pub fn try_save(&mut self, set_name: &str) -> Result<(), StoreError> {
        let i = *self
            .index
            .get(set_name)
            .ok_or_else(|| StoreError::UnknownSet(set_name.to_string()))?;
        if !is_valid_set_name(set_name) {
            return Err(StoreError::InvalidSetName(set_name.to_string()));
        }

        let path = self.path_for(set_name);
        let pretty = self.config.pretty;
        let set = &self.sets[i];

        write_atomic(&self.config.directory, &path, |file| {
            let mut writer = BufWriter::new(file);
            codec::encode_to_writer(&mut writer, set, pretty).map_err(|source| {
                StoreError::Codec {
                    path: path.clone(),
                    source,
                }
            })?;
            writer.flush().map_err(io_error(&path))
        })?;

        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(io_error(&path))?;

        let set = &mut self.sets[i];
        set.last_write = Some(modified);
        set.loaded = true;
        tracing::debug!(set = %set_name, path = ?path, "Saved recipe set");
        Ok(())
    }
}

impl Drop for RecipeStore {
    fn drop(&mut self) {
        for set in std::mem::take(&mut self.sets) {
            self.destroy_set(set);
        }
    }
}

/// Set names become file names, so path syntax is not allowed
fn is_valid_set_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}

fn read_set(path: &Path) -> Result<RecipeSet, StoreError> {
    let file = File::open(path).map_err(io_error(path))?;
    codec::decode_reader(BufReader::new(file)).map_err(|source| StoreError::Codec {
        path: path.to_path_buf(),
        source,
    })
}

/// Fresh temp file name next to `target`; never carries the set extension
fn temp_path(dir: &Path, target: &Path) -> PathBuf {
    let stem = target
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(format!(
        ".{}.{}-{}-{}.{}",
        stem,
        std::process::id(),
        seq,
        nanos,
        TEMP_EXTENSION
    ))
}

/// Write `target` through a temp file in `dir`: write, delete old, rename.
///
/// On failure the temp file is removed and any previous `target` is left
/// untouched unless the failure happened after it was deleted.
fn write_atomic<F>(dir: &Path, target: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut File) -> Result<(), StoreError>,
{
    let tmp = temp_path(dir, target);

    let result = (|| {
        let mut file = File::create_new(&tmp).map_err(io_error(&tmp))?;
        write(&mut file)?;
        file.sync_all().map_err(io_error(&tmp))?;
        drop(file);

        match fs::remove_file(target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(target)(e)),
        }
        fs::rename(&tmp, target).map_err(io_error(target))
    })();

    if result.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            tracing::warn!(error = %e, path = ?tmp, "Failed to clean up temp file");
        }
    }
    result
}
