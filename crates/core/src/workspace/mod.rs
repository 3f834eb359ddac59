//! Filesystem-backed workspace over a Java source tree.
//!
//! Classes are indexed by walking `.java` files under the source root; the
//! qualified name is the relative directory path plus the file stem. The
//! index is a snapshot: structural edits mark it dirty, and `resync` rebuilds
//! it. Content edits are staged in memory and written out by `flush`, so a
//! batch's edits become durable together; file deletions happen immediately.

mod edits;

use crate::error::{Error, Result, TransformError};
use crate::interfaces::{ClassLookup, CodeModelService, Persistence};
use crate::pattern::NamePattern;
use crate::types::EntityRef;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct FsWorkspace {
    source_root: PathBuf,
    /// Qualified class name → source file, rebuilt on resync.
    index: BTreeMap<String, PathBuf>,
    /// Set after any structural edit; a miss against a dirty index is
    /// transient, the same miss against a fresh index is permanent.
    index_dirty: bool,
    pending_writes: BTreeMap<PathBuf, String>,
}

impl FsWorkspace {
    /// Opens the project at `root`. Sources are expected under
    /// `src/main/java` when present, otherwise directly under the root.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::WorkspaceError(format!(
                "Project path does not exist: {}",
                root.display()
            )));
        }

        let maven_root = root.join("src/main/java");
        let source_root = if maven_root.is_dir() {
            maven_root
        } else {
            root.to_path_buf()
        };

        let mut workspace = Self {
            source_root,
            index: BTreeMap::new(),
            index_dirty: false,
            pending_writes: BTreeMap::new(),
        };
        workspace.rebuild_index();
        Ok(workspace)
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    fn rebuild_index(&mut self) {
        self.index.clear();

        for entry in WalkDir::new(&self.source_root)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "java") {
                if let Some(qualified) = self.qualified_name_of(path) {
                    self.index.insert(qualified, path.to_path_buf());
                }
            }
        }

        // Staged files are part of the latest project state even before they
        // hit the disk.
        for path in self.pending_writes.keys() {
            if let Some(qualified) = self.qualified_name_of(path) {
                self.index.insert(qualified, path.clone());
            }
        }

        self.index_dirty = false;
        debug!(classes = self.index.len(), "class index rebuilt");
    }

    fn qualified_name_of(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.source_root).ok()?;
        let stem = relative.file_stem()?.to_str()?;

        let mut segments: Vec<&str> = relative
            .parent()
            .into_iter()
            .flat_map(|p| p.components())
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        segments.push(stem);
        Some(segments.join("."))
    }

    fn container_dir(&self, container: &str) -> PathBuf {
        let mut dir = self.source_root.clone();
        for segment in container.split('.').filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        dir
    }

    /// Reads a class source, preferring staged content over the disk.
    fn read_source(&self, path: &Path) -> Option<String> {
        if let Some(staged) = self.pending_writes.get(path) {
            return Some(staged.clone());
        }
        std::fs::read_to_string(path).ok()
    }

    /// Finds the source file of a class by qualified name, classifying a miss
    /// by index freshness.
    fn locate_class(&self, qualified_name: &str) -> std::result::Result<PathBuf, TransformError> {
        match self.index.get(qualified_name) {
            Some(path) => Ok(path.clone()),
            None if self.index_dirty => Err(TransformError::IndexNotReady(format!(
                "{qualified_name} not in index"
            ))),
            None => Err(TransformError::Failed(format!(
                "Class not found: {qualified_name}"
            ))),
        }
    }

    fn read_class(&self, path: &Path) -> std::result::Result<String, TransformError> {
        self.read_source(path).ok_or_else(|| {
            if self.index_dirty {
                TransformError::IndexNotReady(format!("{} not readable", path.display()))
            } else {
                TransformError::Failed(format!("Cannot read source: {}", path.display()))
            }
        })
    }

    fn stage_write(&mut self, path: PathBuf, content: String) {
        self.pending_writes.insert(path, content);
        self.index_dirty = true;
    }
}

impl ClassLookup for FsWorkspace {
    fn find(&self, pattern: &NamePattern) -> Result<Vec<EntityRef>> {
        let matches = if pattern.is_exact() {
            self.index
                .get(pattern.as_str())
                .map(|path| EntityRef::new(pattern.as_str(), path.display().to_string()))
                .into_iter()
                .collect()
        } else {
            self.index
                .iter()
                .filter(|(qualified, _)| pattern.matches(qualified))
                .map(|(qualified, path)| {
                    EntityRef::new(qualified.clone(), path.display().to_string())
                })
                .collect()
        };
        Ok(matches)
    }

    fn resync(&mut self) {
        self.rebuild_index();
    }
}

impl CodeModelService for FsWorkspace {
    fn move_class(
        &mut self,
        entity: &EntityRef,
        target_container: &str,
    ) -> std::result::Result<(), TransformError> {
        let source_path = PathBuf::from(&entity.key);
        let source = self.read_class(&source_path)?;

        let file_name = source_path
            .file_name()
            .ok_or_else(|| TransformError::Failed(format!("Not a file: {}", entity.key)))?
            .to_os_string();

        let target_dir = self.container_dir(target_container);
        let target_path = target_dir.join(&file_name);
        if target_path.exists() || self.pending_writes.contains_key(&target_path) {
            return Err(TransformError::Failed(format!(
                "Target already exists: {target_container}.{}",
                entity.simple_name()
            )));
        }

        let rewritten = edits::set_package(&source, target_container);

        std::fs::create_dir_all(&target_dir)
            .map_err(|e| TransformError::Failed(format!("Cannot create {target_container}: {e}")))?;
        if source_path.exists() {
            std::fs::remove_file(&source_path).map_err(|e| {
                TransformError::Failed(format!("Cannot remove {}: {e}", source_path.display()))
            })?;
        }
        self.pending_writes.remove(&source_path);
        self.stage_write(target_path, rewritten);
        Ok(())
    }

    fn extract_interface(
        &mut self,
        source_class: &str,
        interface_name: &str,
        methods: &[String],
    ) -> std::result::Result<(), TransformError> {
        let class_path = self.locate_class(source_class)?;
        let source = self.read_class(&class_path)?;

        let (signatures, missing) = edits::collect_method_signatures(&source, methods);
        if !missing.is_empty() {
            warn!(class = source_class, ?missing, "methods not found for extraction");
        }

        let interface_package = container_of(interface_name);
        let interface_simple = simple_of(interface_name);

        let interface_dir = self.container_dir(interface_package);
        let interface_path = interface_dir.join(format!("{interface_simple}.java"));
        if interface_path.exists() || self.pending_writes.contains_key(&interface_path) {
            return Err(TransformError::Failed(format!(
                "Interface already exists: {interface_name}"
            )));
        }

        let interface_source =
            edits::render_interface(interface_package, interface_simple, &signatures);

        let implementing = edits::add_implements(
            &source,
            simple_of(source_class),
            interface_name,
            interface_package != container_of(source_class),
        )
        .ok_or_else(|| {
            TransformError::Failed(format!("Class declaration not found in {source_class}"))
        })?;

        std::fs::create_dir_all(&interface_dir).map_err(|e| {
            TransformError::Failed(format!("Cannot create {interface_package}: {e}"))
        })?;
        self.stage_write(interface_path, interface_source);
        self.stage_write(class_path, implementing);
        Ok(())
    }

    fn replace_dependency(
        &mut self,
        in_class: &str,
        old_type: &str,
        new_type: &str,
    ) -> std::result::Result<usize, TransformError> {
        let class_path = self.locate_class(in_class)?;
        let source = self.read_class(&class_path)?;

        let (rewritten, count) = edits::replace_declared_type(
            &source,
            old_type,
            new_type,
            container_of(new_type) != container_of(in_class),
        );

        self.stage_write(class_path, rewritten);
        Ok(count)
    }

    fn delete_if_empty(&mut self, container: &str) -> std::result::Result<bool, TransformError> {
        let dir = self.container_dir(container);
        if !dir.is_dir() {
            return Ok(false);
        }

        let has_disk_entries = std::fs::read_dir(&dir)
            .map_err(|e| TransformError::Failed(format!("Cannot read {container}: {e}")))?
            .next()
            .is_some();
        let has_staged_entries = self
            .pending_writes
            .keys()
            .any(|path| path.starts_with(&dir));

        if has_disk_entries || has_staged_entries {
            return Ok(false);
        }

        std::fs::remove_dir(&dir)
            .map_err(|e| TransformError::Failed(format!("Cannot remove {container}: {e}")))?;
        self.index_dirty = true;
        Ok(true)
    }
}

impl Persistence for FsWorkspace {
    fn flush(&mut self) -> Result<()> {
        for (path, content) in std::mem::take(&mut self.pending_writes) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, content)?;
        }
        Ok(())
    }
}

fn container_of(qualified: &str) -> &str {
    match qualified.rfind('.') {
        Some(idx) => &qualified[..idx],
        None => "",
    }
}

fn simple_of(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}
