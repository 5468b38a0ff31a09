use std::path::{Component, Path, PathBuf};

/// Display helpers for paths that end up in diagnostics.
pub trait PathDisplayExt {
    /// Canonical form when the path exists, otherwise an absolute
    /// lexically normalized form.
    fn best_effort_display(&self) -> String;

    /// Components joined with `/`, so relative paths read the same on every
    /// platform.
    fn slash_display(&self) -> String;
}

impl PathDisplayExt for Path {
    fn best_effort_display(&self) -> String {
        if let Ok(canonical) = self.canonicalize() {
            return canonical.display().to_string();
        }

        let absolute = if self.is_absolute() {
            self.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(self))
                .unwrap_or_else(|_| self.to_path_buf())
        };
        normalize(&absolute).display().to_string()
    }

    fn slash_display(&self) -> String {
        self.components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy()),
                Component::CurDir => None,
                Component::ParentDir => Some("..".into()),
                Component::RootDir | Component::Prefix(_) => Some("".into()),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl PathDisplayExt for PathBuf {
    fn best_effort_display(&self) -> String {
        self.as_path().best_effort_display()
    }

    fn slash_display(&self) -> String {
        self.as_path().slash_display()
    }
}

/// Resolves `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            other => components.push(other),
        }
    }

    components.iter().collect()
}
