use crate::error::GenError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const TRAIN_DIR: &str = "train_data";
pub const TEST_DIR: &str = "test_data";

/// Create the class directory tree and return its roots.
///
/// Layout is `<output_root>/[train_data|test_data/]<dir_name>/<code_point>/`,
/// one code-point directory per charset character. With `split` the tree is
/// duplicated under the train and test parents and both roots are returned
/// (train first); otherwise a single root.
///
/// A missing `output_root` is only created when `allow_create_root` is set. A
/// `dir_name` directory that already exists non-empty fails with
/// target-exists instead of merging into a previous run; re-creating an
/// individual code-point directory is fine.
pub fn build_layout(
    charset: &[char],
    output_root: &Path,
    dir_name: &str,
    split: bool,
    allow_create_root: bool,
) -> Result<Vec<PathBuf>> {
    if charset.is_empty() {
        return Err(GenError::MissingPrerequisite("charset").into());
    }

    if !output_root.is_dir() {
        if !allow_create_root {
            return Err(GenError::RootMissing(output_root.to_path_buf()).into());
        }
        std::fs::create_dir_all(output_root)
            .with_context(|| format!("failed to create output root {}", output_root.display()))?;
    }

    let parents: Vec<PathBuf> = if split {
        vec![output_root.join(TRAIN_DIR), output_root.join(TEST_DIR)]
    } else {
        vec![output_root.to_path_buf()]
    };

    let mut roots = Vec::with_capacity(parents.len());
    for parent in parents {
        let class_root = parent.join(dir_name);
        if class_root.is_dir() {
            let mut entries = class_root
                .read_dir()
                .with_context(|| format!("failed to read {}", class_root.display()))?;
            if entries.next().is_some() {
                return Err(GenError::TargetExists(class_root).into());
            }
        }

        std::fs::create_dir_all(&class_root)
            .with_context(|| format!("failed to create {}", class_root.display()))?;

        for &ch in charset {
            let class_dir = class_root.join((ch as u32).to_string());
            match std::fs::create_dir(&class_dir) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to create {}", class_dir.display()));
                }
            }
        }

        roots.push(class_root);
    }

    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    const CHARSET: [char; 3] = ['A', 'a', '0'];

    #[test]
    fn split_builds_two_parallel_trees() {
        let root = assert_fs::TempDir::new().unwrap();

        let roots = build_layout(&CHARSET, root.path(), "charset", true, false).unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0], root.path().join("train_data/charset"));
        assert_eq!(roots[1], root.path().join("test_data/charset"));

        for parent in ["train_data", "test_data"] {
            for code_point in ["65", "97", "48"] {
                root.child(parent)
                    .child("charset")
                    .child(code_point)
                    .assert(predicate::path::is_dir());
            }
        }
    }

    #[test]
    fn unsplit_builds_a_single_tree() {
        let root = assert_fs::TempDir::new().unwrap();

        let roots = build_layout(&CHARSET, root.path(), "charset", false, false).unwrap();
        assert_eq!(roots, vec![root.path().join("charset")]);
        root.child("charset/65").assert(predicate::path::is_dir());
    }

    #[test]
    fn both_roots_have_identical_class_sets() {
        let root = assert_fs::TempDir::new().unwrap();
        let roots = build_layout(&CHARSET, root.path(), "charset", true, false).unwrap();

        let mut sets = roots.iter().map(|r| {
            let mut names: Vec<String> = r
                .read_dir()
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        });
        assert_eq!(sets.next(), sets.next());
    }

    #[test]
    fn second_run_on_same_root_is_target_exists() {
        let root = assert_fs::TempDir::new().unwrap();
        build_layout(&CHARSET, root.path(), "charset", true, false).unwrap();

        let err = build_layout(&CHARSET, root.path(), "charset", true, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenError>(),
            Some(GenError::TargetExists(_))
        ));
    }

    #[test]
    fn missing_root_requires_permission() {
        let root = assert_fs::TempDir::new().unwrap();
        let nested = root.path().join("does/not/exist");

        let err = build_layout(&CHARSET, &nested, "charset", false, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenError>(),
            Some(GenError::RootMissing(_))
        ));

        // With permission the nested root is created.
        let roots = build_layout(&CHARSET, &nested, "charset", false, true).unwrap();
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn empty_charset_fails_before_any_io() {
        let root = assert_fs::TempDir::new().unwrap();
        let nested = root.path().join("untouched");

        let err = build_layout(&[], &nested, "charset", true, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenError>(),
            Some(GenError::MissingPrerequisite("charset"))
        ));
        assert!(!nested.exists());
    }
}
