//! Appending rendered fragments to shared generated files.

use std::path::{Path, PathBuf};

use log::{debug, info};

use jig_parser::{FilenameTemplate, Pragma, pragma::NAME_MARKER};

use super::{Package, ParsedFile};
use crate::{error::JigError, imports::ImportFixer};

impl Package {
    /// Append a rendered fragment to the file chosen by `filename`.
    ///
    /// The destination starts from its current content, or from the
    /// generated-file header when the package has no file at that path. The
    /// marker `//jig:name <fragment>` and the rendered text are appended,
    /// the whole buffer goes through `fixer`, and the result is lexed again.
    ///
    /// When the store already places `fragment` somewhere, its old section
    /// is cut from that file in the same step, so a fragment never appears
    /// twice.
    ///
    /// Nothing is changed unless every affected buffer was fixed and lexed
    /// successfully.
    ///
    /// # Errors
    ///
    /// Propagates the first [`JigError::Fix`] or [`JigError::Parse`].
    pub fn merge(
        &mut self,
        filename: &FilenameTemplate,
        fragment: &str,
        rendered: &str,
        fixer: &dyn ImportFixer,
    ) -> Result<PathBuf, JigError> {
        let dest = self.dir.join(filename.render(&self.name, fragment));
        let mut staged = Vec::new();
        let mut base = None;

        if let Some(old_path) = self.store.get(fragment).map(Path::to_path_buf) {
            let cut = self
                .files
                .get(&old_path)
                .and_then(|file| cut_fragment(file, fragment));
            if let Some(cut) = cut {
                debug!(fragment = fragment, path = old_path.display().to_string(); "Cutting previous fragment");
                if old_path == dest {
                    base = Some(cut);
                } else {
                    staged.push(self.finish(old_path, &cut, fixer)?);
                }
            }
        }

        let base = match base {
            Some(base) => base,
            None => match self.files.get(&dest) {
                Some(file) => file.text().to_string(),
                None => self.header(),
            },
        };

        let buffer = append(&base, fragment, rendered);
        staged.push(self.finish(dest.clone(), &buffer, fixer)?);

        for file in staged {
            self.files.replace(file);
        }
        self.store.record(fragment, &dest);

        info!(fragment = fragment, path = dest.display().to_string(); "Merged fragment");
        Ok(dest)
    }

    fn finish(&self, path: PathBuf, buffer: &str, fixer: &dyn ImportFixer) -> Result<ParsedFile, JigError> {
        let fixed = fixer.fix(buffer)?;
        ParsedFile::parse(path, fixed)
    }
}

fn append(base: &str, fragment: &str, rendered: &str) -> String {
    let mut buffer = base.trim_end().to_string();
    buffer.push_str("\n\n");
    buffer.push_str(NAME_MARKER);
    buffer.push(' ');
    buffer.push_str(fragment);
    buffer.push('\n');
    buffer.push_str(rendered.trim_start_matches('\n').trim_end());
    buffer.push('\n');
    buffer
}

/// The file text without the section of `fragment`: from its marker line
/// up to the next marker line or the end of the file.
fn cut_fragment(file: &ParsedFile, fragment: &str) -> Option<String> {
    let source = file.source();
    let markers: Vec<(usize, bool)> = source
        .pragmas()
        .filter_map(|comment| match comment.pragma {
            Ok(Pragma::Name(name)) => {
                Some((source.line_start(comment.span.start()), name.as_str() == fragment))
            }
            _ => None,
        })
        .collect();

    let position = markers.iter().position(|&(_, is_target)| is_target)?;
    let start = markers[position].0;
    let end = markers
        .get(position + 1)
        .map_or(source.text().len(), |&(offset, _)| offset);

    let text = source.text();
    Some(format!("{}{}", &text[..start], &text[end..]))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        config::GenerateConfig,
        imports::{Canonicalizer, FixError},
        package::BANNER,
    };

    use super::*;

    struct Rejecting;

    impl ImportFixer for Rejecting {
        fn fix(&self, _source: &str) -> Result<String, FixError> {
            Err(FixError::Rejected("syntax error".to_string()))
        }
    }

    fn package(files: &[(&str, &str)]) -> (tempfile::TempDir, Package) {
        let dir = tempfile::tempdir().unwrap();
        for (name, text) in files {
            fs::write(dir.path().join(name), text).unwrap();
        }
        let mut pkg = Package::open(dir.path(), &GenerateConfig::default()).unwrap();
        pkg.scan();
        (dir, pkg)
    }

    fn template(text: &str) -> FilenameTemplate {
        FilenameTemplate::parse(text).unwrap()
    }

    #[test]
    fn test_merge_into_new_file() {
        let (dir, mut pkg) = package(&[("main.go", "package shapes\n")]);

        let path = pkg
            .merge(&template("{package}_jig.go"), "StackInt", "type StackInt []int\n", &Canonicalizer)
            .unwrap();

        assert_eq!(path, dir.path().join("shapes_jig.go"));
        let text = pkg.files().get(&path).unwrap().text();
        assert_eq!(
            text,
            format!(
                "{BANNER}\n\n//go:generate jig --regen\n\npackage shapes\n\n//jig:name StackInt\ntype StackInt []int\n"
            )
        );
        assert_eq!(pkg.store().get("StackInt"), Some(path.as_path()));
        assert!(!path.exists());
    }

    #[test]
    fn test_merge_appends_to_shared_file() {
        let (_dir, mut pkg) = package(&[("main.go", "package shapes\n")]);
        let filename = template("{package}_jig.go");

        let first = pkg
            .merge(&filename, "StackInt", "type StackInt []int", &Canonicalizer)
            .unwrap();
        let second = pkg
            .merge(&filename, "QueueInt", "type QueueInt []int", &Canonicalizer)
            .unwrap();

        assert_eq!(first, second);
        let text = pkg.files().get(&first).unwrap().text();
        assert!(text.ends_with(
            "//jig:name StackInt\ntype StackInt []int\n\n//jig:name QueueInt\ntype QueueInt []int\n"
        ));
    }

    #[test]
    fn test_merge_per_fragment_file() {
        let (dir, mut pkg) = package(&[("main.go", "package shapes\n")]);
        let path = pkg
            .merge(&template("{name}.go"), "StackInt", "type StackInt []int", &Canonicalizer)
            .unwrap();
        assert_eq!(path, dir.path().join("stackint.go"));
    }

    #[test]
    fn test_merge_replaces_existing_section() {
        let existing = format!(
            "{BANNER}\n\npackage p\n\n//jig:name StackInt\ntype StackInt []string\n\n//jig:name QueueInt\ntype QueueInt []int\n"
        );
        let (dir, mut pkg) = package(&[("p_jig.go", existing.as_str())]);

        pkg.merge(&template("{package}_jig.go"), "StackInt", "type StackInt []int", &Canonicalizer)
            .unwrap();

        let text = pkg.files().get(&dir.path().join("p_jig.go")).unwrap().text();
        assert_eq!(text.matches("//jig:name StackInt").count(), 1);
        assert!(!text.contains("[]string"));
        assert!(text.ends_with("//jig:name QueueInt\ntype QueueInt []int\n\n//jig:name StackInt\ntype StackInt []int\n"));
    }

    #[test]
    fn test_merge_moves_fragment_between_files() {
        let existing = format!("{BANNER}\n\npackage p\n\n//jig:name StackInt\ntype StackInt []int\n");
        let (dir, mut pkg) = package(&[("old_jig.go", existing.as_str())]);

        pkg.merge(&template("{package}_jig.go"), "StackInt", "type StackInt []int", &Canonicalizer)
            .unwrap();

        let old = pkg.files().get(&dir.path().join("old_jig.go")).unwrap().text();
        assert!(!old.contains("StackInt"));
        assert_eq!(pkg.store().get("StackInt"), Some(dir.path().join("p_jig.go").as_path()));
    }

    #[test]
    fn test_failed_fix_leaves_package_untouched() {
        let (dir, mut pkg) = package(&[("main.go", "package p\n")]);

        let err = pkg
            .merge(&template("{package}_jig.go"), "StackInt", "type StackInt []int", &Rejecting)
            .unwrap_err();

        assert!(matches!(err, JigError::Fix(_)));
        assert!(!pkg.files().contains(&dir.path().join("p_jig.go")));
        assert!(!pkg.store().contains("StackInt"));
        assert!(!pkg.files().has_changes());
    }

    #[test]
    fn test_unlexable_result_is_rejected() {
        let (_dir, mut pkg) = package(&[("main.go", "package p\n")]);

        let err = pkg
            .merge(&template("{package}_jig.go"), "Broken", "var s = \"open", &Canonicalizer)
            .unwrap_err();

        assert!(matches!(err, JigError::Parse { .. }));
        assert!(!pkg.store().contains("Broken"));
    }
}
