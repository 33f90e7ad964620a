//! End-to-end runs of the synthesis loop against scratch packages.
//!
//! The typechecker is replaced by a resolver that reports every exported
//! identifier the package uses but does not declare, which is enough to
//! drive generation the way `go vet` would.

use std::{collections::HashSet, fs, path::PathBuf};

use tempfile::{TempDir, tempdir};

use jig::{
    Jig, JigError, Mode, Package, State,
    checker::{CheckError, TypeChecker},
    config::{AppConfig, CheckConfig, GenerateConfig, ImportsConfig},
    diagnostic::{Diagnostic, Location},
    imports::{Canonicalizer, FixError, ImportFixer},
};

const LIBRARY: &str = r#"package generic

//jigs: Stack(T)

// StackT is a LIFO stack of T values.
type StackT []T

// NewStackT returns an empty StackT.
func NewStackT() *StackT { return &StackT{} }

// Push adds v on top of the stack.
func (s *StackT) Push(v T) { *s = append(*s, v) }

//jigs: Pair(A, B)

type PairAB struct {
	first  A
	second B
}
"#;

const BANNER: &str = "// Code generated by jig; DO NOT EDIT.";

/// Reports `undefined: X` for exported identifiers that no file declares.
/// Selector names such as `s.Push` are skipped.
#[derive(Default)]
struct Resolver {
    calls: usize,
}

impl TypeChecker for Resolver {
    fn check(&mut self, pkg: &Package) -> Result<Vec<Diagnostic>, CheckError> {
        self.calls += 1;
        let declared: HashSet<String> = pkg
            .files()
            .iter()
            .flat_map(|file| file.source().declarations())
            .map(|decl| decl.name().to_string())
            .collect();

        let mut reported = HashSet::new();
        let mut diagnostics = Vec::new();
        for file in pkg.files().iter() {
            let source = file.source();
            for ident in source.identifiers() {
                let start = ident.span().start();
                let exported = ident.chars().next().is_some_and(char::is_uppercase);
                if !exported
                    || declared.contains(*ident.inner())
                    || source.text()[..start].ends_with('.')
                    || !reported.insert(ident.inner().to_string())
                {
                    continue;
                }
                let (line, column) = source.line_col(start);
                diagnostics.push(Diagnostic::new(
                    Location::new(file.path(), line, Some(column)),
                    format!("undefined: {}", ident.inner()),
                ));
            }
        }
        Ok(diagnostics)
    }
}

/// Fails every buffer it is given.
struct Rejecting;

impl ImportFixer for Rejecting {
    fn fix(&self, _source: &str) -> Result<String, FixError> {
        Err(FixError::Rejected("expected declaration".to_string()))
    }
}

struct Workspace {
    _root: TempDir,
    pkg: PathBuf,
    lib: PathBuf,
}

impl Workspace {
    fn new(files: &[(&str, &str)]) -> Self {
        let root = tempdir().expect("Failed to create temp directory");
        let pkg = root.path().join("shapes");
        let lib = root.path().join("generic");
        fs::create_dir(&pkg).unwrap();
        fs::create_dir(&lib).unwrap();
        fs::write(lib.join("generic.go"), LIBRARY).unwrap();
        for (name, text) in files {
            fs::write(pkg.join(name), text).unwrap();
        }
        Self {
            _root: root,
            pkg,
            lib,
        }
    }

    fn jig(&self, nodoc: bool) -> Jig {
        let generate = GenerateConfig::default()
            .with_library(vec![self.lib.clone()])
            .with_nodoc(nodoc);
        Jig::new(AppConfig::new(
            generate,
            CheckConfig::default(),
            ImportsConfig::new(Vec::new()),
        ))
    }

    fn run(&self, mode: Mode) -> jig::Report {
        self.jig(false)
            .run_with(&self.pkg, mode, &mut Resolver::default(), &Canonicalizer)
            .expect("jig run failed")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.pkg.join(name)
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }
}

fn fragment_count(text: &str, name: &str) -> usize {
    text.lines()
        .filter(|line| *line == format!("//jig:name {name}"))
        .count()
}

fn generated_file(package: &str, fragments: &[(&str, &str)]) -> String {
    let mut text = format!("{BANNER}\n\n//go:generate jig --regen\n\npackage {package}\n");
    for (name, body) in fragments {
        text.push_str(&format!("\n//jig:name {name}\n{body}\n"));
    }
    text
}

const USES_STACK_INT: &str = "package shapes\n\nfunc run() {\n\ts := NewStackInt()\n\ts.Push(1)\n}\n";

#[test]
fn test_direct_resolution() {
    let ws = Workspace::new(&[("main.go", USES_STACK_INT)]);

    let report = ws.run(Mode::Regenerate);
    assert!(report.is_success(), "unexpected report: {report:?}");
    assert_eq!(report.state(), State::Converged);

    let text = ws.read("shapes_jig.go");
    assert!(text.starts_with(
        "// Code generated by jig; DO NOT EDIT.\n\n//go:generate jig --regen\n\npackage shapes\n\n//jig:name StackInt\n"
    ));
    assert!(text.contains("// StackInt is a LIFO stack of int values.\ntype StackInt []int\n"));
    assert!(text.contains("func (s *StackInt) Push(v int) { *s = append(*s, v) }\n"));
    assert_eq!(fragment_count(&text, "StackInt"), 1);
}

#[test]
fn test_idempotent_runs() {
    let ws = Workspace::new(&[("main.go", USES_STACK_INT)]);

    ws.run(Mode::Regenerate);
    let first = ws.read("shapes_jig.go");

    let report = ws.run(Mode::Missing);
    assert!(report.is_success());
    assert!(report.messages().is_empty(), "second run changed files: {:?}", report.messages());
    assert_eq!(ws.read("shapes_jig.go"), first);

    ws.run(Mode::Regenerate);
    assert_eq!(ws.read("shapes_jig.go"), first);
}

#[test]
fn test_transitive_closure() {
    let ws = Workspace::new(&[(
        "main.go",
        "package shapes\n\nfunc run() {\n\tvar pairs StackPairStringInt\n\t_ = pairs\n}\n",
    )]);

    let report = ws.run(Mode::Regenerate);
    assert!(report.is_success(), "unexpected report: {report:?}");
    assert_eq!(report.iterations(), 3);

    let text = ws.read("shapes_jig.go");
    assert!(text.contains("type StackPairStringInt []PairStringInt\n"));
    assert!(text.contains("type PairStringInt struct {\n\tfirst  string\n\tsecond int\n}\n"));
}

#[test]
fn test_user_types_as_arguments() {
    let ws = Workspace::new(&[(
        "main.go",
        "package shapes\n\ntype Point struct{ x, y int }\n\nvar path StackPoint\n",
    )]);

    assert!(ws.run(Mode::Regenerate).is_success());
    assert!(ws.read("shapes_jig.go").contains("type StackPoint []Point\n"));
}

#[test]
fn test_unknown_template_stalls_with_diagnostic() {
    let ws = Workspace::new(&[("main.go", "package shapes\n\nvar cache FooBar\n")]);

    let report = ws.run(Mode::Regenerate);
    assert_eq!(report.state(), State::Stalled);
    assert!(!report.is_success());

    let messages: Vec<String> = report.unresolved().iter().map(|d| d.message().to_string()).collect();
    assert_eq!(messages, ["undefined: FooBar"]);
    assert_eq!(
        report.unresolved()[0].location().path(),
        &ws.path("main.go")
    );
    assert!(!ws.path("shapes_jig.go").exists());
}

#[test]
fn test_failed_merge_leaves_disk_untouched() {
    let stale = generated_file("shapes", &[("StackInt", "type StackInt []int")]);
    let ws = Workspace::new(&[("main.go", USES_STACK_INT), ("shapes_jig.go", &stale)]);

    let err = ws
        .jig(false)
        .run_with(&ws.pkg, Mode::Regenerate, &mut Resolver::default(), &Rejecting)
        .unwrap_err();

    assert!(matches!(err, JigError::Fix(FixError::Rejected(_))));
    assert_eq!(ws.read("shapes_jig.go"), stale);
}

#[test]
fn test_regenerate_drops_unused_fragments() {
    let stale = generated_file(
        "shapes",
        &[
            ("StackInt", "type StackInt []int"),
            ("StackBool", "type StackBool []bool"),
        ],
    );
    let ws = Workspace::new(&[("main.go", USES_STACK_INT), ("shapes_jig.go", &stale)]);

    assert!(ws.run(Mode::Regenerate).is_success());
    let text = ws.read("shapes_jig.go");
    assert_eq!(fragment_count(&text, "StackInt"), 1);
    assert_eq!(fragment_count(&text, "StackBool"), 0);
}

#[test]
fn test_missing_mode_keeps_existing_fragments() {
    let existing = generated_file("shapes", &[("StackBool", "type StackBool []bool")]);
    let ws = Workspace::new(&[("main.go", USES_STACK_INT), ("shapes_jig.go", &existing)]);

    assert!(ws.run(Mode::Missing).is_success());
    let text = ws.read("shapes_jig.go");
    assert_eq!(fragment_count(&text, "StackBool"), 1);
    assert_eq!(fragment_count(&text, "StackInt"), 1);
}

#[test]
fn test_forced_type_regeneration() {
    let stale = generated_file(
        "shapes",
        &[("StackInt", "type StackInt []string\n\nfunc NewStackInt() *StackInt { return nil }\n\nfunc (s *StackInt) Push(v string) {}")],
    );
    let ws = Workspace::new(&[
        ("main.go", USES_STACK_INT),
        ("force.go", "package shapes\n\n//jig:type StackInt\n"),
        ("shapes_jig.go", &stale),
    ]);

    let report = ws.run(Mode::Missing);
    assert!(report.is_success(), "unexpected report: {report:?}");

    let text = ws.read("shapes_jig.go");
    assert!(text.contains("type StackInt []int\n"));
    assert!(!text.contains("[]string"));
    assert_eq!(fragment_count(&text, "StackInt"), 1);
}

#[test]
fn test_forced_file_regeneration() {
    let stale = generated_file(
        "shapes",
        &[
            ("StackBool", "type StackBool []int"),
            ("PairIntBool", "type PairIntBool struct{}"),
        ],
    )
    .replace("//go:generate jig --regen\n", "//go:generate jig --regen\n//jig:file\n");
    let ws = Workspace::new(&[("main.go", "package shapes\n"), ("shapes_jig.go", &stale)]);

    let report = ws.run(Mode::Missing);
    assert!(report.is_success(), "unexpected report: {report:?}");

    let text = ws.read("shapes_jig.go");
    assert!(text.contains("//jig:file\n"));
    assert!(text.contains("type StackBool []bool\n"));
    assert!(text.contains("type PairIntBool struct {\n\tfirst  int\n\tsecond bool\n}\n"));
    assert_eq!(fragment_count(&text, "StackBool"), 1);
    assert_eq!(fragment_count(&text, "PairIntBool"), 1);
}

#[test]
fn test_nodoc_strips_documentation() {
    let ws = Workspace::new(&[("main.go", USES_STACK_INT)]);

    let report = ws
        .jig(true)
        .run_with(&ws.pkg, Mode::Regenerate, &mut Resolver::default(), &Canonicalizer)
        .unwrap();
    assert!(report.is_success());

    let text = ws.read("shapes_jig.go");
    assert!(text.contains("type StackInt []int\n"));
    assert!(!text.contains("LIFO"));
    assert!(text.starts_with(BANNER));
}

#[test]
fn test_clean_mode_removes_generated_files() {
    let existing = generated_file("shapes", &[("StackInt", "type StackInt []int")]);
    let ws = Workspace::new(&[("main.go", USES_STACK_INT), ("shapes_jig.go", &existing)]);

    let mut resolver = Resolver::default();
    let report = ws
        .jig(false)
        .run_with(&ws.pkg, Mode::Clean, &mut resolver, &Canonicalizer)
        .unwrap();

    assert!(report.is_success());
    assert_eq!(resolver.calls, 0);
    assert!(!ws.path("shapes_jig.go").exists());
    assert!(ws.path("main.go").exists());
    assert_eq!(report.messages().len(), 1);
}

#[test]
fn test_fragments_map_to_one_file() {
    let ws = Workspace::new(&[(
        "main.go",
        "package shapes\n\nvar a StackInt\nvar b NewStackInt\nvar c StackPairIntInt\n",
    )]);

    assert!(ws.run(Mode::Regenerate).is_success());

    let text = ws.read("shapes_jig.go");
    let mut pkg = ws.jig(false).open(&ws.pkg).unwrap();
    pkg.scan();

    assert_eq!(pkg.store().len(), 3);
    for name in pkg.store().names() {
        assert_eq!(fragment_count(&text, name), 1, "{name} generated more than once");
        assert_eq!(pkg.store().get(name), Some(ws.path("shapes_jig.go").as_path()));
    }
    assert!(pkg.store().contains("PairIntInt"));
}
