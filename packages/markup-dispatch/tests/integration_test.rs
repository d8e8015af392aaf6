//! End-to-end tests for the outline flavor and the command-line tool.
//!
//! Uses the shopping-list page under `tests/fixtures/outline`, which mixes
//! plain elements, a scoped container, an unrouted tag and an include.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use assert_cmd::Command;
use markup_dispatch::config::DispatchConfig;
use markup_dispatch::outline::{create_outline_parser, OutlineBuilder, OutlineNode};
use markup_dispatch::{
    Binding, DispatchError, FsResolver, HandlerBinding, Parser, Result, Tag, TagHandler,
};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("outline")
}

fn load_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_markup-dispatch"))
}

fn el(name: &str, children: Vec<OutlineNode>) -> OutlineNode {
    OutlineNode::element(name, children)
}

fn text(text: &str) -> OutlineNode {
    OutlineNode::text(text)
}

#[test]
fn test_fixture_outline() {
    let config = DispatchConfig::load(&fixtures_dir().join("dispatch.yaml")).unwrap();
    let mut parser = create_outline_parser(&config).unwrap();
    parser.set_resolver(Rc::new(FsResolver::new(fixtures_dir())));

    let outline = parser.parse(load_fixture("page.html")).unwrap();

    let expected = vec![el(
        "html",
        vec![el(
            "body",
            vec![
                el("h1", vec![text("Shopping list")]),
                el("p", vec![text("Bring a"), el("b", vec![text("bag")]), text("and:")]),
                el(
                    "myitems",
                    vec![
                        el("item", vec![text("Bread")]),
                        el("item", vec![text("Cheese"), el("i", vec![text("(aged)")])]),
                    ],
                ),
                // <it> outside the container has no handler and is dropped whole.
                el("p", vec![text("Done.")]),
                text("Included from disk."),
            ],
        )],
    )];
    assert_eq!(outline, expected);
    assert_eq!(parser.override_depth(), 0);
    assert!(parser.handler_for("IT").is_none());
}

#[test]
fn test_parser_is_reusable_across_documents() {
    let config = DispatchConfig::from_yaml("elements: [B]").unwrap();
    let mut parser = create_outline_parser(&config).unwrap();

    let first = parser.parse("<b>one</b>").unwrap();
    let second = parser.parse("two").unwrap();

    assert_eq!(first, [el("b", vec![text("one")])]);
    assert_eq!(second, [text("two")]);
}

/// Marks every `<LI>` inside a `<UL>` or `<OL>` with the list's kind,
/// using manual push/pop instead of `with_override`.
#[derive(Default)]
struct ListHandler {
    binding: HandlerBinding,
}

impl TagHandler<OutlineBuilder> for ListHandler {
    fn supported_tags(&self) -> &str {
        "UL,OL"
    }

    fn handle(&self, tag: &Tag, parser: &mut Parser<OutlineBuilder>) -> Result<bool> {
        if tag.name() == "LI" {
            parser.flavor_mut().open_element("entry");
            let result = parser.parse_inner(tag);
            parser.flavor_mut().close_element();
            return result;
        }

        let own_id = self.binding.handler_id(tag)?;
        parser.flavor_mut().open_element(tag.name().to_ascii_lowercase());
        parser.push_handler(own_id, "LI")?;
        let result = parser.parse_inner(tag);
        parser.pop_handler()?;
        parser.flavor_mut().close_element();
        result
    }

    fn bind(&self, binding: Binding) -> Result<()> {
        self.binding.bind(binding)
    }
}

#[test]
fn test_custom_handler_with_manual_overrides() {
    let mut parser = Parser::new(OutlineBuilder::new());
    parser.add_handler(ListHandler::default()).unwrap();

    let outline = parser
        .parse("<li>stray</li><ul><li>a</li><li>b</li></ul><ol><li>c</li></ol>")
        .unwrap();

    assert_eq!(
        outline,
        [
            el(
                "ul",
                vec![el("entry", vec![text("a")]), el("entry", vec![text("b")])]
            ),
            el("ol", vec![el("entry", vec![text("c")])]),
        ]
    );
    assert!(parser.handler_for("LI").is_none());
}

#[test]
fn test_include_outside_root_fails() {
    let dir = TempDir::new().unwrap();
    let mut parser = create_outline_parser(
        &DispatchConfig::from_yaml("include_tags: [INCLUDE]").unwrap(),
    )
    .unwrap();
    parser.set_resolver(Rc::new(FsResolver::new(dir.path())));

    let err = parser.parse("<include>../secret.txt</include>").unwrap_err();
    assert!(matches!(err, DispatchError::ResourceOutsideRoot(_)));
}

#[test]
fn test_cli_outline_yaml() {
    cli()
        .arg("outline")
        .arg(fixtures_dir().join("page.html"))
        .arg("--config")
        .arg(fixtures_dir().join("dispatch.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("kind: element"))
        .stdout(predicate::str::contains("name: item"))
        .stdout(predicate::str::contains("text: Bread"))
        .stdout(predicate::str::contains("text: Included from disk."))
        .stdout(predicate::str::contains("not an item").not());
}

#[test]
fn test_cli_outline_tree() {
    cli()
        .arg("outline")
        .arg(fixtures_dir().join("page.html"))
        .args(["--config"])
        .arg(fixtures_dir().join("dispatch.yaml"))
        .args(["--format", "tree", "--width", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<myitems>"))
        .stdout(predicate::str::contains("      <item>"))
        .stdout(predicate::str::contains("\"Bread\""));
}

#[test]
fn test_cli_outline_tags_option() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, "<p>x <b>y</b></p>").unwrap();

    cli()
        .arg("outline")
        .arg(&page)
        .args(["--tags", "p,b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: p"))
        .stdout(predicate::str::contains("text: y"));
}

#[test]
fn test_cli_include_with_root() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, "<include>intro.txt</include>").unwrap();

    cli()
        .arg("outline")
        .arg(&page)
        .args(["--include-tag", "INCLUDE", "--root"])
        .arg(fixtures_dir().join("parts"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Included from disk."));
}

#[test]
fn test_cli_tags() {
    cli()
        .arg("tags")
        .arg(fixtures_dir().join("page.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("MYITEMS"))
        .stdout(predicate::str::contains("!DOCTYPE"))
        .stdout(predicate::str::contains("Tags:"));
}

#[test]
fn test_cli_missing_file() {
    cli()
        .arg("outline")
        .arg(fixtures_dir().join("missing.html"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: IO error"));
}

#[test]
fn test_cli_rejects_unknown_config_fields() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("dispatch.yaml");
    fs::write(&config, "elements: [P]\ncolour: red\n").unwrap();

    cli()
        .arg("outline")
        .arg(fixtures_dir().join("page.html"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("YAML error"));
}

#[test]
fn test_cli_include_escaping_root_fails() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, "<include>../../etc/passwd</include>").unwrap();

    cli()
        .arg("outline")
        .arg(&page)
        .args(["--include-tag", "include"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("escapes resolver root"));
}
