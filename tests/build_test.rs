use sitestack::build::{build_site, Error};
use sitestack::config::Config;
use sitestack::gather::gather;
use sitestack::value::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Site {
    _dir: TempDir,
    config: Config,
}

impl Site {
    fn new(files: &[(&str, &str)]) -> Site {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            source_directory: dir.path().join("src"),
            target_directory: dir.path().join("tgt"),
            ..Config::default()
        };
        for (relative, contents) in files {
            let path = config.source_directory.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        Site { _dir: dir, config }
    }

    fn target(&self, relative: &str) -> PathBuf {
        self.config.target_directory.join(relative)
    }

    fn output(&self, relative: &str) -> String {
        fs::read_to_string(self.target(relative)).unwrap()
    }
}

const BASE_TEMPLATE: &str = "{{ .layout }}|{{ .title }}|{{ .url }}|{{ .target }}|{{ .content }}";

#[test]
fn test_directory_metadata_and_front_matter_combine() -> Result<(), Error> {
    let site = Site::new(&[
        ("site.json", r#"{"layout": "base", "template": "base.template"}"#),
        ("base.template", BASE_TEMPLATE),
        ("post.md", "{\"title\": \"Hello\"}\n---\n# Hi"),
    ]);

    let effective = gather(&site.config)?.get(Path::new("post.md"));
    assert_eq!(effective["layout"], Value::from("base"));
    assert_eq!(effective["title"], Value::from("Hello"));
    assert_eq!(effective["target"], Value::from("post.html"));
    assert_eq!(effective["url"], Value::from("/post.html"));

    build_site(&site.config)?;
    assert_eq!(
        site.output("post.html"),
        "base|Hello|/post.html|post.html|<h1>Hi</h1>\n"
    );
    assert!(!site.target("site.json").exists());
    assert!(!site.target("base.template").exists());
    Ok(())
}

#[test]
fn test_file_overrides_directory() -> Result<(), Error> {
    let site = Site::new(&[
        ("blog/site.json", r#"{"layout": "blog"}"#),
        ("blog/a.md", "{\"layout\": \"special\"}\n---\nA"),
        ("blog/b.md", "B"),
    ]);

    let stack = gather(&site.config)?;
    assert_eq!(stack.get(Path::new("blog/a.md"))["layout"], Value::from("special"));
    assert_eq!(stack.get(Path::new("blog/b.md"))["layout"], Value::from("blog"));
    Ok(())
}

#[test]
fn test_unrecognized_files_are_copied_verbatim() -> Result<(), Error> {
    let png: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
    let site = Site::new(&[]);
    let path = site.config.source_directory.join("img/image.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, png).unwrap();

    let stack = gather(&site.config)?;
    // only the global index, which is empty
    assert_eq!(stack.len(), 1);
    let index = stack.get(Path::new("img/image.png"));
    assert_eq!(index["files"].as_map().map(|m| m.len()), Some(0));

    build_site(&site.config)?;
    assert_eq!(fs::read(site.target("img/image.png")).unwrap(), png);
    Ok(())
}

#[test]
fn test_missing_template_key_aborts() {
    let site = Site::new(&[
        ("site.json", r#"{"layout": "base"}"#),
        ("post.md", "{\"title\": \"Hello\"}\n---\n# Hi"),
    ]);

    match build_site(&site.config) {
        Err(err @ Error::MissingKey { .. }) => {
            let message = err.to_string();
            assert!(message.contains("post.md"), "{}", message);
            assert!(message.contains("template"), "{}", message);
        }
        other => panic!("expected missing key error, got {:?}", other),
    }
    assert!(!site.target("post.html").exists());
}

#[test]
fn test_html_content_is_a_template() -> Result<(), Error> {
    let site = Site::new(&[
        ("site.yaml", "site: Example\n"),
        ("style.css", "p{color:red}"),
        (
            "docs/index.html",
            "{\"title\": \"Docs\"}\n---\n<style>{{ importcss \"../style.css\" }}</style><h1>{{ .site }}: {{ .title }}</h1>",
        ),
    ]);

    build_site(&site.config)?;
    assert_eq!(
        site.output("docs/index.html"),
        "<style>p{color:red}</style><h1>Example: Docs</h1>"
    );
    assert_eq!(site.output("style.css"), "p{color:red}");
    Ok(())
}

#[test]
fn test_composed_templates() -> Result<(), Error> {
    let site = Site::new(&[
        ("layout/site.json", r#"{"template": ["page.template", "header.template"]}"#),
        ("layout/page.template", "{{ template \"header\" . }}<main>{{ .content }}</main>"),
        ("layout/header.template", "{{ define \"header\" }}<h1>{{ .title }}</h1>{{ end }}"),
        ("layout/p.md", "{\"title\": \"P\"}\n---\nbody"),
    ]);

    build_site(&site.config)?;
    let output = site.output("layout/p.html");
    assert!(
        output.starts_with("<h1>P</h1><main><p>body</p>\n</main>"),
        "{}",
        output
    );
    Ok(())
}

#[test]
fn test_front_matter_relocates_target() -> Result<(), Error> {
    let site = Site::new(&[
        ("t.template", "{{ .url }}"),
        (
            "post.md",
            "{\"template\": \"t.template\", \"target\": \"hello/index.html\"}\n---\nx",
        ),
    ]);

    build_site(&site.config)?;
    assert!(!site.target("post.html").exists());
    assert_eq!(site.output("hello/index.html"), "/hello/index.html");
    Ok(())
}

#[test]
fn test_malformed_manifest_aborts() {
    let site = Site::new(&[("blog/site.json", "{\"layout\": ")]);
    match build_site(&site.config) {
        Err(Error::Metadata { path, .. }) => assert!(path.ends_with("blog/site.json")),
        other => panic!("expected metadata error, got {:?}", other),
    }
}

#[test]
fn test_template_error_names_file() {
    let site = Site::new(&[("page.html", "{{ .title ")]);
    match build_site(&site.config) {
        Err(err @ Error::Render { .. }) => {
            assert!(err.to_string().contains("page.html"), "{}", err)
        }
        other => panic!("expected render error, got {:?}", other),
    }
}

#[test]
fn test_missing_source_directory_aborts() {
    let site = Site::new(&[]);
    assert!(matches!(build_site(&site.config), Err(Error::Walk(_))));
}

#[test]
fn test_malformed_link_is_rendered_as_written() -> Result<(), Error> {
    let site = Site::new(&[
        ("t.template", "{{ .content }}"),
        ("p.md", "{\"template\": \"t.template\"}\n---\n[x](http://)"),
    ]);

    build_site(&site.config)?;
    assert_eq!(site.output("p.html"), "<p><a href=\"http://\">x</a></p>\n");
    Ok(())
}
