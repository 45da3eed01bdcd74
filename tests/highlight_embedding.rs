//! Embedded languages and recursive grammars, end to end.

use hilite::highlight::grammar::loader;
use hilite::highlight::{HighlightOptions, Highlighter, Node};

fn render(nodes: &[Node]) -> String {
    nodes.iter().map(render_node).collect::<Vec<_>>().join(" ")
}

fn render_node(node: &Node) -> String {
    match node {
        Node::Text(value) => format!("{:?}", value),
        Node::Element(element) => {
            let classes = element.class_names.join(" ");
            if element.children.is_empty() {
                format!("({})", classes)
            } else {
                format!("({} {})", classes, render(&element.children))
            }
        }
    }
}

fn with(grammars: &[(&str, &str)]) -> Highlighter {
    let mut highlighter = Highlighter::with_defaults().expect("bundled grammars to load");
    for (name, source) in grammars {
        highlighter.register(*name, loader::from_yaml(source).unwrap());
    }
    highlighter
}

const TAGS: &str = r#"
contains:
  - className: string
    begin: '"'
    end: '"'
"#;

const HOST: &str = r#"
contains:
  - begin: '<'
    end: '>'
    excludeBegin: true
    excludeEnd: true
    subLanguage: tags
    contains:
      - className: subst
        begin: '\{'
        end: '\}'
"#;

#[test]
fn sub_language_resumes_across_chunks() {
    let highlighter = with(&[("tags", TAGS), ("host", HOST)]);
    let result = highlighter
        .highlight("host", "<a \"b{x}c\" d>", &HighlightOptions::default())
        .unwrap();

    // The string opened in the first chunk is still open when the second one starts
    insta::assert_snapshot!(render(&result.nodes), @r###""<" (tags "a " (hljs-string "\"b")) (hljs-subst "{x}") (tags "c\" d") ">""###);
    // string (1, first chunk only) + subst (1)
    assert_eq!(result.relevance, 2);
}

#[test]
fn html_template_resumes_inside_an_attribute() {
    let result = with(&[])
        .highlight(
            "javascript",
            "html`<a title=\"${x}\">b</a>`",
            &HighlightOptions::default(),
        )
        .unwrap();

    insta::assert_snapshot!(render(&result.nodes), @r###""html`" (xml (hljs-tag "<" (hljs-name "a") " " (hljs-attr "title") "=" (hljs-string "\""))) (hljs-subst "${x}") (xml "\">b" (hljs-tag "</" (hljs-name "a") ">") "`")"###);
    // template (1) + first chunk (2) + subst (1) + second chunk (1)
    assert_eq!(result.relevance, 5);
}

#[test]
fn script_body_is_detected_among_candidates() {
    let result = with(&[])
        .highlight(
            "html",
            "<script>var x</script>",
            &HighlightOptions::default(),
        )
        .unwrap();

    insta::assert_snapshot!(render(&result.nodes), @r###"(hljs-tag "<" (hljs-name "script") ">") (javascript (hljs-keyword "var") " x") (hljs-tag "</" (hljs-name "script") ">")"###);
    // both tags (2) + the `script` keyword (1) + the detected body (1)
    assert_eq!(result.relevance, 4);
}

#[test]
fn recursive_definition_ending_with_its_parent() {
    let lisp = r#"
definitions:
  list:
    className: list
    begin: '\('
    end: '\)'
    endsWithParent: true
    contains: [list]
contains: [list]
"#;
    let result = with(&[("lisp", lisp)])
        .highlight("lisp", "(a (b))", &HighlightOptions::default())
        .unwrap();

    insta::assert_snapshot!(render(&result.nodes), @r###"(hljs-list "(a " (hljs-list "(b)") ")")"###);
    assert_eq!(result.relevance, 2);
}
