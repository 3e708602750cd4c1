//! Tests for the DOM classes as seen from JavaScript.

mod common;

use common::{eval, runtime, thrown};
use wombat_dom::{BODY_TARGET_ID, UiCommand};

// ========== globals ==========

#[test]
fn test_globals_are_installed() {
    let mut rt = runtime();
    assert_eq!(
        eval(
            &mut rt,
            "[typeof Node, typeof Document, typeof Element, typeof Text, typeof Comment, typeof document].join()"
        ),
        "function,function,function,function,function,object"
    );
    assert_eq!(eval(&mut rt, "document instanceof Document"), "true");
    assert_eq!(eval(&mut rt, "document instanceof Node"), "true");
    assert_eq!(eval(&mut rt, "Element.name + ':' + Element.length"), "Element:1");
}

#[test]
fn test_body_identity() {
    let mut rt = runtime();
    assert_eq!(eval(&mut rt, "document.body === document.body"), "true");
    assert_eq!(eval(&mut rt, "document.body.tagName"), "BODY");
    assert_eq!(eval(&mut rt, "document.body.isConnected"), "true");
    assert_eq!(eval(&mut rt, "document.nodeName + ' ' + document.nodeType"), "#document 9");
}

#[test]
fn test_constructors_need_new() {
    let mut rt = runtime();
    assert_eq!(
        thrown(&mut rt, "Element('div')"),
        "TypeError: Failed to construct 'Element': Please use the 'new' operator, this DOM object constructor cannot be called as a function."
    );
    assert_eq!(
        thrown(&mut rt, "new Document()"),
        "TypeError: Failed to construct 'Document': Illegal constructor."
    );
    assert_eq!(
        thrown(&mut rt, "new Node()"),
        "TypeError: Failed to construct 'Node': Illegal constructor."
    );
}

// ========== construction ==========

#[test]
fn test_create_element() {
    let mut rt = runtime();
    assert_eq!(eval(&mut rt, "document.createElement('div').tagName"), "DIV");
    assert_eq!(
        eval(
            &mut rt,
            "document.createElement('a') !== document.createElement('a')"
        ),
        "true"
    );
    assert_eq!(
        eval(
            &mut rt,
            "const e = document.createElement('p'); (e instanceof Element) + ' ' + (e instanceof Node) + ' ' + (e instanceof Text)"
        ),
        "true true false"
    );
    assert_eq!(
        thrown(&mut rt, "document.createElement()"),
        "TypeError: Failed to createElement: only accept 1 parameter."
    );
    assert_eq!(
        thrown(&mut rt, "document.createElement(5)"),
        "TypeError: Failed to createElement: tagName should be a string."
    );
}

#[test]
fn test_element_constructor() {
    let mut rt = runtime();
    assert_eq!(eval(&mut rt, "new Element('span').tagName"), "SPAN");
    assert_eq!(
        thrown(&mut rt, "new Element()"),
        "TypeError: Failed to construct 'Element': 1 argument required, but only 0 present."
    );
    assert_eq!(
        thrown(&mut rt, "new Element('a b')"),
        "TypeError: Failed to construct 'Element': The tag name provided ('a b') is not a valid name."
    );
}

#[test]
fn test_subclassed_element() {
    let mut rt = runtime();
    assert_eq!(
        eval(
            &mut rt,
            r"
            class Widget extends Element {
                describe() { return 'widget:' + this.tagName; }
            }
            const w = new Widget('x-widget');
            [w instanceof Widget, w instanceof Element, w.describe()].join()
            "
        ),
        "true,true,widget:X-WIDGET"
    );
    assert_eq!(
        eval(&mut rt, "Object.getPrototypeOf(new Element('p')) === Element.prototype"),
        "true"
    );
}

#[test]
fn test_text_and_comment() {
    let mut rt = runtime();
    assert_eq!(
        eval(
            &mut rt,
            "const t = document.createTextNode('hello'); [t.data, t.length, t.nodeName, t.nodeType].join()"
        ),
        "hello,5,#text,3"
    );
    assert_eq!(
        eval(&mut rt, "const c = new Comment('note'); [c.data, c.nodeName, c instanceof Text].join()"),
        "note,#comment,false"
    );
    assert_eq!(
        thrown(&mut rt, "document.createTextNode()"),
        "TypeError: Failed to execute 'createTextNode' on 'Document': 1 argument required, but only 0 present."
    );
    assert_eq!(
        thrown(&mut rt, "document.createComment(null)"),
        "TypeError: Failed to construct 'Comment': data should be a string."
    );
}

#[test]
fn test_data_setter() {
    let mut rt = runtime();
    assert_eq!(
        eval(&mut rt, "const t = new Text('ab'); t.data = 'xyz'; t.data + t.length"),
        "xyz3"
    );
    assert_eq!(eval(&mut rt, "t.data = null; JSON.stringify(t.data)"), "\"\"");
    assert_eq!(
        thrown(&mut rt, "t.data = 4"),
        "TypeError: Failed to set the 'data' property on 'Text': The provided value is not a string."
    );
}

#[test]
fn test_strings_keep_utf16_code_units() {
    let mut rt = runtime();
    assert_eq!(
        eval(
            &mut rt,
            r"
            const lone = '\uD800x';
            const t = document.createTextNode(lone);
            [t.data === lone, t.length, lone.length].join('|')
            "
        ),
        "true|2|2"
    );
    // The escaped spelling is a different string.
    assert_eq!(
        eval(&mut rt, r"document.createTextNode('a\uD800').data === 'a\\uD800'"),
        "false"
    );
    assert_eq!(
        eval(
            &mut rt,
            r"const smile = new Comment('a\u{1F600}'); [smile.data === 'a\u{1F600}', smile.length].join('|')"
        ),
        "true|3"
    );
    assert_eq!(
        eval(&mut rt, r"t.data = '\uDC00'; [t.data === '\uDC00', t.length].join('|')"),
        "true|1"
    );
    // Halves of a pair in separate nodes join up again.
    assert_eq!(
        eval(
            &mut rt,
            r"
            const p = document.createElement('p');
            p.appendChild(new Text('\uD83D'));
            p.appendChild(new Text('\uDE00'));
            p.textContent === '\u{1F600}'
            "
        ),
        "true"
    );
}

#[test]
fn test_read_only_properties_ignore_writes() {
    let mut rt = runtime();
    assert_eq!(
        eval(&mut rt, "const d = document.createElement('div'); d.tagName = 'X'; d.tagName"),
        "DIV"
    );
}

#[test]
fn test_expando_properties() {
    let mut rt = runtime();
    assert_eq!(
        eval(&mut rt, "const t = new Text('a'); t.foo = 42; t.foo + ' ' + t.data"),
        "42 a"
    );
    assert_eq!(eval(&mut rt, "typeof t.dtaa"), "undefined");
}

#[test]
fn test_enumeration_covers_the_class_chain() {
    let mut rt = runtime();
    let keys = eval(
        &mut rt,
        "const keys = []; for (const key in new Text('a')) keys.push(key); keys.join()",
    );
    let keys: Vec<&str> = keys.split(',').collect();
    assert_eq!(&keys[..3], &["nodeName", "data", "length"]);
    assert_eq!(keys.len(), 3 + 9 + 4);
    assert!(keys.contains(&"appendChild"));
    assert_eq!(eval(&mut rt, "Object.keys(new Text('a')).length"), "0");
}

#[test]
fn test_illegal_invocation() {
    let mut rt = runtime();
    assert_eq!(
        thrown(&mut rt, "document.createElement.call(document.body, 'p')"),
        "TypeError: Failed to execute 'createElement' on 'Document': Illegal invocation."
    );
    assert_eq!(
        thrown(&mut rt, "Node.prototype.appendChild.call({}, document.body)"),
        "TypeError: Failed to execute 'appendChild' on 'Node': Illegal invocation."
    );
}

// ========== tree mutation ==========

#[test]
fn test_append_child() {
    let mut rt = runtime();
    assert_eq!(
        eval(
            &mut rt,
            r"
            const div = document.createElement('div');
            const returned = document.body.appendChild(div);
            [
                returned === div,
                div.parentNode === document.body,
                document.body.firstChild === div,
                document.body.childNodes.length,
                div.isConnected,
            ].join()
            "
        ),
        "true,true,true,1,true"
    );
}

#[test]
fn test_insert_before_and_remove() {
    let mut rt = runtime();
    assert_eq!(
        eval(
            &mut rt,
            r"
            const list = document.createElement('ul');
            const a = document.createElement('li');
            const b = document.createElement('li');
            const c = document.createElement('li');
            list.appendChild(c);
            list.insertBefore(a, c);
            list.insertBefore(b, c);
            b.remove();
            list.removeChild(a);
            list.childNodes.length + ' ' + (list.firstChild === c) + ' ' + b.parentNode
            "
        ),
        "1 true null"
    );
}

#[test]
fn test_hierarchy_errors() {
    let mut rt = runtime();
    assert_eq!(
        thrown(
            &mut rt,
            "const outer = document.createElement('div'); const inner = document.createElement('div'); outer.appendChild(inner); inner.appendChild(outer)"
        ),
        "TypeError: Failed to execute 'appendChild' on 'Node': The new child element contains the parent."
    );
    assert_eq!(
        thrown(&mut rt, "document.createElement('div').appendChild(document.body)"),
        "TypeError: Failed to execute 'appendChild' on 'Node': The body element cannot be re-parented."
    );
    assert_eq!(
        thrown(&mut rt, "document.createElement('div').appendChild('text')"),
        "TypeError: Failed to execute 'appendChild' on 'Node': parameter 1 is not of type 'Node'."
    );
    assert_eq!(
        thrown(&mut rt, "document.createElement('div').removeChild(new Text('x'))"),
        "TypeError: Failed to execute 'removeChild' on 'Node': The node to be removed is not a child of this node."
    );
}

#[test]
fn test_text_content() {
    let mut rt = runtime();
    assert_eq!(
        eval(
            &mut rt,
            r"
            const p = document.createElement('p');
            p.appendChild(document.createTextNode('Hello, '));
            const b = p.appendChild(document.createElement('b'));
            b.appendChild(document.createTextNode('world'));
            p.appendChild(document.createComment('ignored'));
            p.textContent
            "
        ),
        "Hello, world"
    );
}

#[test]
fn test_child_nodes_is_a_snapshot() {
    let mut rt = runtime();
    assert_eq!(
        eval(
            &mut rt,
            r"
            const list = document.createElement('ul');
            list.appendChild(document.createElement('li'));
            const before = list.childNodes;
            list.appendChild(document.createElement('li'));
            [Array.isArray(before), before.length, list.childNodes.length, before[0] === list.firstChild].join()
            "
        ),
        "true,1,2,true"
    );
}

// ========== host commands ==========

#[test]
fn test_commands_are_recorded() {
    let mut rt = runtime();
    let _ = rt
        .execute("document.body.appendChild(document.createElement('main')).appendChild(new Text('hi'))")
        .unwrap();
    assert_eq!(
        rt.take_commands(),
        vec![
            UiCommand::CreateElement {
                target_id: 1,
                tag_name: "main".to_string(),
            },
            UiCommand::InsertChild {
                parent: BODY_TARGET_ID,
                child: 1,
                before: None,
            },
            UiCommand::CreateTextNode {
                target_id: 2,
                data: "hi".to_string(),
            },
            UiCommand::InsertChild {
                parent: 1,
                child: 2,
                before: None,
            },
        ]
    );
    assert!(rt.take_commands().is_empty());
}

#[test]
fn test_runtimes_are_independent() {
    let mut first = runtime();
    let mut second = runtime();
    let _ = first.execute("document.createElement('a')").unwrap();
    assert!(second.take_commands().is_empty());
    assert_eq!(eval(&mut second, "document.body.childNodes.length"), "0");
    assert_eq!(first.take_commands().len(), 1);
}
