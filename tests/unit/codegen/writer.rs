use super::*;

#[test]
fn blocks_indent_their_body() {
    let mut w = CodeWriter::new("    ");
    w.open("fun a() {");
    w.line("x()");
    w.open("if (y) {");
    w.line("z()");
    w.reopen("} else {");
    w.line("q()");
    w.close("}");
    w.close("}");
    assert_eq!(
        w.finish(),
        "fun a() {\n    x()\n    if (y) {\n        z()\n    } else {\n        q()\n    }\n}\n"
    );
}

#[test]
fn multi_line_strings_are_indented_per_line() {
    let mut w = CodeWriter::new("  ");
    w.indent();
    w.line("a\n\nb");
    w.dedent();
    w.line("c");
    assert_eq!(w.finish(), "  a\n\n  b\nc\n");
}

#[test]
fn blank_lines_never_stack() {
    let mut w = CodeWriter::new("    ");
    w.blank();
    w.line("a");
    w.blank();
    w.blank();
    w.line("b");
    w.blank();
    assert_eq!(w.finish(), "a\n\nb\n");
}

#[test]
fn close_never_underflows() {
    let mut w = CodeWriter::new("\t");
    w.close("}");
    w.dedent();
    w.line("x");
    assert_eq!(w.finish(), "}\nx\n");
}
