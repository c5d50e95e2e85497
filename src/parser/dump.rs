//! Plain-text rendering of a parsed tree
//!
//! One line per node, children indented by two spaces:
//!
//! ```text
//!  * FILE (shapes.h)
//!    * CLASS (Circle)
//!      * INHERIT (public|Shape)
//!      * FUNCTION (public|area)
//!        * TYPE (double)
//! ```

use crate::parser::ast::{AstChild, AstNode};
use crate::parser::token::TokenSource;
use std::io;

/// Write `node` and its subtree to `out`.
pub fn write_tree<W: io::Write>(out: &mut W, source: &TokenSource, node: &AstNode) -> io::Result<()> {
    write_node(out, source, node, 0)
}

/// Render `node` and its subtree into a string.
pub fn tree_to_string(source: &TokenSource, node: &AstNode) -> String {
    let mut buffer = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_tree(&mut buffer, source, node);
    String::from_utf8_lossy(&buffer).into_owned()
}

fn write_node<W: io::Write>(
    out: &mut W,
    source: &TokenSource,
    node: &AstNode,
    depth: usize,
) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    writeln!(out, "{indent} * {} ({})", node.kind, node.data.join("|"))?;

    for child in &node.children {
        match child {
            AstChild::Node(child) => write_node(out, source, child, depth + 1)?,
            AstChild::Type(ty) => {
                writeln!(out, "{indent}   * TYPE ({})", ty.render(source))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::NodeKind;
    use crate::parser::parse::Parser;

    #[test]
    fn test_dump_layout() {
        let source = TokenSource::from_text("class Circle : public Shape { public: double area() const; };").unwrap();
        let mut root = AstNode::new(NodeKind::File, 1).with_data("shapes.h");
        Parser::new(&source).parse(&mut root).unwrap();

        let expected = "\
 * FILE (shapes.h)
   * CLASS (Circle)
     * INHERIT (public|Shape)
     * FUNCTION (public|area)
       * TYPE (double)
       * FUNCTION_PROPERTIES (const)
";
        assert_eq!(tree_to_string(&source, &root), expected);
    }
}
