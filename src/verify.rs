//! Round-trip fidelity check.
//!
//! A tree is only trusted if rendering it reproduces the text it was parsed
//! from, byte for byte.

use crate::syntax::SyntaxTree;
use similar::TextDiff;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FidelityError {
    #[error("rendered tree differs from {} at byte {offset}", path.display())]
    Mismatch {
        path: PathBuf,
        offset: usize,
        rendered: String,
        diff: String,
    },
}

/// Render `tree` and compare it with `original`.
pub fn verify(tree: &SyntaxTree, original: &str, path: &Path) -> Result<(), FidelityError> {
    let rendered = tree.render();
    match first_difference(&rendered, original) {
        None => Ok(()),
        Some(offset) => {
            let diff = TextDiff::from_lines(original, rendered.as_str())
                .unified_diff()
                .header(&path.display().to_string(), "rendered")
                .to_string();
            Err(FidelityError::Mismatch {
                path: path.to_path_buf(),
                offset,
                rendered,
                diff,
            })
        }
    }
}

/// Byte offset of the first difference, or `None` if equal.
fn first_difference(left: &str, right: &str) -> Option<usize> {
    if left == right {
        return None;
    }
    let common = left
        .bytes()
        .zip(right.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    Some(common)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::factory;
    use crate::syntax::parse;

    #[test]
    fn test_parsed_tree_verifies() {
        let source = "// header\nnamespace A { class B { public: void C() {} }; }\n";
        let tree = parse(source).unwrap();
        assert!(verify(&tree, source, Path::new("a.h")).is_ok());
    }

    #[test]
    fn test_mismatch_reports_offset_and_diff() {
        let tree = SyntaxTree::new(
            factory::translation_unit(
                factory::syntax_list(Vec::<crate::syntax::GreenElement>::new()),
                factory::end_of_file(vec![factory::trivia("int x;\n")]),
            )
            .unwrap(),
        );
        let err = verify(&tree, "int y;\n", Path::new("b.h")).unwrap_err();
        let FidelityError::Mismatch {
            path,
            offset,
            rendered,
            diff,
        } = err;
        assert_eq!(path, PathBuf::from("b.h"));
        assert_eq!(offset, 4);
        assert_eq!(rendered, "int x;\n");
        assert!(diff.contains("-int y;"));
        assert!(diff.contains("+int x;"));
    }

    #[test]
    fn test_prefix_mismatch_offset() {
        assert_eq!(first_difference("abc", "abcd"), Some(3));
        assert_eq!(first_difference("abc", "abc"), None);
        assert_eq!(first_difference("", "a"), Some(0));
    }
}
