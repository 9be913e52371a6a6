//! Text produced when several files are merged or inserted into one buffer.

/// Name given to the file a merge creates.
pub const MERGED_FILE_NAME: &str = "Merged File";

/// One file's contribution: a LaTeX comment header naming the file, then its content.
pub fn file_block(file_name: &str, content: &str) -> String {
    format!("% ============ {file_name} ============\n{content}\n\n")
}

/// Concatenates the blocks of `(file_name, content)` pairs in the given order.
pub fn compose<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    parts
        .into_iter()
        .map(|(file_name, content)| file_block(file_name, content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_carries_delimiter_header() {
        let block = file_block("intro.tex", "\\section{Intro}");
        assert!(block.starts_with("% ============ intro.tex ============\n"));
        assert!(block.contains("==== intro.tex ===="));
        assert!(block.ends_with("\\section{Intro}\n\n"));
    }

    #[test]
    fn compose_keeps_order() {
        let text = compose([("b.tex", "B"), ("a.tex", "A")]);
        assert_eq!(
            text,
            "% ============ b.tex ============\nB\n\n% ============ a.tex ============\nA\n\n"
        );
    }

    #[test]
    fn empty_content_still_gets_a_header() {
        assert_eq!(compose([("x", "")]), "% ============ x ============\n\n\n");
    }
}
