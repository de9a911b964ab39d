//! Source row of a Huntr job-application export

/// One CSV line of the export, trimmed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceRow {
    /// 1-based line number in the source file (header is line 1)
    pub line: usize,
    pub title: String,
    /// Posting URL; carried through but never uploaded
    pub url: String,
    pub company_name: String,
    /// Huntr list the application sits in, e.g. "applied"
    pub list_name: String,
    /// Huntr board; `None` when the cell is empty
    pub board_name: Option<String>,
}

impl SourceRow {
    /// True when the row belongs to one of `boards`
    pub fn on_board<'a, I>(&self, boards: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        match &self.board_name {
            Some(board) => boards.into_iter().any(|b| b == board),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_board() {
        let row = SourceRow {
            board_name: Some("boardA".to_string()),
            ..Default::default()
        };
        let boards = vec!["boardA".to_string(), "boardC".to_string()];

        assert!(row.on_board(&boards));
        assert!(!row.on_board(&vec!["boardB".to_string()]));
    }

    #[test]
    fn test_row_without_board_is_never_on_board() {
        let row = SourceRow::default();
        assert!(!row.on_board(&vec![String::new()]));
    }
}
