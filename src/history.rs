/// Single-slot command history backing `!!`.
///
/// Written with every executed line that is not itself `!!`; read only when
/// `!!` is entered. Lives as long as the shell session, never persisted.
#[derive(Debug, Default)]
pub struct History {
    last: Option<String>,
}

/// What a normalized line turned into.
#[derive(Debug, PartialEq, Eq)]
pub enum Recall {
    /// Nothing to run: empty line.
    Empty,
    /// `!!` with nothing stored.
    NoHistory,
    /// `!!` expanded to the stored line.
    Repeat(String),
    /// A fresh line, already recorded.
    Fresh(String),
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Strip the trailing newline, trim, and resolve `!!`.
    pub fn recall(&mut self, raw: &str) -> Recall {
        let line = raw.strip_suffix('\n').unwrap_or(raw).trim();
        if line.is_empty() {
            return Recall::Empty;
        }
        if line == "!!" {
            return match &self.last {
                Some(prev) => Recall::Repeat(prev.clone()),
                None => Recall::NoHistory,
            };
        }
        self.last = Some(line.to_string());
        Recall::Fresh(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lines_do_not_touch_history() {
        let mut h = History::new();
        assert_eq!(h.recall(""), Recall::Empty);
        assert_eq!(h.recall(" \t\n"), Recall::Empty);
        assert_eq!(h.last(), None);
    }

    #[test]
    fn test_bang_bang_without_history() {
        let mut h = History::new();
        assert_eq!(h.recall("!!"), Recall::NoHistory);
        assert_eq!(h.last(), None);
    }

    #[test]
    fn test_fresh_line_is_stored_trimmed() {
        let mut h = History::new();
        assert_eq!(h.recall("  ls -al \n"), Recall::Fresh("ls -al".into()));
        assert_eq!(h.last(), Some("ls -al"));
    }

    #[test]
    fn test_repeated_bang_bang_is_idempotent() {
        let mut h = History::new();
        h.recall("echo one");
        for _ in 0..3 {
            assert_eq!(h.recall("!!\n"), Recall::Repeat("echo one".into()));
        }
        assert_eq!(h.last(), Some("echo one"));
        h.recall("echo two");
        assert_eq!(h.recall(" !! "), Recall::Repeat("echo two".into()));
    }
}
