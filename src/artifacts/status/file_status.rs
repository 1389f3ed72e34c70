use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileStatus {
    /// Neither staged nor recorded in the committed tree
    Untracked,
    /// The working copy differs from what was staged or committed
    Modified,
    /// The staged content matches the working copy
    Staged,
    /// The working copy matches the committed tree and nothing is staged
    Committed,
}

impl FileStatus {
    /// Two-column short code, empty for committed files
    pub fn code(&self) -> &'static str {
        match self {
            FileStatus::Untracked => "??",
            FileStatus::Modified => " M",
            FileStatus::Staged => "A ",
            FileStatus::Committed => "  ",
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, FileStatus::Committed)
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            FileStatus::Untracked => self.code().red(),
            FileStatus::Modified => self.code().red(),
            FileStatus::Staged => self.code().green(),
            FileStatus::Committed => self.code().normal(),
        };

        write!(f, "{code}")
    }
}
