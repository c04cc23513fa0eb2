/// One submitted console line split into a command token and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub name: String,
    pub arguments: Vec<String>,
}

impl CommandLine {
    /// Trailing spaces are dropped, then the line is split on single spaces.
    /// Interior runs of spaces produce empty arguments, which count towards
    /// the arity check. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(' ');
        if line.is_empty() {
            return None;
        }

        let mut parts = line.split(' ').map(str::to_string);
        let name = parts.next()?;
        Some(Self {
            name,
            arguments: parts.collect(),
        })
    }
}
