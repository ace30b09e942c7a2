/// Single-key console commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a capture, or stop the running one
    Capture,
    ShowLatest,
    DumpLast,
    ListFiles,
    Help,
    Quit,
}

pub const HELP: &str = "\
Available Commands:

c: List capture files
d: Show last capture file
f: Capture IMU data (press again to stop)
h: Show help
i: Show latest IMU sample
q: Quit
";

impl Command {
    /// Parse one line of console input. Only its first character counts.
    pub fn parse(line: &str) -> Option<Self> {
        let key = line.trim().chars().next()?;
        match key.to_ascii_lowercase() {
            'f' => Some(Command::Capture),
            'i' => Some(Command::ShowLatest),
            'd' => Some(Command::DumpLast),
            'c' => Some(Command::ListFiles),
            'h' | '?' => Some(Command::Help),
            'q' => Some(Command::Quit),
            _ => None,
        }
    }
}
