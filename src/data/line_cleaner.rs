// ============================================================
// Layer 4 — Line Cleaner
// ============================================================
// Strips leading line numbers from a text file:
//
//   "12  Hello world"  →  "Hello world"
//   "   7\tfoo bar"    →  "foo bar"
//   "42"               →  "42"      (no separator after the digits)
//   "   "              →  dropped
//
// Each line is trimmed, the pattern `^\s*\d+\s+` is removed,
// and the remainder is trimmed again. "\n", "\r\n" and a bare
// "\r" all end a line. Lines that end up empty
// are dropped; the rest are joined with '\n' and no trailing
// newline.

use regex::Regex;

pub struct LineCleaner {
    number_prefix: Regex,
}

impl LineCleaner {
    pub fn new() -> Self {
        // Literal pattern: compilation cannot fail at runtime
        let number_prefix = Regex::new(r"^\s*\d+\s+")
            .unwrap_or_else(|e| unreachable!("invalid line-number pattern: {e}"));
        Self { number_prefix }
    }

    /// Clean one line. Returns None when nothing is left.
    pub fn clean_line(&self, line: &str) -> Option<String> {
        let stripped = self.number_prefix.replace(line.trim(), "");
        let cleaned  = stripped.trim();
        (!cleaned.is_empty()).then(|| cleaned.to_string())
    }

    /// Clean a whole text and join the surviving lines.
    pub fn clean(&self, text: &str) -> String {
        text.split(['\n', '\r'])
            .filter_map(|line| self.clean_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for LineCleaner {
    fn default() -> Self {
        Self::new()
    }
}
