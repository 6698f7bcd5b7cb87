#![deny(missing_docs)]

//! # Code Emitter
//!
//! Line-oriented text accumulator with brace-driven auto-indentation, used by every
//! generator to build one output unit.
//!
//! `line` trims the template, closes one level per leading `}`, writes the current
//! indentation and the text, then opens one level per trailing `{`. Parentheses are
//! not counted; blocks such as `import (` use `enter`/`leave` explicitly. The
//! heuristic only looks at brace characters, so a line whose braces live inside a
//! string literal needs `raw` or the explicit level controls.
//!
//! ```
//! use gapic_core::emitter::Emitter;
//!
//! let mut em = Emitter::new();
//! em.line("func f() {");
//! em.line("return");
//! em.line("}");
//! assert_eq!(em.as_str(), "func f() {\n\treturn\n}\n");
//! ```

/// Formats a line and appends it to an [`Emitter`].
#[macro_export]
macro_rules! emit {
    ($em:expr, $($arg:tt)*) => {
        $em.line(&format!($($arg)*))
    };
}

/// Accumulates generated source for exactly one output unit.
#[derive(Debug, Default)]
pub struct Emitter {
    buf: String,
    level: usize,
}

impl Emitter {
    /// Creates an empty emitter at indentation level zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one line, adjusting indentation from its braces.
    pub fn line(&mut self, template: &str) {
        let text = template.trim();
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }

        let closing = text.chars().take_while(|c| *c == '}').count();
        self.level = self.level.saturating_sub(closing);
        self.write_indented(text);
        self.level += text.chars().rev().take_while(|c| *c == '{').count();
    }

    /// Writes a bare newline.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Writes a `//` comment block at the current level without brace counting.
    pub fn comment(&mut self, text: &str) {
        for line in text.trim_end().lines() {
            let line = line.trim_end();
            if line.is_empty() {
                self.write_indented("//");
            } else if line.starts_with(' ') {
                self.write_indented(&format!("//{}", line));
            } else {
                self.write_indented(&format!("// {}", line));
            }
        }
    }

    /// Opens one indentation level explicitly.
    pub fn enter(&mut self) {
        self.level += 1;
    }

    /// Closes one indentation level explicitly.
    pub fn leave(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Current indentation level.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Direct access to the buffer for out-of-band fixes.
    pub fn raw(&mut self) -> &mut String {
        &mut self.buf
    }

    /// The text accumulated so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consumes the emitter, returning its text.
    pub fn into_string(self) -> String {
        self.buf
    }

    fn write_indented(&mut self, text: &str) {
        for _ in 0..self.level {
            self.buf.push('\t');
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }
}
