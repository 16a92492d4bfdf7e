/// Line-oriented source writer with block indentation.
#[derive(Debug)]
pub(crate) struct CodeWriter {
    out: String,
    level: usize,
    unit: &'static str,
}

impl CodeWriter {
    pub(crate) fn new(unit: &'static str) -> Self {
        Self {
            out: String::new(),
            level: 0,
            unit,
        }
    }

    /// One line at the current indentation. Embedded newlines are indented line by line.
    pub(crate) fn line(&mut self, s: impl AsRef<str>) {
        for l in s.as_ref().split('\n') {
            if l.is_empty() {
                self.out.push('\n');
                continue;
            }
            for _ in 0..self.level {
                self.out.push_str(self.unit);
            }
            self.out.push_str(l);
            self.out.push('\n');
        }
    }

    /// Write `s` and indent what follows.
    pub(crate) fn open(&mut self, s: impl AsRef<str>) {
        self.line(s);
        self.level += 1;
    }

    /// Dedent and write `s`.
    pub(crate) fn close(&mut self, s: impl AsRef<str>) {
        self.level = self.level.saturating_sub(1);
        self.line(s);
    }

    /// Dedent, write `s`, indent again (`} else {`).
    pub(crate) fn reopen(&mut self, s: impl AsRef<str>) {
        self.level = self.level.saturating_sub(1);
        self.line(s);
        self.level += 1;
    }

    pub(crate) fn indent(&mut self) {
        self.level += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub(crate) fn blank(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    pub(crate) fn finish(mut self) -> String {
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codegen/writer.rs"]
mod tests;
