/// A byte offset range inside a settings file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Span of `part` inside `line`, where `line` starts at byte `offset`.
    ///
    /// `part` must be a subslice of `line`; otherwise the whole line is used.
    pub fn of_part(line: &str, offset: usize, part: &str) -> Self {
        let line_start = line.as_ptr() as usize;
        let part_start = part.as_ptr() as usize;
        if part_start >= line_start && part_start + part.len() <= line_start + line.len() {
            let start = offset + (part_start - line_start);
            Self::new(start as u32, (start + part.len()) as u32)
        } else {
            Self::new(offset as u32, (offset + line.len()) as u32)
        }
    }

    pub fn range(self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// A value annotated with its source span.
#[derive(Clone, Debug)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_span_is_relative_to_offset() {
        let line = "heat = 120";
        let value = &line[7..];
        let span = Span::of_part(line, 100, value);
        assert_eq!(span, Span::new(107, 110));
    }

    #[test]
    fn foreign_part_falls_back_to_line() {
        let line = "heat = 120";
        let span = Span::of_part(line, 4, "other");
        assert_eq!(span, Span::new(4, 14));
    }
}
