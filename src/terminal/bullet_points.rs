use indicatif::MultiProgress;

const INDENT_SIZE: usize = 2;

/// Prints nested bullet point lists.
pub struct BulletPointPrinter<W: LineWriter + Clone> {
    writer: W,
    nesting: usize,
}

impl<W: LineWriter + Clone> BulletPointPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, nesting: 0 }
    }

    pub fn print_item(&self, message: impl std::fmt::Display) {
        let indent = " ".repeat(self.nesting * INDENT_SIZE);
        self.writer.write_line(&format!("{indent}• {message}"));
    }

    pub fn indent(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            nesting: self.nesting + 1,
        }
    }
}

impl BulletPointPrinter<StdoutLineWriter> {
    pub fn new_stdout() -> Self {
        Self::new(StdoutLineWriter)
    }
}

impl<'a> BulletPointPrinter<MultiProgressLineWriter<'a>> {
    /// Prints above the progress bars of `mp` instead of through them.
    pub fn new_multiprogress(mp: &'a MultiProgress) -> Self {
        Self::new(MultiProgressLineWriter { mp })
    }
}

pub trait LineWriter {
    fn write_line(&self, line: &str);
}

#[derive(Clone, Copy)]
pub struct StdoutLineWriter;

impl LineWriter for StdoutLineWriter {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }
}

#[derive(Clone, Copy)]
pub struct MultiProgressLineWriter<'a> {
    mp: &'a MultiProgress,
}

impl LineWriter for MultiProgressLineWriter<'_> {
    fn write_line(&self, line: &str) {
        if let Err(err) = self.mp.println(line) {
            log::warn!("Couldn't print {line:?}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingLineWriter(Rc<RefCell<Vec<String>>>);

    impl LineWriter for RecordingLineWriter {
        fn write_line(&self, line: &str) {
            self.0.borrow_mut().push(line.to_string());
        }
    }

    #[test]
    fn nested_items() {
        let writer = RecordingLineWriter::default();
        let printer = BulletPointPrinter::new(writer.clone());
        printer.print_item("catalog");
        let nested = printer.indent();
        nested.print_item("period 1");
        nested.indent().print_item(42);
        printer.print_item("done");

        assert_eq!(
            vec!["• catalog", "  • period 1", "    • 42", "• done"],
            *writer.0.borrow()
        );
    }
}
