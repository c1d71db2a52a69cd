use std::io;

/// A sink that simply drops all entries.
///
/// Useful for measuring the overhead of formatting and dispatch without
/// any I/O, and for tests that only care about level filtering.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl io::Write for NoopSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
