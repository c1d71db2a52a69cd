use std::io;

/// Destination for formatted log entries.
///
/// The hook calls `write_entry` exactly once per delivered entry with the
/// complete encoded document. Every [`io::Write`] is a sink, so byte
/// buffers, files, stdout and TCP streams can be handed to the hook as-is.
pub trait Sink {
    /// Deliver one encoded entry.
    ///
    /// **Returns**
    /// - `Ok(())` if the whole payload was accepted.
    /// - `Err(..)` if the destination failed. The hook reports this to its
    ///   caller unchanged and does not retry.
    fn write_entry(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<W: io::Write + ?Sized> Sink for W {
    fn write_entry(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)?;
        self.flush()
    }
}
