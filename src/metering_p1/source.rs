use std::io::{self, BufRead};

/// Anything handing out terminated lines from the meter, blocking until one is there
pub trait LineSource {
    /// One raw line including its terminator, exactly as received.
    /// A closed source is reported as `UnexpectedEof`.
    fn read_line(&mut self) -> io::Result<Vec<u8>>;
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        (**self).read_line()
    }
}

/// Line source on top of a buffered reader (serial device node, file, socket)
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "meter connection closed"));
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reader_source_lines() {
        let mut source = ReaderSource::new(Cursor::new(b"/ISK5\r\n\r\n!".to_vec()));
        assert_eq!(source.read_line().unwrap(), b"/ISK5\r\n");
        assert_eq!(source.read_line().unwrap(), b"\r\n");
        assert_eq!(source.read_line().unwrap(), b"!");

        let err = source.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
