use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Direction of a file session, normalized from a mode string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    Read,
    Write,
    Append,
}

impl OpenMode {
    /// Normalizes a mode string by its first character (`r`, `w` or `a`).
    ///
    /// Trailing modifiers such as `b` or `+` are accepted and ignored; streams
    /// are always opened in binary-safe fashion.
    pub fn parse(mode: &str) -> Option<Self> {
        match mode.chars().next() {
            Some('r') => Some(OpenMode::Read),
            Some('w') => Some(OpenMode::Write),
            Some('a') => Some(OpenMode::Append),
            _ => None,
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, OpenMode::Read)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            OpenMode::Read => "r",
            OpenMode::Write => "w",
            OpenMode::Append => "a",
        };
        write!(f, "{}", code)
    }
}

/// A readable stream that can also jump over bytes it does not need.
pub trait ItemSource: BufRead {
    fn skip_bytes(&mut self, count: u64) -> io::Result<()>;
}

impl<T: AsRef<[u8]>> ItemSource for Cursor<T> {
    fn skip_bytes(&mut self, count: u64) -> io::Result<()> {
        self.seek(SeekFrom::Current(signed_offset(count)?))?;
        Ok(())
    }
}

fn signed_offset(count: u64) -> io::Result<i64> {
    i64::try_from(count).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("skip of {count} bytes exceeds the seekable range"),
        )
    })
}

fn unsupported(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, what.to_string())
}

/// The stream resource exclusively owned by one open handle.
pub enum Stream {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
    Stdin(BufReader<io::Stdin>),
    Stdout(io::Stdout),
}

impl Stream {
    pub fn open_file(path: &Path, mode: OpenMode) -> io::Result<Self> {
        match mode {
            OpenMode::Read => Ok(Stream::Reader(BufReader::new(File::open(path)?))),
            OpenMode::Write => Ok(Stream::Writer(BufWriter::new(File::create(path)?))),
            OpenMode::Append => {
                let mut file = OpenOptions::new().append(true).create(true).open(path)?;
                file.seek(SeekFrom::End(0))?;
                Ok(Stream::Writer(BufWriter::new(file)))
            }
        }
    }

    pub fn stdio(mode: OpenMode) -> Self {
        match mode {
            OpenMode::Read => Stream::Stdin(BufReader::new(io::stdin())),
            OpenMode::Write | OpenMode::Append => Stream::Stdout(io::stdout()),
        }
    }

    pub fn is_stdio(&self) -> bool {
        matches!(self, Stream::Stdin(_) | Stream::Stdout(_))
    }

    /// Current byte offset. Buffered output is written out first.
    pub fn position(&mut self) -> io::Result<u64> {
        match self {
            Stream::Reader(reader) => reader.stream_position(),
            Stream::Writer(writer) => {
                writer.flush()?;
                writer.get_mut().stream_position()
            }
            Stream::Stdin(_) | Stream::Stdout(_) => Err(unsupported("standard streams have no position")),
        }
    }

    pub fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        match self {
            Stream::Reader(reader) => reader.seek(SeekFrom::Start(offset)).map(|_| ()),
            Stream::Writer(writer) => writer.seek(SeekFrom::Start(offset)).map(|_| ()),
            Stream::Stdin(_) | Stream::Stdout(_) => Err(unsupported("standard streams cannot seek")),
        }
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stream::Reader(_) => "Reader",
            Stream::Writer(_) => "Writer",
            Stream::Stdin(_) => "Stdin",
            Stream::Stdout(_) => "Stdout",
        };
        f.debug_tuple("Stream").field(&name).finish()
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Reader(reader) => reader.read(buf),
            Stream::Stdin(stdin) => stdin.read(buf),
            Stream::Writer(_) | Stream::Stdout(_) => Err(unsupported("stream is open for writing")),
        }
    }
}

impl BufRead for Stream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Stream::Reader(reader) => reader.fill_buf(),
            Stream::Stdin(stdin) => stdin.fill_buf(),
            Stream::Writer(_) | Stream::Stdout(_) => Err(unsupported("stream is open for writing")),
        }
    }

    fn consume(&mut self, amount: usize) {
        match self {
            Stream::Reader(reader) => reader.consume(amount),
            Stream::Stdin(stdin) => stdin.consume(amount),
            Stream::Writer(_) | Stream::Stdout(_) => {}
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Writer(writer) => writer.write(buf),
            Stream::Stdout(stdout) => stdout.write(buf),
            Stream::Reader(_) | Stream::Stdin(_) => Err(unsupported("stream is open for reading")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Writer(writer) => writer.flush(),
            Stream::Stdout(stdout) => stdout.flush(),
            Stream::Reader(_) | Stream::Stdin(_) => Ok(()),
        }
    }
}

impl ItemSource for Stream {
    fn skip_bytes(&mut self, count: u64) -> io::Result<()> {
        match self {
            Stream::Reader(reader) => reader.seek_relative(signed_offset(count)?),
            Stream::Stdin(stdin) => {
                let copied = io::copy(&mut stdin.by_ref().take(count), &mut io::sink())?;
                if copied < count {
                    return Err(io::ErrorKind::UnexpectedEof.into());
                }
                Ok(())
            }
            Stream::Writer(_) | Stream::Stdout(_) => Err(unsupported("stream is open for writing")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_normalizes_on_first_character() {
        assert_eq!(OpenMode::parse("r"), Some(OpenMode::Read));
        assert_eq!(OpenMode::parse("rb"), Some(OpenMode::Read));
        assert_eq!(OpenMode::parse("w+"), Some(OpenMode::Write));
        assert_eq!(OpenMode::parse("a"), Some(OpenMode::Append));
        assert_eq!(OpenMode::parse("x"), None);
        assert_eq!(OpenMode::parse(""), None);
    }

    #[test]
    fn writer_position_includes_buffered_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.dat");
        let mut stream = Stream::open_file(&path, OpenMode::Write).unwrap();
        stream.write_all(&[0u8; 37]).unwrap();
        assert_eq!(stream.position().unwrap(), 37);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 37);
    }

    #[test]
    fn append_starts_at_end_of_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("md.log");
        std::fs::write(&path, b"0123456789").unwrap();
        let mut stream = Stream::open_file(&path, OpenMode::Append).unwrap();
        assert_eq!(stream.position().unwrap(), 10);
        stream.write_all(b"ab").unwrap();
        assert_eq!(stream.position().unwrap(), 12);
    }

    #[test]
    fn reader_skip_moves_the_cursor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.dat");
        std::fs::write(&path, [1u8, 2, 3, 4, 5, 6]).unwrap();
        let mut stream = Stream::open_file(&path, OpenMode::Read).unwrap();
        stream.skip_bytes(4).unwrap();
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![5, 6]);
    }

    #[test]
    fn cursor_skip_is_relative() {
        let mut cursor = Cursor::new(vec![9u8, 8, 7]);
        cursor.skip_bytes(2).unwrap();
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn reading_from_a_writer_is_rejected() {
        let dir = tempdir().unwrap();
        let mut stream = Stream::open_file(&dir.path().join("w.dat"), OpenMode::Write).unwrap();
        let mut buf = [0u8; 1];
        let err = stream.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
