// Line input sources.
//
// The session reads lines through a stack of readers: stdin at the
// bottom, with an optional script file pushed on top by the CLI. When a
// file reader hits end of input it is popped and reading continues with
// the reader below; EOF on stdin ends the session.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

#[derive(Debug)]
pub enum FType {
    Stdin,
    Source(BufReader<File>),
}

#[derive(Debug)]
pub struct FileHandle {
    source: FType,
}

impl FileHandle {
    pub fn stdin() -> FileHandle {
        FileHandle {
            source: FType::Stdin,
        }
    }

    pub fn open(path: &str) -> io::Result<FileHandle> {
        let file = File::open(path)?;
        Ok(FileHandle {
            source: FType::Source(BufReader::new(file)),
        })
    }

    /// get_line returns the next line of text, or None at end of input.
    ///     In interactive mode this blocks until the user provides a
    ///     line; pending output is flushed first so prompts appear.
    pub fn get_line(&mut self) -> Option<String> {
        let mut line = String::new();
        let result = match self.source {
            FType::Stdin => {
                io::stdout().flush().ok();
                io::stdin().read_line(&mut line)
            }
            FType::Source(ref mut reader) => reader.read_line(&mut line),
        };
        match result {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(_) => None,
        }
    }
}
