//! File writer for the file output layer.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;

/// Shares one open log file between all events.
///
/// Events that cannot be written to the file go to stderr instead.
pub(crate) struct LogFileWriter {
    file: Mutex<File>,
}

impl LogFileWriter {
    /// Opens the configured file, creating missing parent directories.
    pub(crate) fn open(config: &FileConfig) -> Result<Self, LoggerError> {
        let io_error = |source| LoggerError::Io {
            path: config.path.display().to_string(),
            source,
        };

        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(config.append)
            .truncate(!config.append)
            .open(&config.path)
            .map_err(io_error)?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileGuard { file: &self.file }
    }
}

pub(crate) struct LogFileGuard<'a> {
    file: &'a Mutex<File>,
}

impl Write for LogFileGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if file.write_all(buf).is_err() {
            io::stderr().write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}
