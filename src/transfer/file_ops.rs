//! Module `file_ops`
//!
//! Local-file probes and the chunked byte loops that move data between
//! the data connection and local storage.

use log::{debug, error};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{FtpClientError, Result, TransferError};

/// Creates or truncates the download destination.
///
/// Called only once the server has agreed to send, so a rejected
/// transfer never touches the local file.
pub async fn probe_destination(path: &Path) -> Result<File> {
    File::create(path).await.map_err(|e| {
        error!("Error opening local file {}: {}", path.display(), e);
        FtpClientError::local_io(path, e)
    })
}

/// Opens the upload source and checks that it is a regular file.
pub async fn probe_source(path: &Path) -> Result<File> {
    let file = File::open(path)
        .await
        .map_err(|e| FtpClientError::local_io(path, e))?;
    let metadata = file
        .metadata()
        .await
        .map_err(|e| FtpClientError::local_io(path, e))?;
    if !metadata.is_file() {
        return Err(FtpClientError::local_io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    Ok(file)
}

/// Where inbound bytes go
pub enum TransferSink {
    File { path: PathBuf, file: File },
    Buffer(Vec<u8>),
}

impl TransferSink {
    pub fn file(path: &Path, file: File) -> Self {
        TransferSink::File {
            path: path.to_path_buf(),
            file,
        }
    }

    pub fn buffer() -> Self {
        TransferSink::Buffer(Vec::new())
    }

    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        match self {
            TransferSink::File { path, file } => file
                .write_all(chunk)
                .await
                .map_err(|e| FtpClientError::local_io(path.as_path(), e)),
            TransferSink::Buffer(buf) => {
                buf.extend_from_slice(chunk);
                Ok(())
            }
        }
    }

    async fn finish(&mut self) -> Result<()> {
        match self {
            TransferSink::File { path, file } => file
                .flush()
                .await
                .map_err(|e| FtpClientError::local_io(path.as_path(), e)),
            TransferSink::Buffer(_) => Ok(()),
        }
    }

    /// The collected bytes for an in-memory sink
    pub fn into_buffer(self) -> Option<Vec<u8>> {
        match self {
            TransferSink::Buffer(buf) => Some(buf),
            TransferSink::File { .. } => None,
        }
    }
}

/// Reads the data connection until the peer closes it, writing every chunk
/// to `sink`. Returns the number of bytes received.
pub async fn receive_into<R>(data: &mut R, sink: &mut TransferSink, chunk_size: usize) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; chunk_size];
    let mut total_bytes_received = 0u64;

    loop {
        let n = data
            .read(&mut buffer)
            .await
            .map_err(TransferError::DataStream)?;
        if n == 0 {
            break;
        }
        sink.write_chunk(&buffer[..n]).await?;
        total_bytes_received += n as u64;
    }

    sink.finish().await?;
    debug!("Data connection drained: {total_bytes_received} bytes");
    Ok(total_bytes_received)
}

/// Streams `file` to the data connection until local EOF, then shuts down
/// the write side so the server sees end of data.
pub async fn send_from<W>(file: &mut File, path: &Path, data: &mut W, chunk_size: usize) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; chunk_size];
    let mut total_bytes_sent = 0u64;

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .map_err(|e| FtpClientError::local_io(path, e))?;
        if n == 0 {
            break;
        }
        data.write_all(&buffer[..n])
            .await
            .map_err(TransferError::DataStream)?;
        total_bytes_sent += n as u64;
    }

    data.shutdown().await.map_err(TransferError::DataStream)?;
    debug!("Sent {total_bytes_sent} bytes from {}", path.display());
    Ok(total_bytes_sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receive_into_buffer_in_chunks() {
        let payload: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let mut data = &payload[..];
        let mut sink = TransferSink::buffer();

        let bytes = receive_into(&mut data, &mut sink, 1024).await.unwrap();
        assert_eq!(bytes, 5000);
        assert_eq!(sink.into_buffer().unwrap(), payload);
    }

    #[tokio::test]
    async fn receive_into_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let file = probe_destination(&path).await.unwrap();
        let mut sink = TransferSink::file(&path, file);

        let mut data = &b"hello world"[..];
        let bytes = receive_into(&mut data, &mut sink, 4).await.unwrap();
        drop(sink);

        assert_eq!(bytes, 11);
        assert_eq!(std::fs::read(&path).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn send_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.bin");
        std::fs::write(&path, vec![7u8; 3000]).unwrap();

        let mut file = probe_source(&path).await.unwrap();
        let mut out: Vec<u8> = Vec::new();
        let bytes = send_from(&mut file, &path, &mut out, 1024).await.unwrap();

        assert_eq!(bytes, 3000);
        assert_eq!(out, vec![7u8; 3000]);
    }

    #[tokio::test]
    async fn probe_source_rejects_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            probe_source(&dir.path().join("missing")).await,
            Err(FtpClientError::LocalIo { .. })
        ));
        assert!(matches!(
            probe_source(dir.path()).await,
            Err(FtpClientError::LocalIo { .. })
        ));
    }

    #[tokio::test]
    async fn probe_destination_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/file.txt");
        assert!(matches!(
            probe_destination(&path).await,
            Err(FtpClientError::LocalIo { .. })
        ));
    }
}
