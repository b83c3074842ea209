use common::{
    error::AppError,
    storage::workspace::{JobId, WorkspaceRoot},
    utils::content_type::validate_audio_content_type,
};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::info;

use crate::job::{sanitized_extension, TranscodeJob};

/// Stores an upload as the `original` artifact of a fresh job.
///
/// The declared content type is checked before anything touches the disk; the
/// bytes themselves are not inspected.
pub async fn ingest<R>(
    workspaces: &WorkspaceRoot,
    mut reader: R,
    declared_filename: &str,
    declared_content_type: Option<&str>,
) -> Result<TranscodeJob, AppError>
where
    R: AsyncRead + Unpin,
{
    validate_audio_content_type(declared_content_type)?;

    let id = JobId::new();
    let workspace = workspaces.workspace_for(&id).await?;
    let job = TranscodeJob::new(
        id,
        workspace,
        declared_filename.to_string(),
        sanitized_extension(declared_filename),
    );

    match write_original(&job, &mut reader).await {
        Ok(bytes) => {
            info!(job_id = %job.id, file_name = %job.file_name, bytes, "upload stored");
            Ok(job)
        }
        Err(err) => {
            // a partial original is never usable
            workspaces.remove(&job.id).await;
            Err(err)
        }
    }
}

async fn write_original<R>(job: &TranscodeJob, reader: &mut R) -> Result<u64, AppError>
where
    R: AsyncRead + Unpin,
{
    let path = job.original_path();
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| AppError::Storage(format!("creating {}: {e}", path.display())))?;
    let bytes = tokio::io::copy(reader, &mut file)
        .await
        .map_err(|e| AppError::Storage(format!("writing {}: {e}", path.display())))?;
    file.flush()
        .await
        .map_err(|e| AppError::Storage(format!("flushing {}: {e}", path.display())))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_original_with_declared_extension() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let workspaces = WorkspaceRoot::new(tmp.path());

        let job = ingest(&workspaces, &b"audio bytes"[..], "voice.MP3", Some("audio/mp3"))
            .await
            .expect("ingest");

        assert_eq!(job.original_extension, "mp3");
        assert_eq!(job.file_name, "voice.MP3");
        assert_eq!(job.workspace, workspaces.dir_for(&job.id));
        assert_eq!(
            std::fs::read(job.original_path()).expect("read"),
            b"audio bytes"
        );
    }

    #[tokio::test]
    async fn rejected_type_writes_nothing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let workspaces = WorkspaceRoot::new(tmp.path().join("uploader"));

        let result = ingest(&workspaces, &b"hello"[..], "notes.txt", Some("text/plain")).await;

        assert!(matches!(result, Err(AppError::InvalidContentType(_))));
        assert!(!workspaces.path().exists());
    }

    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::other("connection reset")))
        }
    }

    #[tokio::test]
    async fn failed_write_is_a_storage_error_and_leaves_no_workspace() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let workspaces = WorkspaceRoot::new(tmp.path());

        let result = ingest(&workspaces, BrokenReader, "a.wav", Some("audio/wav")).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(std::fs::read_dir(tmp.path()).expect("root").count(), 0);
    }

    #[tokio::test]
    async fn octet_stream_fallback_is_accepted() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let workspaces = WorkspaceRoot::new(tmp.path());

        let job = ingest(
            &workspaces,
            &b"x"[..],
            "recording.aac",
            Some("application/octet-stream"),
        )
        .await
        .expect("ingest");
        assert!(job.original_path().ends_with("original.aac"));
    }
}
