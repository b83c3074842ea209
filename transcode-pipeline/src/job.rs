use std::path::{Path, PathBuf};

use common::{error::AppError, storage::workspace::JobId};

use crate::probe::AudioArtifact;

pub const ORIGINAL_STEM: &str = "original";
pub const CONVERTED_STEM: &str = "converted";
pub const MANIFEST_FILE: &str = "list.m3u8";
pub const SEGMENT_PREFIX: &str = "segment";
pub const SEGMENT_EXTENSION: &str = "ts";

/// One upload and the files its pipeline produces, all inside `workspace`.
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    pub id: JobId,
    pub workspace: PathBuf,
    /// Filename as declared by the client.
    pub file_name: String,
    /// Sanitized extension of `file_name`; empty when it had none.
    pub original_extension: String,
    pub original: AudioArtifact,
}

impl TranscodeJob {
    pub fn new(id: JobId, workspace: PathBuf, file_name: String, original_extension: String) -> Self {
        let original = AudioArtifact::new(file_in(&workspace, ORIGINAL_STEM, &original_extension));
        Self {
            id,
            workspace,
            file_name,
            original_extension,
            original,
        }
    }

    pub fn original_path(&self) -> &Path {
        self.original.path()
    }

    pub fn converted_path(&self, extension: &str) -> PathBuf {
        file_in(&self.workspace, CONVERTED_STEM, extension)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.workspace.join(MANIFEST_FILE)
    }

    pub fn segment_pattern(&self) -> PathBuf {
        self.workspace
            .join(format!("{SEGMENT_PREFIX}%03d.{SEGMENT_EXTENSION}"))
    }

    /// Segment files currently in the workspace, in playback order.
    pub async fn segments(&self) -> Result<Vec<AudioArtifact>, AppError> {
        let mut entries = tokio::fs::read_dir(&self.workspace).await.map_err(|e| {
            AppError::Storage(format!("listing {}: {e}", self.workspace.display()))
        })?;

        let mut indexed = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Storage(format!("listing {}: {e}", self.workspace.display())))?
        {
            let name = entry.file_name();
            if let Some(index) = name.to_str().and_then(segment_index) {
                indexed.push((index, entry.path()));
            }
        }

        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed
            .into_iter()
            .map(|(_, path)| AudioArtifact::new(path))
            .collect())
    }
}

/// Numeric index of a `segmentNNN.ts` file name.
pub fn segment_index(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(SEGMENT_PREFIX)?
        .strip_suffix(SEGMENT_EXTENSION)?
        .strip_suffix('.')
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))?
        .parse()
        .ok()
}

/// Extension of a client-declared filename, reduced to lowercase ASCII alphanumerics.
pub fn sanitized_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ext.chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect()
        })
        .unwrap_or_default()
}

fn file_in(workspace: &Path, stem: &str, extension: &str) -> PathBuf {
    if extension.is_empty() {
        workspace.join(stem)
    } else {
        workspace.join(format!("{stem}.{extension}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(sanitized_extension("song.MP3"), "mp3");
        assert_eq!(sanitized_extension("../../evil.m4a;rm"), "m4arm");
        assert_eq!(sanitized_extension("no_extension"), "");
        assert_eq!(sanitized_extension(""), "");
    }

    #[test]
    fn segment_names_parse_to_indices() {
        assert_eq!(segment_index("segment000.ts"), Some(0));
        assert_eq!(segment_index("segment012.ts"), Some(12));
        assert_eq!(segment_index("segment1000.ts"), Some(1000));
        assert_eq!(segment_index("segment.ts"), None);
        assert_eq!(segment_index("segment01a.ts"), None);
        assert_eq!(segment_index("list.m3u8"), None);
        assert_eq!(segment_index("segment001.tsx"), None);
    }

    #[test]
    fn paths_stay_inside_workspace() {
        let job = TranscodeJob::new(
            JobId::new(),
            PathBuf::from("/data/uploader/x"),
            "a.wav".into(),
            "wav".into(),
        );
        assert_eq!(job.original_path(), Path::new("/data/uploader/x/original.wav"));
        assert_eq!(job.converted_path("mp3"), Path::new("/data/uploader/x/converted.mp3"));
        assert_eq!(job.manifest_path(), Path::new("/data/uploader/x/list.m3u8"));
        assert_eq!(
            job.segment_pattern(),
            Path::new("/data/uploader/x/segment%03d.ts")
        );

        let bare = TranscodeJob::new(
            JobId::new(),
            PathBuf::from("/w"),
            "take".into(),
            String::new(),
        );
        assert_eq!(bare.original_path(), Path::new("/w/original"));
    }

    #[tokio::test]
    async fn segments_are_listed_in_numeric_order() {
        let tmp = tempfile::tempdir().expect("tempdir");
        for name in ["segment010.ts", "segment002.ts", "list.m3u8", "segment000.ts", "converted.mp3"] {
            std::fs::write(tmp.path().join(name), b"x").expect("write");
        }
        let job = TranscodeJob::new(
            JobId::new(),
            tmp.path().to_path_buf(),
            "a.mp3".into(),
            "mp3".into(),
        );

        let segments = job.segments().await.expect("list");
        let names: Vec<String> = segments
            .iter()
            .map(|s| s.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["segment000.ts", "segment002.ts", "segment010.ts"]);
    }
}
