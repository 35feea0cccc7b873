//! PDF download: one identifier returns the PDF itself, several are bundled
//! into a zip archive.
//!
//! Failure handling differs between the two shapes. A single download that
//! fails is an error. In a batch, failed fetches are skipped and reported back
//! through [`DownloadPayload::Archive::skipped`]; only a batch where nothing
//! could be fetched is an error.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::sources::{Source, SourceError};

/// File name of the archive returned for batch downloads
pub const ARCHIVE_NAME: &str = "arxiv_papers.zip";

/// Errors raised while preparing a download
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("No paper IDs given")]
    NoPaperIds,

    #[error("Paper IDs must not be blank")]
    BlankPaperId,

    #[error("Malformed paper ID: {0}")]
    MalformedPaperId(String),

    #[error("Failed to download {paper_id}: {source}")]
    Fetch {
        paper_id: String,
        #[source]
        source: SourceError,
    },

    #[error("None of the {} requested papers could be downloaded", .skipped.len())]
    NothingDownloaded { skipped: Vec<String> },

    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to write archive: {0}")]
    Io(#[from] std::io::Error),
}

/// What the download endpoint sends back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadPayload {
    /// A single PDF
    Pdf { filename: String, bytes: Vec<u8> },

    /// A zip archive of every PDF that could be fetched
    Archive {
        filename: String,
        bytes: Vec<u8>,
        /// Identifiers whose fetch failed
        skipped: Vec<String>,
    },
}

impl DownloadPayload {
    /// MIME type of the payload
    pub fn content_type(&self) -> &'static str {
        match self {
            DownloadPayload::Pdf { .. } => "application/pdf",
            DownloadPayload::Archive { .. } => "application/zip",
        }
    }

    /// Attachment file name
    pub fn filename(&self) -> &str {
        match self {
            DownloadPayload::Pdf { filename, .. } | DownloadPayload::Archive { filename, .. } => {
                filename
            }
        }
    }
}

/// File name used for a paper's PDF, both as attachment and inside archives.
///
/// Old-style identifiers (`math.GT/0104020`) contain a slash, which is
/// replaced so the name stays a single path component.
pub fn pdf_filename(paper_id: &str) -> String {
    format!("{}.pdf", paper_id.replace('/', "_"))
}

/// Characters that cannot appear in `Content-Disposition` or `X-Skipped-Papers`
const HEADER_UNSAFE: [char; 2] = ['"', ','];

/// Trim identifiers, reject blanks and header-unsafe ones, and drop repeats
/// (first occurrence wins)
pub fn normalize_ids(paper_ids: &[String]) -> Result<Vec<String>, DownloadError> {
    if paper_ids.is_empty() {
        return Err(DownloadError::NoPaperIds);
    }

    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(paper_ids.len());
    for id in paper_ids {
        let id = id.trim();
        if id.is_empty() {
            return Err(DownloadError::BlankPaperId);
        }
        if id.contains(HEADER_UNSAFE) {
            return Err(DownloadError::MalformedPaperId(id.to_string()));
        }
        if seen.insert(id.to_string()) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Fetch the requested papers from `source`.
///
/// Exactly one identifier yields [`DownloadPayload::Pdf`]; more than one
/// yields [`DownloadPayload::Archive`], even if repeats collapse them to one.
/// Batch fetches run sequentially in request order.
pub async fn download_papers(
    source: &dyn Source,
    paper_ids: &[String],
) -> Result<DownloadPayload, DownloadError> {
    let ids = normalize_ids(paper_ids)?;

    if paper_ids.len() == 1 {
        let paper_id = &ids[0];
        let bytes = source
            .fetch_pdf(paper_id)
            .await
            .map_err(|e| DownloadError::Fetch {
                paper_id: paper_id.clone(),
                source: e,
            })?;
        tracing::info!(source = source.name(), %paper_id, size = bytes.len(), "Downloaded PDF");
        return Ok(DownloadPayload::Pdf {
            filename: pdf_filename(paper_id),
            bytes,
        });
    }

    let mut files = Vec::with_capacity(ids.len());
    let mut skipped = Vec::new();
    for paper_id in ids {
        match source.fetch_pdf(&paper_id).await {
            Ok(bytes) => files.push((paper_id, bytes)),
            Err(e) => {
                tracing::warn!(%paper_id, error = %e, "Skipping PDF in batch download");
                skipped.push(paper_id);
            }
        }
    }

    if files.is_empty() {
        return Err(DownloadError::NothingDownloaded { skipped });
    }

    let bytes = build_archive(&files)?;
    tracing::info!(
        source = source.name(),
        included = files.len(),
        skipped = skipped.len(),
        size = bytes.len(),
        "Built PDF archive"
    );

    Ok(DownloadPayload::Archive {
        filename: ARCHIVE_NAME.to_string(),
        bytes,
        skipped,
    })
}

/// Pack `(paper_id, pdf bytes)` pairs into an in-memory zip archive.
///
/// PDFs are already compressed, so entries are stored as-is.
pub fn build_archive(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>, DownloadError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (paper_id, bytes) in files {
        zip.start_file(pdf_filename(paper_id), options)?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockSource;
    use std::io::Read;
    use zip::ZipArchive;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn archive_names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_pdf_filename() {
        assert_eq!(pdf_filename("2301.12345"), "2301.12345.pdf");
        assert_eq!(pdf_filename("math.GT/0104020"), "math.GT_0104020.pdf");
    }

    #[test]
    fn test_normalize_ids() {
        assert!(matches!(normalize_ids(&[]), Err(DownloadError::NoPaperIds)));
        assert!(matches!(
            normalize_ids(&ids(&["2301.1", "  "])),
            Err(DownloadError::BlankPaperId)
        ));
        assert!(matches!(
            normalize_ids(&ids(&["2301.1", "2301.2\""])),
            Err(DownloadError::MalformedPaperId(_))
        ));
        assert!(matches!(
            normalize_ids(&ids(&["2301.1,2301.2"])),
            Err(DownloadError::MalformedPaperId(_))
        ));
        assert_eq!(
            normalize_ids(&ids(&[" b ", "a", "b"])).unwrap(),
            ids(&["b", "a"])
        );
    }

    #[test]
    fn test_build_archive_contents() {
        let files = vec![
            ("1111.1111".to_string(), b"%PDF-one".to_vec()),
            ("2222.2222".to_string(), b"%PDF-two".to_vec()),
        ];
        let bytes = build_archive(&files).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = Vec::new();
        archive
            .by_name("2222.2222.pdf")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"%PDF-two");
    }

    #[tokio::test]
    async fn test_single_download() {
        let source = MockSource::new();
        source.add_pdf("2301.12345", b"%PDF-1.4".to_vec());

        let payload = download_papers(&source, &ids(&["2301.12345"])).await.unwrap();
        assert_eq!(
            payload,
            DownloadPayload::Pdf {
                filename: "2301.12345.pdf".to_string(),
                bytes: b"%PDF-1.4".to_vec(),
            }
        );
        assert_eq!(payload.content_type(), "application/pdf");
    }

    #[tokio::test]
    async fn test_single_download_failure_is_error() {
        let source = MockSource::new();
        let result = download_papers(&source, &ids(&["0000.00000"])).await;
        assert!(matches!(result, Err(DownloadError::Fetch { .. })));
    }

    #[tokio::test]
    async fn test_batch_skips_failures() {
        let source = MockSource::new();
        source.add_pdf("1111.1111", b"%PDF-one".to_vec());

        let payload = download_papers(&source, &ids(&["1111.1111", "0000.00000"]))
            .await
            .unwrap();

        match payload {
            DownloadPayload::Archive {
                filename,
                bytes,
                skipped,
            } => {
                assert_eq!(filename, ARCHIVE_NAME);
                assert_eq!(skipped, ids(&["0000.00000"]));
                assert_eq!(archive_names(&bytes), vec!["1111.1111.pdf".to_string()]);
            }
            other => panic!("expected archive, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_batch_with_repeats_is_still_archive() {
        let source = MockSource::new();
        source.add_pdf("1111.1111", b"%PDF-one".to_vec());

        let payload = download_papers(&source, &ids(&["1111.1111", "1111.1111"]))
            .await
            .unwrap();
        assert_eq!(payload.content_type(), "application/zip");
        assert_eq!(payload.filename(), ARCHIVE_NAME);
    }

    #[tokio::test]
    async fn test_batch_all_failed() {
        let source = MockSource::new();
        let result = download_papers(&source, &ids(&["a", "b"])).await;

        match result {
            Err(DownloadError::NothingDownloaded { skipped }) => {
                assert_eq!(skipped, ids(&["a", "b"]))
            }
            other => panic!("expected NothingDownloaded, got {:?}", other),
        }
    }
}
