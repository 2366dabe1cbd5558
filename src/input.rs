//! Input resolution for workflow runs.
//!
//! Validates CLI-supplied artifacts before any directory is created or any
//! network call is made, and normalizes them into the variables a pipeline's
//! prompt templates consume. PDF text extraction is delegated to a
//! document-parsing library behind [`ProfileExtractor`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::cli::JobApplicationArgs;
use crate::pipeline::is_markdown_file;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    #[error("invalid input file {path}: {reason}")]
    InvalidInputFile { path: PathBuf, reason: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("failed to extract text from {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },
}

/// Extracts plain text from a profile document.
///
/// The extraction itself is an opaque capability of a parsing library; this
/// crate only consumes the returned text.
pub trait ProfileExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String, InputError>;
}

/// PDF-backed extractor for LinkedIn profile exports.
pub struct PdfProfileExtractor;

impl ProfileExtractor for PdfProfileExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, InputError> {
        pdf_extract::extract_text(path).map_err(|e| InputError::Extraction {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Validated inputs for the job application workflow.
#[derive(Debug, Clone)]
pub struct JobApplicationInputs {
    pub job_posting_url: Url,
    pub github_url: Url,
    pub personal_writeup: String,
    /// Resume Markdown or extracted LinkedIn profile text.
    pub profile_text: String,
}

/// Validate the job application arguments and resolve the profile text.
///
/// Exactly one of `--resume` (Markdown) and `--linkedin-pdf` must be given.
/// Nothing is written anywhere by this function; callers create the output
/// directory only after it succeeds.
pub fn resolve_job_application(
    args: &JobApplicationArgs,
    extractor: &dyn ProfileExtractor,
) -> Result<JobApplicationInputs, InputError> {
    let job_posting_url = require_url("--job-url", args.job_url.as_deref())?;
    let github_url = require_url("--github-url", args.github_url.as_deref())?;
    let personal_writeup = args
        .personal_writeup
        .clone()
        .ok_or_else(|| InputError::MissingArgument("--personal-writeup".to_string()))?;

    let profile_text = match (&args.resume, &args.linkedin_pdf) {
        (Some(_), Some(_)) => {
            return Err(InputError::InvalidArgument {
                field: "--resume".to_string(),
                reason: "cannot be combined with --linkedin-pdf".to_string(),
            })
        }
        (Some(resume), None) => read_resume(resume)?,
        (None, Some(pdf)) => extract_profile(pdf, extractor)?,
        (None, None) => return Err(InputError::MissingArgument("--resume".to_string())),
    };

    Ok(JobApplicationInputs {
        job_posting_url,
        github_url,
        personal_writeup,
        profile_text,
    })
}

fn require_url(field: &str, value: Option<&str>) -> Result<Url, InputError> {
    let raw = value.ok_or_else(|| InputError::MissingArgument(field.to_string()))?;
    let url = Url::parse(raw).map_err(|e| InputError::InvalidArgument {
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(InputError::InvalidArgument {
            field: field.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn read_resume(path: &Path) -> Result<String, InputError> {
    if !path.exists() {
        return Err(InputError::InvalidInputFile {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        });
    }
    if !is_markdown_file(path) {
        return Err(InputError::InvalidInputFile {
            path: path.to_path_buf(),
            reason: "resume must be Markdown (.md, .mdx, or .markdown)".to_string(),
        });
    }
    info!(resume = %path.display(), "reading resume");
    std::fs::read_to_string(path).map_err(|e| InputError::InvalidInputFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn extract_profile(path: &Path, extractor: &dyn ProfileExtractor) -> Result<String, InputError> {
    if !path.exists() {
        return Err(InputError::InvalidInputFile {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        });
    }
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(InputError::InvalidInputFile {
            path: path.to_path_buf(),
            reason: "profile must be a .pdf file".to_string(),
        });
    }
    info!(pdf = %path.display(), "extracting LinkedIn profile text");
    let text = extractor.extract_text(path)?;
    if text.trim().is_empty() {
        return Err(InputError::Extraction {
            path: path.to_path_buf(),
            reason: "document contains no extractable text".to_string(),
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Extractor stub for tests; the real one shells into a PDF library.
    struct FixedExtractor(&'static str);

    impl ProfileExtractor for FixedExtractor {
        fn extract_text(&self, _path: &Path) -> Result<String, InputError> {
            Ok(self.0.to_string())
        }
    }

    fn args() -> JobApplicationArgs {
        JobApplicationArgs {
            resume: None,
            linkedin_pdf: None,
            job_url: Some("https://example.com/job/123".to_string()),
            github_url: Some("https://github.com/someone".to_string()),
            personal_writeup: Some("An accomplished engineer.".to_string()),
            output_dir: PathBuf::from("output"),
            config_dir: PathBuf::from("config/job_application"),
            model: None,
        }
    }

    #[test]
    fn missing_job_url_names_the_field() {
        let mut a = args();
        a.job_url = None;
        a.resume = Some(PathBuf::from("resume.md"));
        let err = resolve_job_application(&a, &FixedExtractor("")).unwrap_err();
        assert!(matches!(err, InputError::MissingArgument(ref f) if f == "--job-url"));
    }

    #[test]
    fn missing_profile_source_names_resume() {
        let err = resolve_job_application(&args(), &FixedExtractor("")).unwrap_err();
        assert!(matches!(err, InputError::MissingArgument(ref f) if f == "--resume"));
    }

    #[test]
    fn resume_and_pdf_together_are_rejected() {
        let mut a = args();
        a.resume = Some(PathBuf::from("resume.md"));
        a.linkedin_pdf = Some(PathBuf::from("profile.pdf"));
        let err = resolve_job_application(&a, &FixedExtractor("")).unwrap_err();
        assert!(matches!(err, InputError::InvalidArgument { .. }));
    }

    #[test]
    fn non_http_url_is_invalid() {
        let mut a = args();
        a.job_url = Some("ftp://example.com/job".to_string());
        a.resume = Some(PathBuf::from("resume.md"));
        let err = resolve_job_application(&a, &FixedExtractor("")).unwrap_err();
        assert!(matches!(err, InputError::InvalidArgument { ref field, .. } if field == "--job-url"));
    }

    #[test]
    fn missing_resume_file_is_invalid_input() {
        let mut a = args();
        a.resume = Some(PathBuf::from("/nonexistent/resume.md"));
        let err = resolve_job_application(&a, &FixedExtractor("")).unwrap_err();
        assert!(matches!(err, InputError::InvalidInputFile { .. }));
    }

    #[test]
    fn resume_with_wrong_extension_is_invalid_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.docx");
        std::fs::write(&path, "not markdown").unwrap();

        let mut a = args();
        a.resume = Some(path);
        let err = resolve_job_application(&a, &FixedExtractor("")).unwrap_err();
        match err {
            InputError::InvalidInputFile { reason, .. } => {
                assert!(reason.contains("Markdown"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn markdown_resume_is_read_into_profile_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.md");
        std::fs::write(&path, "# Jane Doe\nRust engineer.").unwrap();

        let mut a = args();
        a.resume = Some(path);
        let inputs = resolve_job_application(&a, &FixedExtractor("")).unwrap();
        assert!(inputs.profile_text.contains("Jane Doe"));
        assert_eq!(inputs.job_posting_url.as_str(), "https://example.com/job/123");
    }

    #[test]
    fn missing_pdf_is_invalid_input() {
        let mut a = args();
        a.linkedin_pdf = Some(PathBuf::from("missing.pdf"));
        let err = resolve_job_application(&a, &FixedExtractor("text")).unwrap_err();
        assert!(matches!(err, InputError::InvalidInputFile { ref path, .. } if path.ends_with("missing.pdf")));
    }

    #[test]
    fn pdf_profile_goes_through_the_extractor() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.pdf");
        std::fs::write(&path, b"%PDF-1.4 stub").unwrap();

        let mut a = args();
        a.linkedin_pdf = Some(path);
        let inputs =
            resolve_job_application(&a, &FixedExtractor("Jane Doe\nExperience: Rust")).unwrap();
        assert!(inputs.profile_text.contains("Experience: Rust"));
    }

    #[test]
    fn empty_extraction_is_an_extraction_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.pdf");
        std::fs::write(&path, b"%PDF-1.4 stub").unwrap();

        let mut a = args();
        a.linkedin_pdf = Some(path);
        let err = resolve_job_application(&a, &FixedExtractor("   \n")).unwrap_err();
        assert!(matches!(err, InputError::Extraction { .. }));
    }
}
