//! File-based document source: PDFs, text dumps, and PDF attachments of saved emails.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use mail_parser::{MessageParser, MimeHeaders};
use tracing::{debug, info};

use proscan_core::{DocumentSource, ProscanError, SourceDocument};

const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "eml", "txt"];

/// Collects documents from files, directories, and glob patterns.
pub struct FileSource {
    inputs: Vec<String>,
}

impl FileSource {
    pub fn new(inputs: Vec<String>) -> Self {
        Self { inputs }
    }

    /// Expand the inputs into a list of supported files.
    pub fn files(&self) -> proscan_core::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in &self.inputs {
            let path = Path::new(input);

            if path.is_dir() {
                let mut entries: Vec<PathBuf> = fs::read_dir(path)?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|p| p.is_file() && is_supported(p))
                    .collect();
                entries.sort();
                files.extend(entries);
            } else if path.is_file() {
                if !is_supported(path) {
                    return Err(ProscanError::Source(format!(
                        "Unsupported file format: {}",
                        path.display()
                    )));
                }
                files.push(path.to_path_buf());
            } else {
                let matches: Vec<PathBuf> = glob(input)
                    .map_err(|e| ProscanError::Source(format!("Invalid pattern {input}: {e}")))?
                    .filter_map(|r| r.ok())
                    .filter(|p| p.is_file() && is_supported(p))
                    .collect();

                if matches.is_empty() {
                    return Err(ProscanError::Source(format!(
                        "No matching files found for: {input}"
                    )));
                }
                files.extend(matches);
            }
        }

        Ok(files)
    }
}

impl DocumentSource for FileSource {
    fn documents(&mut self) -> proscan_core::Result<Vec<SourceDocument>> {
        let mut documents = Vec::new();

        for path in self.files()? {
            let name = display_name(&path);

            match extension(&path).as_str() {
                "pdf" => documents.push(SourceDocument::pdf(name, fs::read(&path)?)),
                "txt" => {
                    let text = fs::read_to_string(&path)?;
                    documents.push(SourceDocument::text(name, &text));
                }
                "eml" => {
                    let attachments = pdf_attachments(&name, &fs::read(&path)?)?;
                    debug!("{} PDF attachments in {}", attachments.len(), path.display());
                    documents.extend(attachments);
                }
                _ => {}
            }
        }

        info!("Found {} documents to process", documents.len());
        Ok(documents)
    }
}

/// Pull every PDF attachment out of an RFC 5322 message.
pub fn pdf_attachments(name: &str, raw: &[u8]) -> proscan_core::Result<Vec<SourceDocument>> {
    let message = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| ProscanError::Source(format!("Failed to parse email message {name}")))?;

    let documents = message
        .attachments()
        .enumerate()
        .filter_map(|(i, part)| {
            let file_name = part.attachment_name().map(str::to_string);

            let is_pdf_name = file_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().ends_with(".pdf"));
            let is_pdf_type = part.content_type().is_some_and(|ct| {
                ct.ctype().eq_ignore_ascii_case("application")
                    && ct.subtype().is_some_and(|s| s.eq_ignore_ascii_case("pdf"))
            });

            if !(is_pdf_name || is_pdf_type) {
                return None;
            }

            let file_name = file_name.unwrap_or_else(|| format!("attachment-{}.pdf", i + 1));
            Some(SourceDocument::pdf(
                format!("{name}/{file_name}"),
                part.contents().to_vec(),
            ))
        })
        .collect();

    Ok(documents)
}

fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension(path).as_str())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
