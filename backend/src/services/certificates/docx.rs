//! DOCX certificate rendering by placeholder substitution.
//!
//! Only `word/document.xml` is rewritten; every other zip entry is copied
//! as-is. Each `<w:p>` paragraph (body and table cells alike) is resolved in
//! two passes: tokens contained in a single `<w:t>` run are replaced in place,
//! then tokens the editor split across several runs are collapsed into the
//! run where they start.

use crate::config::Config;
use crate::error::AppError;
use crate::services::files::write_atomic;
use common::model::certificate::OnboardingCertificate;
use regex::Regex;
use std::io::{Cursor, Read, Write};
use std::path::PathBuf;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DOCUMENT_XML: &str = "word/document.xml";

/// Every token the certificate template may contain.
pub const PLACEHOLDERS: [&str; 13] = [
    "{{Our_Ref}}",
    "{{date_of_issue}}",
    "{{school_name}}",
    "{{lga}}",
    "{{school_code}}",
    "{{js1}}",
    "{{js2}}",
    "{{js3}}",
    "{{ss1}}",
    "{{ss2}}",
    "{{ss3}}",
    "{{total}}",
    "{{teachers}}",
];

/// Token/value pairs in [`PLACEHOLDERS`] order.
pub fn replacements(cert: &OnboardingCertificate) -> Vec<(String, String)> {
    let values = [
        cert.our_ref.map(|r| r.to_string()).unwrap_or_default(),
        cert.date_of_issue.clone().unwrap_or_default(),
        cert.school_name.clone(),
        cert.lga.clone(),
        cert.school_code.clone(),
        cert.js1.to_string(),
        cert.js2.to_string(),
        cert.js3.to_string(),
        cert.ss1.to_string(),
        cert.ss2.to_string(),
        cert.ss3.to_string(),
        cert.total.to_string(),
        cert.teachers.to_string(),
    ];
    PLACEHOLDERS
        .iter()
        .map(|p| p.to_string())
        .zip(values)
        .collect()
}

/// Path of the cached certificate for `record_id`.
pub fn word_path(config: &Config, record_id: &str) -> PathBuf {
    config.certificates_dir.join(format!("{}.docx", record_id))
}

/// Renders the configured template for `cert` and writes it to [`word_path`].
pub fn build_certificate_word(
    config: &Config,
    cert: &OnboardingCertificate,
) -> Result<PathBuf, AppError> {
    let template = std::fs::read(&config.certificate_template).map_err(|e| {
        AppError::Config(format!(
            "cannot read certificate template {}: {}",
            config.certificate_template.display(),
            e
        ))
    })?;
    let rendered = render_docx(&template, &replacements(cert))?;
    let path = word_path(config, &cert.record_id);
    write_atomic(&path, &rendered)?;
    log::info!("built certificate {}", path.display());
    Ok(path)
}

pub fn render_docx(template: &[u8], replacements: &[(String, String)]) -> Result<Vec<u8>, AppError> {
    let mut archive = ZipArchive::new(Cursor::new(template))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut found_document = false;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.name() == DOCUMENT_XML {
            let mut xml = String::new();
            entry.read_to_string(&mut xml)?;
            let resolved = resolve_document_xml(&xml, replacements)?;
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file(DOCUMENT_XML, options)?;
            writer.write_all(resolved.as_bytes())?;
            found_document = true;
        } else {
            writer.raw_copy_file(entry)?;
        }
    }

    if !found_document {
        return Err(AppError::Config(format!(
            "certificate template has no {}",
            DOCUMENT_XML
        )));
    }

    Ok(writer.finish()?.into_inner())
}

fn regex(pattern: &str) -> Result<Regex, AppError> {
    Regex::new(pattern).map_err(|e| AppError::Internal(format!("regex error: {}", e)))
}

pub fn resolve_document_xml(xml: &str, replacements: &[(String, String)]) -> Result<String, AppError> {
    let patterns = Patterns {
        open_tag: regex(r"<w:p(\s[^>]*)?>")?,
        text_run: regex(r"<w:t(\s[^>]*)?>([^<]*)</w:t>")?,
    };

    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;
    for (start, end) in paragraph_spans(xml, 0, &patterns.open_tag) {
        out.push_str(&xml[cursor..start]);
        out.push_str(&resolve_paragraph(&xml[start..end], replacements, &patterns));
        cursor = end;
    }
    out.push_str(&xml[cursor..]);
    Ok(out)
}

struct Patterns {
    open_tag: Regex,
    text_run: Regex,
}

/// Outermost `<w:p>...</w:p>` spans at or after `from`. Paragraphs nested
/// inside them (text boxes) are not listed; self-closing `<w:p/>` is skipped.
fn paragraph_spans(xml: &str, from: usize, open_tag: &Regex) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut cursor = from;
    while let Some(open) = open_tag.find_at(xml, cursor) {
        if open.as_str().ends_with("/>") {
            cursor = open.end();
            continue;
        }
        let Some(end) = paragraph_end(xml, open.end(), open_tag) else {
            break;
        };
        spans.push((open.start(), end));
        cursor = end;
    }
    spans
}

/// End of the paragraph whose opening tag finishes at `from`, counting
/// nested paragraphs so an inner `</w:p>` does not close the outer one.
fn paragraph_end(xml: &str, from: usize, open_tag: &Regex) -> Option<usize> {
    const CLOSE: &str = "</w:p>";
    let mut depth = 1;
    let mut cursor = from;
    loop {
        let close = cursor + xml[cursor..].find(CLOSE)?;
        match open_tag.find_at(xml, cursor) {
            Some(open) if open.start() < close => {
                if !open.as_str().ends_with("/>") {
                    depth += 1;
                }
                cursor = open.end();
            }
            _ => {
                depth -= 1;
                cursor = close + CLOSE.len();
                if depth == 0 {
                    return Some(cursor);
                }
            }
        }
    }
}

/// Resolves the paragraph's own runs, then each nested paragraph on its own.
fn resolve_paragraph(paragraph: &str, replacements: &[(String, String)], patterns: &Patterns) -> String {
    let own_tag_end = patterns.open_tag.find(paragraph).map_or(0, |m| m.end());
    let nested = paragraph_spans(paragraph, own_tag_end, &patterns.open_tag);
    let in_nested = |pos: usize| nested.iter().any(|&(s, e)| pos >= s && pos < e);

    let runs: Vec<(usize, usize, String)> = patterns
        .text_run
        .captures_iter(paragraph)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let text = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            Some((whole.start(), whole.end(), unescape_xml(text)))
        })
        .filter(|(start, _, _)| !in_nested(*start))
        .collect();

    // (start, end, replacement) edits, applied in position order.
    let mut edits: Vec<(usize, usize, String)> = nested
        .iter()
        .map(|&(s, e)| (s, e, resolve_paragraph(&paragraph[s..e], replacements, patterns)))
        .collect();

    let original: Vec<String> = runs.iter().map(|(_, _, t)| t.clone()).collect();
    let joined = original.concat();
    if replacements.iter().any(|(key, _)| joined.contains(key.as_str())) {
        let mut texts = original.clone();
        for text in texts.iter_mut() {
            for (key, value) in replacements {
                if text.contains(key.as_str()) {
                    *text = text.replace(key.as_str(), value);
                }
            }
        }
        for (key, value) in replacements {
            merge_split_token(&mut texts, key, value);
        }
        for ((start, end, _), (before, after)) in runs.iter().zip(original.iter().zip(texts.iter())) {
            if before != after {
                edits.push((
                    *start,
                    *end,
                    format!("<w:t xml:space=\"preserve\">{}</w:t>", escape_xml(after)),
                ));
            }
        }
    }
    edits.sort_by_key(|(start, _, _)| *start);

    let mut out = String::with_capacity(paragraph.len());
    let mut cursor = 0;
    for (start, end, replacement) in edits {
        out.push_str(&paragraph[cursor..start]);
        out.push_str(&replacement);
        cursor = end;
    }
    out.push_str(&paragraph[cursor..]);
    out
}

/// Replaces occurrences of `key` that span run boundaries. The value is
/// written into the run holding the token's first character; the rest of the
/// token is removed from the following runs.
fn merge_split_token(texts: &mut [String], key: &str, value: &str) {
    let mut search_from = 0;
    loop {
        let joined = texts.concat();
        let Some(rel) = joined.get(search_from..).and_then(|rest| rest.find(key)) else {
            return;
        };
        let start = search_from + rel;
        let end = start + key.len();
        let (first, first_off) = locate(texts, start, false);
        let (last, last_off) = locate(texts, end, true);

        if first == last {
            texts[first].replace_range(first_off..last_off, value);
        } else {
            texts[first].truncate(first_off);
            texts[first].push_str(value);
            for text in texts[first + 1..last].iter_mut() {
                text.clear();
            }
            texts[last] = texts[last][last_off..].to_string();
        }
        search_from = start + value.len();
    }
}

/// Maps a byte position of the concatenated text to (run index, offset).
/// `is_end` treats `pos` as an exclusive end, so it resolves to the run the
/// preceding byte lives in.
fn locate(texts: &[String], pos: usize, is_end: bool) -> (usize, usize) {
    let mut offset = 0;
    for (i, text) in texts.iter().enumerate() {
        let len = text.len();
        let inside = if is_end {
            pos > offset && pos <= offset + len
        } else {
            pos >= offset && pos < offset + len
        };
        if inside {
            return (i, pos - offset);
        }
        offset += len;
    }
    let last = texts.len().saturating_sub(1);
    (last, texts.get(last).map_or(0, |t| t.len()))
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_xml(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse::<u32>().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
