//! HTML pages rendered from the templates embedded at build time.
//!
//! Templates use `{{ name }}` slots. Callers escape plain values with
//! [`escape`]; table bodies are assembled here as ready-made markup.

use crate::error::AppError;
use crate::services::uploads::remarks::is_recommended;
use crate::services::uploads::verify::VerificationContext;
use actix_web::http::StatusCode;
use common::model::certificate::OnboardingCertificate;
use common::model::student::StudentRow;
use include_dir::{include_dir, Dir};
use regex::Regex;
use std::collections::HashMap;

static TEMPLATES: Dir = include_dir!("$CARGO_MANIFEST_DIR/templates");

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Fills every `{{ name }}` slot of template `name`. Unknown slots render empty.
pub fn render(name: &str, values: &HashMap<&str, String>) -> Result<String, AppError> {
    let source = TEMPLATES
        .get_file(name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| AppError::Internal(format!("template {} is missing", name)))?;
    let slot = Regex::new(r"\{\{\s*([a-z0-9_]+)\s*\}\}")
        .map_err(|e| AppError::Internal(format!("regex error: {}", e)))?;
    let rendered = slot.replace_all(source, |caps: &regex::Captures| {
        values.get(&caps[1]).cloned().unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

pub fn dashboard(records: &[OnboardingCertificate]) -> Result<String, AppError> {
    let mut rows = String::new();
    for c in records {
        let status = c.pdf_path.as_deref().unwrap_or("PENDING");
        rows.push_str(&format!(
            "          <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/print/{id}\">Print</a> \
             <form class=\"inline\" action=\"/merge/{id}\" method=\"post\"><button type=\"submit\">Merge</button></form></td></tr>\n",
            c.our_ref.map(|r| r.to_string()).unwrap_or_default(),
            escape(&c.record_id),
            escape(&c.school_name),
            escape(&c.lga),
            escape(&c.school_code),
            c.js1,
            c.js2,
            c.js3,
            c.ss1,
            c.ss2,
            c.ss3,
            c.total,
            c.teachers,
            escape(c.date_of_issue.as_deref().unwrap_or("")),
            escape(status),
            id = escape(&c.record_id),
        ));
    }

    let mut values = HashMap::new();
    values.insert("certificate_count", records.len().to_string());
    values.insert("certificate_rows", rows);
    render("upload.html", &values)
}

fn student_table(rows: &[StudentRow]) -> String {
    let mut out = String::from(
        "    <section class=\"card\">\n      <table>\n        <thead><tr><th>#</th><th>Passport</th><th>LIN</th>\
         <th>Last name</th><th>First name</th><th>Other name</th><th>Sex</th>\
         <th>2026</th><th>2025</th><th>2024</th><th>Remark</th></tr></thead>\n        <tbody>\n",
    );
    for (i, r) in rows.iter().enumerate() {
        let class = if is_recommended(&r.remark) { " class=\"recommended\"" } else { "" };
        out.push_str(&format!(
            "          <tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"remark\">{}</td></tr>\n",
            class,
            i + 1,
            escape(&r.passport),
            escape(&r.lin),
            escape(&r.lastname),
            escape(&r.firstname),
            escape(&r.othername),
            escape(&r.sex),
            escape(&r.year_2026),
            escape(&r.year_2025),
            escape(&r.year_2024),
            escape(&r.remark),
        ));
    }
    out.push_str("        </tbody>\n      </table>\n    </section>");
    out
}

fn context_values(ctx: &VerificationContext) -> HashMap<&'static str, String> {
    let mut values = HashMap::new();
    values.insert("record_id", escape(&ctx.record_id));
    values.insert("school_name", escape(&ctx.school_name));
    values.insert("school_code", escape(&ctx.school_code));
    values.insert("principal", escape(&ctx.principal));
    values.insert("recommended_count", ctx.recommended_count.to_string());
    values.insert("row_count", ctx.rows.len().to_string());
    values.insert("qr_code", ctx.qr_code.clone());
    values.insert("verification_url", escape(&ctx.verification_url));
    values.insert("student_table", student_table(&ctx.rows));
    values
}

pub fn verification_page(ctx: &VerificationContext) -> Result<String, AppError> {
    render("verification.html", &context_values(ctx))
}

pub fn list_page(ctx: &VerificationContext) -> Result<String, AppError> {
    let mut values = context_values(ctx);
    values.insert("segment_path", escape(&ctx.segments.as_path()));
    render("index.html", &values)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let mut values = HashMap::new();
    values.insert("status", escape(&status.to_string()));
    values.insert("message", escape(message));
    render("error.html", &values).unwrap_or_else(|_| {
        format!(
            "<!DOCTYPE html><html><body><h1>{}</h1><p>{}</p></body></html>",
            escape(&status.to_string()),
            escape(message)
        )
    })
}
