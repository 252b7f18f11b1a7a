use crate::config::Config;
use crate::error::AppError;
use crate::services::certificates::store;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use common::requests::CertificateForm;

/// `POST /generate-certificate`: stores the form and redirects to the listing.
pub(crate) async fn process(
    config: web::Data<Config>,
    form: web::Form<CertificateForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    validate(&form)?;
    let cert = store::insert_certificate(&config, &form)?;
    log::info!(
        "created certificate {} for {} ({})",
        cert.record_id,
        cert.school_name,
        cert.school_code
    );
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/certificates-list"))
        .finish())
}

fn validate(form: &CertificateForm) -> Result<(), AppError> {
    for (name, value) in [
        ("school_name", &form.school_name),
        ("lga", &form.lga),
        ("school_code", &form.school_code),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadInput(format!("{} must not be empty", name)));
        }
    }
    let counts = [
        ("js1", form.js1),
        ("js2", form.js2),
        ("js3", form.js3),
        ("ss1", form.ss1),
        ("ss2", form.ss2),
        ("ss3", form.ss3),
        ("total", form.total),
        ("teachers", form.teachers),
    ];
    if let Some((name, _)) = counts.iter().find(|(_, v)| *v < 0) {
        return Err(AppError::BadInput(format!("{} must not be negative", name)));
    }
    Ok(())
}
