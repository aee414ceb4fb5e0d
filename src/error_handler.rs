use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use diesel::result::Error as DieselError;
// The actual error type from pool.get().await
use diesel_async::pooled_connection::bb8::RunError as BB8RunError;
use diesel_async::pooled_connection::PoolError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// Anonymous caller on a page that needs a session; answered with a
    /// redirect to the login form rather than an error body.
    #[error("Login required")]
    LoginRequired { next: Option<String> },
    #[error("Database Error: {0}")]
    DatabaseError(String), // Message déjà formaté
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Pool Error: {0}")]
    PoolError(String), // Message déjà formaté
    #[error("Template Error: {0}")]
    TemplateError(String),
}

impl ServiceError {
    fn from_diesel_error(error: DieselError) -> ServiceError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                let detailed_message =
                    format!("Database error: {:?} - Info: {}", kind, info.message());
                log::error!("Internal Database Error: {}", detailed_message);
                ServiceError::DatabaseError("A database operation failed.".to_string())
            }
            DieselError::NotFound => {
                ServiceError::NotFound("The requested record was not found.".to_string())
            }
            err => {
                log::error!("Unexpected Diesel error: {}", err);
                ServiceError::DatabaseError("An unexpected database error occurred.".to_string())
            }
        }
    }

    fn from_pool_error(error: PoolError) -> ServiceError {
        log::error!("Pool error: {:?}", error);
        ServiceError::PoolError("Could not connect to the database pool.".to_string())
    }

    fn from_bb8_run_error(error: BB8RunError) -> ServiceError {
        log::error!("BB8 connection pool error: {:?}", error);
        ServiceError::PoolError("Could not obtain connection from database pool.".to_string())
    }

    /// Location of the login form, bringing the caller back to `next` afterwards.
    pub fn login_location(next: Option<&str>) -> String {
        match next.map(|path| serde_urlencoded::to_string(vec![("next", path)])) {
            Some(Ok(query)) => format!("/login?{}", query),
            _ => "/login".to_string(),
        }
    }
}

impl From<DieselError> for ServiceError {
    fn from(error: DieselError) -> ServiceError {
        ServiceError::from_diesel_error(error)
    }
}

// Implementation pour PoolError (quand on crée le pool)
impl From<PoolError> for ServiceError {
    fn from(error: PoolError) -> ServiceError {
        ServiceError::from_pool_error(error)
    }
}

impl From<BB8RunError> for ServiceError {
    fn from(error: BB8RunError) -> ServiceError {
        ServiceError::from_bb8_run_error(error)
    }
}

impl From<tera::Error> for ServiceError {
    fn from(error: tera::Error) -> ServiceError {
        // tera wraps the useful part in the source chain
        let mut detail = error.to_string();
        let mut source = std::error::Error::source(&error);
        while let Some(inner) = source {
            detail.push_str(": ");
            detail.push_str(&inner.to_string());
            source = inner.source();
        }
        log::error!("Template rendering failed: {}", detail);
        ServiceError::TemplateError("The page could not be rendered.".to_string())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match *self {
            ServiceError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::PoolError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::TemplateError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::LoginRequired { .. } => StatusCode::FOUND,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        if let ServiceError::LoginRequired { next } = self {
            log::debug!("Redirecting anonymous request to login (next: {:?})", next);
            return HttpResponse::Found()
                .insert_header((header::LOCATION, ServiceError::login_location(next.as_deref())))
                .finish();
        }

        // Les détails sont déjà loggués dans from_diesel_error ou from_bb8_run_error;
        // ici on ne logue que le message envoyé à l'utilisateur.
        let user_facing_message = match status_code.as_u16() < 500 {
            true => self.to_string(),
            false => "An internal server error occurred. Please try again later.".to_string(),
        };

        if status_code.is_server_error() {
            log::error!(
                "Responding with server error ({}): {}",
                status_code,
                user_facing_message
            );
        } else {
            log::warn!(
                "Responding with client error ({}): {}",
                status_code,
                user_facing_message
            );
        }

        HttpResponse::build(status_code)
            .content_type("text/html; charset=utf-8")
            .body(error_page(status_code, &user_facing_message))
    }
}

// Minimal page, built without the template engine so that a broken template
// can still be reported.
fn error_page(status_code: StatusCode, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>{code}</title></head>\
         <body><h1>{code}</h1><p>{message}</p><p><a href=\"/\">Back to home</a></p></body></html>\n",
        code = status_code,
        message = tera::escape_html(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn diesel_not_found_maps_to_404() {
        let err = ServiceError::from(DieselError::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn login_location_encodes_next() {
        assert_eq!(
            ServiceError::login_location(Some("/skills/new?x=1")),
            "/login?next=%2Fskills%2Fnew%3Fx%3D1"
        );
        assert_eq!(ServiceError::login_location(None), "/login");
    }

    #[actix_web::test]
    async fn login_required_redirects() {
        let err = ServiceError::LoginRequired {
            next: Some("/history".to_string()),
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/login?next=%2Fhistory"
        );
    }

    #[actix_web::test]
    async fn server_errors_hide_details() {
        let err = ServiceError::DatabaseError("relation \"skills\" does not exist".to_string());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("relation"));
        assert!(body.contains("An internal server error occurred."));
    }

    #[actix_web::test]
    async fn client_errors_are_escaped() {
        let err = ServiceError::NotFound("<script>".to_string());
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("&lt;script&gt;"));
    }
}
