use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Every failure a handler can surface. Business-rule failures carry enough
/// meaning to send the user back to a sensible view with a notice;
/// infrastructure faults are collapsed into a generic 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Codice a barre già esistente!")]
    DuplicateBarcode,

    #[error("Username già in uso")]
    DuplicateUsername,

    #[error("Accesso negato")]
    Forbidden,

    #[error("Quantità insufficiente nel lotto selezionato!")]
    InsufficientQuantity,

    #[error("Elemento non trovato")]
    NotFound,

    #[error("Dati non validi: {0}")]
    InvalidInput(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateBarcode
            | AppError::DuplicateUsername
            | AppError::InsufficientQuantity
            | AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Hash(_) | AppError::Csv(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("internal error: {self}");
            "Errore interno".to_string()
        } else {
            log::warn!("request failed: {self}");
            self.to_string()
        };
        let body = format!(
            "<!DOCTYPE html><html><body><p>{message}</p>\
             <p><a href=\"/dashboard\">Torna alla dashboard</a></p></body></html>"
        );
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_keep_their_message() {
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::DuplicateBarcode.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InsufficientQuantity.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn store_errors_are_opaque() {
        let e = AppError::Store(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
