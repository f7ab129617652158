use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::store::StoreError;

/// Which operation a date period was supplied to. The user-facing wording of
/// an unparseable period differs between the three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUse {
    Statistics,
    Export,
    Mailing,
}

impl PeriodUse {
    fn invalid_message(self) -> &'static str {
        match self {
            PeriodUse::Statistics => "Укажите корректный диапазон дат",
            PeriodUse::Export => "Период выгрузки отчета задан некорректно",
            PeriodUse::Mailing => "Период отправки отчета задан некорректно",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("{}", .0.invalid_message())]
    InvalidPeriod(PeriodUse),

    #[error("Дата начала не может быть позже даты окончания")]
    RangeOrder,

    #[error("Добавьте хотя бы один источник ВКонтакте в разделе «Настройки», чтобы сформировать отчет")]
    NoSources,

    #[error("Добавьте хотя бы один email в настройках рассылки")]
    NoRecipients,

    #[error("Ключ должен содержать от 10 до 40 символов: A-Z, 0-9 и \"-\"")]
    InvalidLicenseKey,

    #[error("Некорректные параметры расписания: {field}")]
    InvalidSchedule { field: &'static str },

    #[error("Неверный логин или пароль")]
    InvalidCredentials,

    #[error("Сессия истекла или отсутствует, войдите снова")]
    Unauthorized,

    #[error("Ошибка хранилища: {0}")]
    Storage(#[from] StoreError),

    #[error("Не удалось подготовить XLSX-отчет: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

impl FeedbackError {
    pub fn code(&self) -> &'static str {
        match self {
            FeedbackError::InvalidPeriod(_) => "invalid_period",
            FeedbackError::RangeOrder => "invalid_range",
            FeedbackError::NoSources => "no_sources",
            FeedbackError::NoRecipients => "no_recipients",
            FeedbackError::InvalidLicenseKey => "invalid_license_key",
            FeedbackError::InvalidSchedule { .. } => "invalid_schedule",
            FeedbackError::InvalidCredentials => "invalid_credentials",
            FeedbackError::Unauthorized => "unauthorized",
            FeedbackError::Storage(_) => "storage_error",
            FeedbackError::Export(_) => "export_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FeedbackError::InvalidPeriod(_)
            | FeedbackError::RangeOrder
            | FeedbackError::InvalidLicenseKey
            | FeedbackError::InvalidSchedule { .. } => StatusCode::BAD_REQUEST,
            FeedbackError::NoSources | FeedbackError::NoRecipients => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            FeedbackError::InvalidCredentials | FeedbackError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            FeedbackError::Storage(_) | FeedbackError::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
pub struct ErrResponse {
    pub ok: bool,
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for FeedbackError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}: {self:?}", self.code());
        }
        (
            status,
            Json(ErrResponse {
                ok: false,
                error: self.code(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
