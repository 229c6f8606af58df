use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_derive::Serialize;

#[derive(Serialize)]
pub(crate) struct JsonResponse<T> {
    pub(crate) status: String,
    pub(crate) message: String,
    pub(crate) code: u32,
    pub(crate) id: Option<i32>,
    pub(crate) item: Option<T>,
    pub(crate) list: Option<Vec<T>>,
}

#[derive(Default)]
pub(crate) struct JsonResponseBuilder<T>
where
    T: serde::Serialize,
{
    id: Option<i32>,
    item: Option<T>,
    list: Option<Vec<T>>,
}

impl<T> JsonResponse<T>
where
    T: serde::Serialize,
{
    pub(crate) fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder {
            id: None,
            item: None,
            list: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: serde::Serialize,
{
    pub(crate) fn set_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub(crate) fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub(crate) fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    fn into_response(self, status: StatusCode, message: &str) -> JsonResponse<T> {
        let msg = if !message.trim().is_empty() {
            message.to_string()
        } else {
            status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string()
        };

        JsonResponse {
            status: if status.is_success() {
                "OK".to_string()
            } else {
                "Error".to_string()
            },
            message: msg,
            code: status.as_u16() as u32,
            id: self.id,
            item: self.item,
            list: self.list,
        }
    }

    pub(crate) fn ok(self, message: impl ToString) -> HttpResponse {
        HttpResponse::Ok().json(self.into_response(StatusCode::OK, &message.to_string()))
    }

    fn error(self, status: StatusCode, message: impl ToString) -> actix_web::Error {
        let message = message.to_string();
        let response = HttpResponse::build(status).json(self.into_response(status, &message));
        InternalError::from_response(message, response).into()
    }

    pub(crate) fn bad_request(self, message: impl ToString) -> actix_web::Error {
        self.error(StatusCode::BAD_REQUEST, message)
    }

    pub(crate) fn unauthorized(self, message: impl ToString) -> actix_web::Error {
        self.error(StatusCode::UNAUTHORIZED, message)
    }

    pub(crate) fn not_found(self, message: impl ToString) -> actix_web::Error {
        self.error(StatusCode::NOT_FOUND, message)
    }

    pub(crate) fn internal_server_error(self, message: impl ToString) -> actix_web::Error {
        self.error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}
