//! API response helpers
//!
//! Every JSON response is an envelope `{"status": "...", "data": "..."}`, served with
//! `200 OK` for failures as well

use axum::Json;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

/// Status of an envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
enum Status {
    /// It worked
    Success,

    /// It did not
    Error,
}

#[derive(Serialize)]
struct Envelope {
    status: Status,
    data: String,
}

/// Hold data for a successful API interaction
pub struct Success {
    data: String,
}

impl Success {
    pub fn ok<D>(data: D) -> Self
    where
        D: ToString,
    {
        Self {
            data: data.to_string(),
        }
    }
}

impl IntoResponse for Success {
    fn into_response(self) -> Response {
        Json(Envelope {
            status: Status::Success,
            data: self.data,
        })
        .into_response()
    }
}

/// Hold data for a failed API interaction
#[derive(Debug)]
pub struct Error {
    message: String,
}

impl Error {
    /// Body of the request could not be read
    pub fn parse() -> Self {
        Self::message("There was a problem parsing your request.")
    }

    /// No `url` in the create form
    pub fn no_link() -> Self {
        Self::message("No link provided.")
    }

    /// The `url` in the create form is not absolute
    pub fn invalid_url() -> Self {
        Self::message("Invalid URL provided.")
    }

    /// Storage failed to create a link
    pub fn create_failed() -> Self {
        Self::message("There was a problem creating this redirect.")
    }

    /// Statistics without any hash
    pub fn missing_hash() -> Self {
        Self::message("Please include a hash.")
    }

    /// Statistics with a hash too short to be one
    pub fn invalid_hash() -> Self {
        Self::message("Please provide a valid hash.")
    }

    /// Any other message, like storage errors
    pub fn message<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            message: message.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        Json(Envelope {
            status: Status::Error,
            data: self.message,
        })
        .into_response()
    }
}
