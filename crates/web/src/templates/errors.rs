use axum::http::StatusCode;
use serde::Serialize;

use super::{escape, Frame, Template};

#[derive(Debug, Serialize)]
pub struct ErrorPage {
    pub status_code: u16,
    pub message: String,
}

impl ErrorPage {
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.to_string(),
        }
    }

    fn heading(&self) -> &'static str {
        match self.status_code {
            400 => "Bad request",
            403 => "Access denied",
            404 => "Page not found",
            _ => "Server error",
        }
    }
}

impl Template for ErrorPage {
    fn name(&self) -> &'static str {
        match self.status_code {
            400 => "core/400.html",
            403 => "core/403.html",
            404 => "core/404.html",
            _ => "core/500.html",
        }
    }

    fn title(&self) -> String {
        self.heading().to_string()
    }

    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn render_content(&self, _frame: &Frame<'_>, out: &mut String) {
        out.push_str(&format!(
            r#"<h1>{} ({})</h1>
<p>{}</p>
<a href="/">Back to the home page</a>
"#,
            self.heading(),
            self.status_code,
            escape(&self.message)
        ));
    }
}
