use serde::Serialize;

use super::{escape, posts::form_group, Frame, Template};
use crate::forms::{LoginForm, SignupForm};
use crate::util::encode;

#[derive(Debug, Serialize)]
pub struct Login {
    pub form: LoginForm,
    pub next: Option<String>,
}

impl Template for Login {
    fn name(&self) -> &'static str {
        "users/login.html"
    }

    fn title(&self) -> String {
        "Log in".to_string()
    }

    fn render_content(&self, _frame: &Frame<'_>, out: &mut String) {
        let action = match &self.next {
            Some(next) => format!("/auth/login/?next={}", encode(next)),
            None => "/auth/login/".to_string(),
        };

        out.push_str(&format!(
            r#"<div class="card">
<div class="card-header">Log in</div>
<div class="card-body">
<form method="post" action="{}">
"#,
            escape(&action)
        ));
        for error in self.form.errors.non_field() {
            out.push_str(&format!(
                r#"<div class="alert alert-danger">{}</div>
"#,
                escape(error)
            ));
        }
        for field in self.form.fields() {
            form_group(&field, out);
        }
        out.push_str(
            r#"<button type="submit" class="btn btn-primary">Log in</button>
</form>
</div>
</div>
"#,
        );
    }
}

#[derive(Debug, Serialize)]
pub struct Signup {
    pub form: SignupForm,
}

impl Template for Signup {
    fn name(&self) -> &'static str {
        "users/signup.html"
    }

    fn title(&self) -> String {
        "Sign up".to_string()
    }

    fn render_content(&self, _frame: &Frame<'_>, out: &mut String) {
        out.push_str(
            r#"<div class="card">
<div class="card-header">Sign up</div>
<div class="card-body">
<form method="post" action="/auth/signup/">
"#,
        );
        for field in self.form.fields() {
            form_group(&field, out);
        }
        out.push_str(
            r#"<button type="submit" class="btn btn-primary">Sign up</button>
</form>
</div>
</div>
"#,
        );
    }
}

#[derive(Debug, Serialize)]
pub struct LoggedOut {}

impl Template for LoggedOut {
    fn name(&self) -> &'static str {
        "users/logged_out.html"
    }

    fn title(&self) -> String {
        "Logged out".to_string()
    }

    fn render_content(&self, _frame: &Frame<'_>, out: &mut String) {
        out.push_str(
            r#"<div class="card">
<div class="card-header">Logged out</div>
<div class="card-body">
<p>You have been logged out.</p>
<a href="/auth/login/">Log in again</a>
</div>
</div>
"#,
        );
    }
}
