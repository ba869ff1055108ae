//! Server-rendered HTML pages.
//!
//! Every page is a template struct that serialises into the page context and
//! writes its own body; [`render`] wraps the body in the shared layout.

pub mod errors;
pub mod posts;
pub mod users;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;
use yatube_database::{Page as Listing, Post, User};

use crate::util::{group_url, post_url, profile_url};

pub trait Template: Serialize {
    fn name(&self) -> &'static str;

    fn title(&self) -> String;

    fn status(&self) -> StatusCode {
        StatusCode::OK
    }

    fn render_content(&self, frame: &Frame<'_>, out: &mut String);
}

/// Values shared by every page.
pub struct Frame<'a> {
    pub user: Option<&'a User>,
    pub media_url: &'a str,
    pub year: i32,
}

/// A rendered page: the template it came from, its context and the final markup.
#[derive(Debug, Clone)]
pub struct Page {
    pub template: &'static str,
    pub context: Value,
    pub status: StatusCode,
    pub html: String,
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (self.status, Html(self.html)).into_response()
    }
}

pub fn render<T: Template>(template: &T, user: Option<&User>, media_url: &str) -> Page {
    let frame = Frame {
        user,
        media_url,
        year: Utc::now().year(),
    };

    let mut context = match serde_json::to_value(template) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(error) => {
            warn!(?error, template = template.name(), "failed to build page context");
            Map::new()
        }
    };
    context.insert("year".into(), Value::from(frame.year));
    context.insert(
        "user".into(),
        serde_json::to_value(user).unwrap_or(Value::Null),
    );

    let mut content = String::new();
    template.render_content(&frame, &mut content);

    Page {
        template: template.name(),
        context: Value::Object(context),
        status: template.status(),
        html: layout(template.name(), &template.title(), &frame, &content),
    }
}

fn layout(name: &str, title: &str, frame: &Frame<'_>, content: &str) -> String {
    let mut nav = String::from(r#"<a class="nav-link" href="/">Home</a>"#);
    match frame.user {
        Some(user) => {
            nav.push_str(r#"<a class="nav-link" href="/create/">New post</a>"#);
            nav.push_str(r#"<a class="nav-link" href="/follow/">Following</a>"#);
            nav.push_str(&format!(
                r#"<a class="nav-link" href="{}">{}</a>"#,
                escape(&profile_url(&user.username)),
                escape(&user.username)
            ));
            nav.push_str(r#"<a class="nav-link" href="/auth/logout/">Log out</a>"#);
        }
        None => {
            nav.push_str(r#"<a class="nav-link" href="/auth/login/">Log in</a>"#);
            nav.push_str(r#"<a class="nav-link" href="/auth/signup/">Sign up</a>"#);
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en" data-template="{name}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<header><nav class="navbar">{nav}</nav></header>
<main class="container py-5">
{content}
</main>
<footer class="border-top text-center py-3"><p>&copy; {year} Copyright <span style="color:red">Ya</span>tube</p></footer>
</body>
</html>
"#,
        name = escape(name),
        title = escape(title),
        year = frame.year,
    )
}

pub fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape and keep line breaks.
pub fn linebreaks(input: &str) -> String {
    escape(input).replace("\r\n", "\n").replace('\n', "<br>")
}

/// First `limit` words of a text, with an ellipsis when cut.
pub fn truncate_words(input: &str, limit: usize) -> String {
    let words: Vec<&str> = input.split_whitespace().collect();
    if words.len() <= limit {
        return words.join(" ");
    }
    format!("{} …", words[..limit].join(" "))
}

pub(crate) fn post_card(post: &Post, frame: &Frame<'_>, show_group: bool, out: &mut String) {
    out.push_str(&format!(
        r#"<article class="post" data-post-id="{id}">
<ul>
<li>Author: <a href="{author_url}">{author}</a></li>
<li>Date: {date}</li>
</ul>
"#,
        id = post.id,
        author_url = escape(&profile_url(&post.author.username)),
        author = escape(&post.author.full_name),
        date = post.pub_date.format("%d %b %Y"),
    ));

    if let Some(image) = &post.image {
        out.push_str(&format!(
            r#"<img class="card-img my-2" src="{}{}" alt="">
"#,
            escape(frame.media_url),
            escape(image)
        ));
    }

    out.push_str(&format!(
        r#"<p>{}</p>
<a href="{}">details</a>
"#,
        linebreaks(&post.text),
        escape(&post_url(post.id))
    ));

    if show_group {
        if let Some(group) = &post.group {
            out.push_str(&format!(
                r#"<br><a href="{}">all posts of group {}</a>
"#,
                escape(&group_url(&group.slug)),
                escape(&group.title)
            ));
        }
    }

    out.push_str("</article>\n<hr>\n");
}

pub(crate) fn paginator<T>(page: &Listing<T>, out: &mut String) {
    if page.num_pages <= 1 {
        return;
    }

    out.push_str(r#"<nav class="my-5"><ul class="pagination justify-content-center">"#);
    if let Some(previous) = page.previous_page_number {
        out.push_str(r#"<li class="page-item"><a class="page-link" href="?page=1">First</a></li>"#);
        out.push_str(&format!(
            r#"<li class="page-item"><a class="page-link" href="?page={previous}">Previous</a></li>"#
        ));
    }
    for number in page.page_range() {
        if number == page.number {
            out.push_str(&format!(
                r#"<li class="page-item active"><span class="page-link">{number}</span></li>"#
            ));
        } else {
            out.push_str(&format!(
                r#"<li class="page-item"><a class="page-link" href="?page={number}">{number}</a></li>"#
            ));
        }
    }
    if let Some(next) = page.next_page_number {
        out.push_str(&format!(
            r#"<li class="page-item"><a class="page-link" href="?page={next}">Next</a></li>"#
        ));
        out.push_str(&format!(
            r#"<li class="page-item"><a class="page-link" href="?page={}">Last</a></li>"#,
            page.num_pages
        ));
    }
    out.push_str("</ul></nav>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Hello {
        who: String,
    }

    impl Template for Hello {
        fn name(&self) -> &'static str {
            "tests/hello.html"
        }

        fn title(&self) -> String {
            format!("Hello {}", self.who)
        }

        fn render_content(&self, _frame: &Frame<'_>, out: &mut String) {
            out.push_str(&format!("<p>{}</p>", escape(&self.who)));
        }
    }

    #[test]
    fn render_injects_year_and_user() {
        let page = render(&Hello { who: "<b>".into() }, None, "/media/");

        assert_eq!(page.template, "tests/hello.html");
        assert_eq!(page.context["who"], "<b>");
        assert_eq!(page.context["year"], Utc::now().year());
        assert!(page.context["user"].is_null());
        assert!(page.html.contains(r#"data-template="tests/hello.html""#));
        assert!(page.html.contains("<p>&lt;b&gt;</p>"));
        assert!(page.html.contains(&format!("&copy; {}", Utc::now().year())));
    }

    #[test]
    fn linebreaks_escape_first() {
        assert_eq!(linebreaks("a<b>\nc"), "a&lt;b&gt;<br>c");
    }

    #[test]
    fn truncate_words_adds_ellipsis() {
        assert_eq!(truncate_words("one two three", 5), "one two three");
        assert_eq!(truncate_words("one two three", 2), "one two …");
    }
}
