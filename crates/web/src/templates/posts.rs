use serde::Serialize;
use yatube_database::{Comment, Group, Page as Listing, Post, User};

use super::{escape, linebreaks, paginator, post_card, truncate_words, Frame, Template};
use crate::forms::{addclass, BoundField, CommentForm, PostForm};
use crate::util::{group_url, profile_url};

#[derive(Debug, Serialize)]
pub struct Index {
    pub page_obj: Listing<Post>,
}

impl Template for Index {
    fn name(&self) -> &'static str {
        "posts/index.html"
    }

    fn title(&self) -> String {
        "Latest updates on the site".to_string()
    }

    fn render_content(&self, frame: &Frame<'_>, out: &mut String) {
        out.push_str("<h1>Latest updates on the site</h1>\n");
        for post in self.page_obj.iter() {
            post_card(post, frame, true, out);
        }
        paginator(&self.page_obj, out);
    }
}

#[derive(Debug, Serialize)]
pub struct GroupList {
    pub group: Group,
    pub page_obj: Listing<Post>,
}

impl Template for GroupList {
    fn name(&self) -> &'static str {
        "posts/group_list.html"
    }

    fn title(&self) -> String {
        format!("Posts of group {}", self.group.title)
    }

    fn render_content(&self, frame: &Frame<'_>, out: &mut String) {
        out.push_str(&format!(
            "<h1>{}</h1>\n<p>{}</p>\n",
            escape(&self.group.title),
            linebreaks(&self.group.description)
        ));
        for post in self.page_obj.iter() {
            post_card(post, frame, false, out);
        }
        paginator(&self.page_obj, out);
    }
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub author: User,
    pub count_posts: i64,
    pub following: bool,
    pub page_obj: Listing<Post>,
}

impl Template for Profile {
    fn name(&self) -> &'static str {
        "posts/profile.html"
    }

    fn title(&self) -> String {
        format!("Profile of {}", self.author.full_name())
    }

    fn render_content(&self, frame: &Frame<'_>, out: &mut String) {
        out.push_str(&format!(
            "<h1>All posts of {}</h1>\n<h3>Total posts: {}</h3>\n",
            escape(&self.author.full_name()),
            self.count_posts
        ));

        let is_self = frame.user.map(|user| user.id) == Some(self.author.id);
        if frame.user.is_some() && !is_self {
            let base = profile_url(&self.author.username);
            if self.following {
                out.push_str(&format!(
                    r#"<a class="btn btn-lg btn-light" href="{}unfollow/" role="button">Unfollow</a>
"#,
                    escape(&base)
                ));
            } else {
                out.push_str(&format!(
                    r#"<a class="btn btn-lg btn-primary" href="{}follow/" role="button">Follow</a>
"#,
                    escape(&base)
                ));
            }
        }

        for post in self.page_obj.iter() {
            post_card(post, frame, true, out);
        }
        paginator(&self.page_obj, out);
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub count_posts: i64,
    pub comments: Vec<Comment>,
    pub form: CommentForm,
    pub can_edit: bool,
}

impl Template for PostDetail {
    fn name(&self) -> &'static str {
        "posts/post_detail.html"
    }

    fn title(&self) -> String {
        format!("Post {}", truncate_words(&self.post.text, 5))
    }

    fn render_content(&self, frame: &Frame<'_>, out: &mut String) {
        let post = &self.post;
        out.push_str(&format!(
            r#"<div class="row">
<aside class="col-12 col-md-3">
<ul class="list-group list-group-flush">
<li class="list-group-item">Date: {date}</li>
"#,
            date = post.pub_date.format("%d %b %Y"),
        ));
        if let Some(group) = &post.group {
            out.push_str(&format!(
                r#"<li class="list-group-item">Group: <a href="{}">{}</a></li>
"#,
                escape(&group_url(&group.slug)),
                escape(&group.title)
            ));
        }
        out.push_str(&format!(
            r#"<li class="list-group-item">Author: {author}</li>
<li class="list-group-item">Posts by this author: <span>{count}</span></li>
<li class="list-group-item"><a href="{profile}">all posts of the author</a></li>
</ul>
</aside>
<article class="col-12 col-md-9">
"#,
            author = escape(&post.author.full_name),
            count = self.count_posts,
            profile = escape(&profile_url(&post.author.username)),
        ));

        if let Some(image) = &post.image {
            out.push_str(&format!(
                r#"<img class="card-img my-2" src="{}{}" alt="">
"#,
                escape(frame.media_url),
                escape(image)
            ));
        }
        out.push_str(&format!("<p>{}</p>\n", linebreaks(&post.text)));

        if self.can_edit {
            out.push_str(&format!(
                r#"<a class="btn btn-primary" href="/posts/{}/edit/">edit post</a>
"#,
                post.id
            ));
        }

        if frame.user.is_some() {
            out.push_str(&format!(
                r#"<div class="card my-4">
<h5 class="card-header">Add a comment:</h5>
<div class="card-body">
<form method="post" action="/posts/{}/comment/">
"#,
                post.id
            ));
            form_group(&self.form.text_field(), out);
            out.push_str(
                r#"<button type="submit" class="btn btn-primary">Send</button>
</form>
</div>
</div>
"#,
            );
        }

        for comment in &self.comments {
            out.push_str(&format!(
                r#"<div class="media mb-4 comment" data-comment-id="{id}">
<div class="media-body">
<h5 class="mt-0"><a href="{url}">{username}</a></h5>
<p>{text}</p>
</div>
</div>
"#,
                id = comment.id,
                url = escape(&profile_url(&comment.author.username)),
                username = escape(&comment.author.username),
                text = linebreaks(&comment.text),
            ));
        }

        out.push_str("</article>\n</div>\n");
    }
}

#[derive(Debug, Serialize)]
pub struct CreatePost {
    pub form: PostForm,
    pub is_edit: bool,
    pub post_id: Option<i64>,
}

impl Template for CreatePost {
    fn name(&self) -> &'static str {
        "posts/create_post.html"
    }

    fn title(&self) -> String {
        if self.is_edit {
            "Edit post".to_string()
        } else {
            "New post".to_string()
        }
    }

    fn render_content(&self, frame: &Frame<'_>, out: &mut String) {
        let action = match (self.is_edit, self.post_id) {
            (true, Some(id)) => format!("/posts/{id}/edit/"),
            _ => "/create/".to_string(),
        };

        out.push_str(&format!(
            r#"<div class="card">
<div class="card-header">{}</div>
<div class="card-body">
<form method="post" enctype="multipart/form-data" action="{}">
"#,
            escape(&self.title()),
            escape(&action)
        ));

        for field in self.form.fields() {
            form_group(&field, out);
        }

        if let Some(image) = &self.form.current_image {
            out.push_str(&format!(
                r#"<p>Currently: <a href="{}{}">{}</a></p>
"#,
                escape(frame.media_url),
                escape(image),
                escape(image)
            ));
        }

        let button = if self.is_edit { "Save" } else { "Add" };
        out.push_str(&format!(
            r#"<button type="submit" class="btn btn-primary">{button}</button>
</form>
</div>
</div>
"#
        ));
    }
}

#[derive(Debug, Serialize)]
pub struct FollowFeed {
    pub page_obj: Listing<Post>,
}

impl Template for FollowFeed {
    fn name(&self) -> &'static str {
        "posts/follow.html"
    }

    fn title(&self) -> String {
        "Posts of the authors you follow".to_string()
    }

    fn render_content(&self, frame: &Frame<'_>, out: &mut String) {
        out.push_str("<h1>Posts of the authors you follow</h1>\n");
        for post in self.page_obj.iter() {
            post_card(post, frame, true, out);
        }
        paginator(&self.page_obj, out);
    }
}

/// Label, widget, help text and errors of one field.
pub(crate) fn form_group(field: &BoundField, out: &mut String) {
    let required = if field.required {
        r#"<span class="required text-danger">*</span>"#
    } else {
        ""
    };
    out.push_str(&format!(
        r#"<div class="form-group row my-3">
<label for="{id}">{label}{required}</label>
{widget}
"#,
        id = escape(&field.id()),
        label = escape(field.label),
        widget = addclass(field, "form-control"),
    ));
    if !field.help_text.is_empty() {
        out.push_str(&format!(
            r#"<small class="form-text text-muted">{}</small>
"#,
            escape(field.help_text)
        ));
    }
    for error in &field.errors {
        out.push_str(&format!(
            r#"<div class="alert alert-danger">{}</div>
"#,
            escape(error)
        ));
    }
    out.push_str("</div>\n");
}
