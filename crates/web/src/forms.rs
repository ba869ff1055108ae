//! Form binding, validation and widget rendering.

use std::collections::BTreeMap;

use serde::Serialize;
use yatube_database::{Group, Post};

use crate::media::{MediaError, MediaStore, Upload};
use crate::templates::escape;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Key for errors that belong to the whole form.
pub const NON_FIELD_ERRORS: &str = "__all__";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD_ERRORS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    EmailInput,
    PasswordInput,
    Textarea,
    Select { options: Vec<SelectOption> },
    FileInput,
}

/// A form field together with its current value and errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundField {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
    pub value: String,
    pub required: bool,
    pub widget: Widget,
    pub errors: Vec<String>,
}

impl BoundField {
    fn new(name: &'static str, label: &'static str, widget: Widget) -> Self {
        Self {
            name,
            label,
            help_text: "",
            value: String::new(),
            required: false,
            widget,
            errors: Vec::new(),
        }
    }

    fn help(mut self, help_text: &'static str) -> Self {
        self.help_text = help_text;
        self
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    fn errors(mut self, errors: &FormErrors) -> Self {
        self.errors = errors.get(self.name).to_vec();
        self
    }

    pub fn id(&self) -> String {
        format!("id_{}", self.name)
    }

    fn render_widget(&self, class: Option<&str>) -> String {
        let name = escape(self.name);
        let id = escape(&self.id());
        let class = class
            .map(|css| format!(r#" class="{}""#, escape(css)))
            .unwrap_or_default();
        let required = if self.required { " required" } else { "" };

        match &self.widget {
            Widget::TextInput | Widget::EmailInput | Widget::PasswordInput => {
                let input_type = match self.widget {
                    Widget::EmailInput => "email",
                    Widget::PasswordInput => "password",
                    _ => "text",
                };
                let value = match self.widget {
                    Widget::PasswordInput => String::new(),
                    _ => format!(r#" value="{}""#, escape(&self.value)),
                };
                format!(
                    r#"<input type="{input_type}" name="{name}" id="{id}"{class}{value}{required}>"#
                )
            }
            Widget::Textarea => format!(
                r#"<textarea name="{name}" cols="40" rows="10" id="{id}"{class}{required}>{}</textarea>"#,
                escape(&self.value)
            ),
            Widget::Select { options } => {
                let mut html =
                    format!(r#"<select name="{name}" id="{id}"{class}{required}>"#);
                html.push_str(r#"<option value="">---------</option>"#);
                for option in options {
                    let selected = if option.value == self.value {
                        " selected"
                    } else {
                        ""
                    };
                    html.push_str(&format!(
                        r#"<option value="{}"{selected}>{}</option>"#,
                        escape(&option.value),
                        escape(&option.label)
                    ));
                }
                html.push_str("</select>");
                html
            }
            Widget::FileInput => format!(
                r#"<input type="file" name="{name}" accept="image/*" id="{id}"{class}>"#
            ),
        }
    }
}

/// Render a field's widget with the given CSS class attached.
pub fn addclass(field: &BoundField, css: &str) -> String {
    field.render_widget(Some(css))
}

/// Post text, group and image, as entered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostForm {
    pub text: String,
    pub group: String,
    /// Image already attached to the post being edited.
    pub current_image: Option<String>,
    pub groups: Vec<Group>,
    pub errors: FormErrors,
    #[serde(skip)]
    upload: Option<Upload>,
    #[serde(skip)]
    oversized: bool,
}

/// A validated post submission.
#[derive(Debug, Clone)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<Upload>,
}

impl PostForm {
    pub fn blank(groups: Vec<Group>) -> Self {
        Self {
            groups,
            ..Self::default()
        }
    }

    pub fn for_post(post: &Post, groups: Vec<Group>) -> Self {
        Self {
            text: post.text.clone(),
            group: post
                .group
                .as_ref()
                .map(|group| group.id.to_string())
                .unwrap_or_default(),
            current_image: post.image.clone(),
            groups,
            ..Self::default()
        }
    }

    pub fn bind(text: String, group: String, upload: Option<Upload>, groups: Vec<Group>) -> Self {
        Self {
            text,
            group,
            groups,
            upload,
            ..Self::default()
        }
    }

    /// Flags a submission whose body was cut off at the request size limit.
    pub fn oversized(mut self, oversized: bool) -> Self {
        self.oversized = oversized;
        self
    }

    pub fn clean(mut self, media: &MediaStore) -> Result<CleanPost, Self> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            self.errors.add("text", REQUIRED);
        }

        let group = self.group.trim();
        let group_id = if group.is_empty() {
            None
        } else {
            match group.parse::<i64>() {
                Ok(id) if self.groups.iter().any(|candidate| candidate.id == id) => Some(id),
                _ => {
                    self.errors.add("group", INVALID_CHOICE);
                    None
                }
            }
        };

        if self.oversized {
            self.errors.add("image", MediaError::TooLarge.to_string());
        } else if let Some(upload) = &self.upload {
            if let Err(error) = media.validate(upload) {
                self.errors.add("image", error.to_string());
            }
        }

        if !self.errors.is_empty() {
            return Err(self);
        }

        Ok(CleanPost {
            text,
            group_id,
            image: self.upload,
        })
    }

    pub fn text_field(&self) -> BoundField {
        BoundField::new("text", "Text", Widget::Textarea)
            .help("Text of the new post")
            .required()
            .value(self.text.as_str())
            .errors(&self.errors)
    }

    pub fn group_field(&self) -> BoundField {
        let options = self
            .groups
            .iter()
            .map(|group| SelectOption {
                value: group.id.to_string(),
                label: group.title.clone(),
            })
            .collect();

        BoundField::new("group", "Group", Widget::Select { options })
            .help("Group the post will belong to")
            .value(self.group.as_str())
            .errors(&self.errors)
    }

    pub fn image_field(&self) -> BoundField {
        BoundField::new("image", "Image", Widget::FileInput)
            .value(self.current_image.clone().unwrap_or_default())
            .errors(&self.errors)
    }

    pub fn fields(&self) -> Vec<BoundField> {
        vec![self.text_field(), self.group_field(), self.image_field()]
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentForm {
    pub text: String,
    pub errors: FormErrors,
}

impl CommentForm {
    pub fn bind(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            errors: FormErrors::default(),
        }
    }

    pub fn clean(mut self) -> Result<String, Self> {
        let text = self.text.trim();
        if text.is_empty() {
            self.errors.add("text", REQUIRED);
            return Err(self);
        }
        Ok(text.to_string())
    }

    pub fn text_field(&self) -> BoundField {
        BoundField::new("text", "Comment", Widget::Textarea)
            .required()
            .value(self.text.as_str())
            .errors(&self.errors)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub errors: FormErrors,
}

impl LoginForm {
    pub fn fields(&self) -> Vec<BoundField> {
        vec![
            BoundField::new("username", "Username", Widget::TextInput)
                .required()
                .value(self.username.as_str())
                .errors(&self.errors),
            BoundField::new("password", "Password", Widget::PasswordInput)
                .required()
                .errors(&self.errors),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub errors: FormErrors,
}

impl SignupForm {
    pub fn fields(&self) -> Vec<BoundField> {
        vec![
            BoundField::new("first_name", "First name", Widget::TextInput)
                .value(self.first_name.as_str())
                .errors(&self.errors),
            BoundField::new("last_name", "Last name", Widget::TextInput)
                .value(self.last_name.as_str())
                .errors(&self.errors),
            BoundField::new("username", "Username", Widget::TextInput)
                .help("150 characters or fewer. Letters, digits and @/./+/-/_ only.")
                .required()
                .value(self.username.as_str())
                .errors(&self.errors),
            BoundField::new("email", "Email address", Widget::EmailInput)
                .value(self.email.as_str())
                .errors(&self.errors),
            BoundField::new("password", "Password", Widget::PasswordInput)
                .help("At least 8 characters.")
                .required()
                .errors(&self.errors),
        ]
    }
}
